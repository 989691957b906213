//! Health profile page.

use crate::db::Database;
use crate::error::WorkflowResult;
use crate::identity::{require_user, IdentityProvider};
use crate::models::{HealthProfile, StoredHealthProfile};

/// The signed-in user's profile, or an empty one if none was saved yet.
pub fn load_health_profile(
    db: &Database,
    identity: &dyn IdentityProvider,
) -> WorkflowResult<HealthProfile> {
    let user_id = require_user(identity)?;
    Ok(db
        .get_health_profile(&user_id)?
        .map(|stored| stored.profile)
        .unwrap_or_default())
}

/// Replace the signed-in user's profile.
pub fn save_health_profile(
    db: &Database,
    identity: &dyn IdentityProvider,
    profile: HealthProfile,
) -> WorkflowResult<StoredHealthProfile> {
    let user_id = require_user(identity)?;
    let stored = StoredHealthProfile {
        user_id,
        profile,
        updated_at: crate::models::now(),
    };
    db.upsert_health_profile(&stored)?;
    tracing::info!(user_id = %stored.user_id, "Health profile saved");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use crate::identity::FixedIdentity;
    use crate::models::EmergencyContact;

    #[test]
    fn test_empty_profile_by_default() {
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::signed_in("user-1");
        assert_eq!(
            load_health_profile(&db, &identity).unwrap(),
            HealthProfile::default()
        );
    }

    #[test]
    fn test_save_replaces_whole_profile() {
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::signed_in("user-1");

        let mut profile = HealthProfile {
            blood_type: Some("O+".into()),
            allergies: vec!["penicillin".into()],
            ..Default::default()
        };
        save_health_profile(&db, &identity, profile.clone()).unwrap();

        profile.allergies.clear();
        profile.emergency_contact = Some(EmergencyContact {
            name: "John Doe".into(),
            ..Default::default()
        });
        save_health_profile(&db, &identity, profile.clone()).unwrap();

        assert_eq!(load_health_profile(&db, &identity).unwrap(), profile);
    }

    #[test]
    fn test_requires_sign_in() {
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::anonymous();
        assert!(matches!(
            load_health_profile(&db, &identity),
            Err(WorkflowError::NotSignedIn)
        ));
    }
}
