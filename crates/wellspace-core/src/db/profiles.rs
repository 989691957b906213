//! Health profile database operations.

use rusqlite::{params, OptionalExtension};

use super::{timestamp_from_sql, timestamp_to_sql, Database, DbResult};
use crate::models::{HealthProfile, StoredHealthProfile};

impl Database {
    /// Get the user's profile, if one has been saved.
    pub fn get_health_profile(&self, user_id: &str) -> DbResult<Option<StoredHealthProfile>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT profile, updated_at FROM health_profiles WHERE user_id = ?",
                [user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(profile, updated_at)| {
            Ok(StoredHealthProfile {
                user_id: user_id.to_string(),
                profile: serde_json::from_str::<HealthProfile>(&profile)?,
                updated_at: timestamp_from_sql("updated_at", &updated_at)?,
            })
        })
        .transpose()
    }

    /// Insert or replace the user's profile as a whole.
    pub fn upsert_health_profile(&self, stored: &StoredHealthProfile) -> DbResult<()> {
        let profile_json = serde_json::to_string(&stored.profile)?;

        self.conn.execute(
            r#"
            INSERT INTO health_profiles (user_id, profile, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                profile = excluded.profile,
                updated_at = excluded.updated_at
            "#,
            params![
                stored.user_id,
                profile_json,
                timestamp_to_sql(&stored.updated_at)
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{now, EmergencyContact};

    #[test]
    fn test_missing_profile_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_health_profile("user-1").unwrap(), None);
    }

    #[test]
    fn test_upsert_replaces_whole_profile() {
        let db = Database::open_in_memory().unwrap();

        let mut profile = HealthProfile {
            blood_type: Some("O+".into()),
            allergies: vec!["penicillin".into()],
            emergency_contact: Some(EmergencyContact {
                name: "John Doe".into(),
                relationship: Some("spouse".into()),
                phone: None,
            }),
            ..Default::default()
        };
        let stored = StoredHealthProfile {
            user_id: "user-1".into(),
            profile: profile.clone(),
            updated_at: now(),
        };
        db.upsert_health_profile(&stored).unwrap();
        assert_eq!(db.get_health_profile("user-1").unwrap(), Some(stored));

        profile.allergies.clear();
        profile.emergency_contact = None;
        let replaced = StoredHealthProfile {
            user_id: "user-1".into(),
            profile,
            updated_at: now(),
        };
        db.upsert_health_profile(&replaced).unwrap();

        let loaded = db.get_health_profile("user-1").unwrap().unwrap();
        assert!(loaded.profile.allergies.is_empty());
        assert_eq!(loaded.profile.emergency_contact, None);
        assert_eq!(loaded.profile.blood_type, Some("O+".into()));
    }
}
