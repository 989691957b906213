//! Visit report composition.
//!
//! Turns a visit, its symptom entries and its assessment into an ordered list
//! of blocks. Layout and rendering never look at domain types again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    ProgramSchema, QualityOfLifeAssessment, SymptomEntry, VisitRecord,
};
use crate::timeline::{trend_series, treatment_usage, TrendPoint};

/// Intensity-over-time chart for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendChart {
    pub caption: String,
    pub points: Vec<TrendPoint>,
}

/// One unit of report content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ReportBlock {
    Title(String),
    Heading(String),
    Subheading(String),
    Field { label: String, value: String },
    Paragraph(String),
    Chart(TrendChart),
}

/// A composed visit report, sections in fixed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitReport {
    pub title: String,
    pub record_id: String,
    pub generated_at: DateTime<Utc>,
    pub blocks: Vec<ReportBlock>,
}

impl VisitReport {
    /// Suggested export file name.
    pub fn file_name(&self) -> String {
        format!(
            "visit-summary-{}.pdf",
            self.generated_at.format("%Y-%m-%d")
        )
    }
}

fn field(label: &str, value: impl Into<String>) -> ReportBlock {
    ReportBlock::Field {
        label: label.to_string(),
        value: value.into(),
    }
}

/// Compose the report: demographics, per-category symptom detail, treatment
/// effectiveness, then quality-of-life metrics.
pub fn compose_report(
    schema: &ProgramSchema,
    visit: &VisitRecord,
    entries: &[SymptomEntry],
    assessment: Option<&QualityOfLifeAssessment>,
    generated_at: DateTime<Utc>,
) -> VisitReport {
    let title = format!("{} Visit Summary", schema.display_name);
    let mut blocks = vec![
        ReportBlock::Title(title.clone()),
        field("Generated", generated_at.format("%Y-%m-%d %H:%M UTC").to_string()),
    ];

    push_demographics(&mut blocks, visit);
    push_symptoms(&mut blocks, entries);
    push_treatments(&mut blocks, entries);
    push_quality_of_life(&mut blocks, schema, assessment);

    VisitReport {
        title,
        record_id: visit.id.clone(),
        generated_at,
        blocks,
    }
}

fn push_demographics(blocks: &mut Vec<ReportBlock>, visit: &VisitRecord) {
    blocks.push(ReportBlock::Heading("Patient Information".into()));
    blocks.push(field("Name", visit.full_name()));
    blocks.push(field("Email", visit.email.clone()));

    let optional = [
        ("Phone", visit.phone.clone()),
        ("Address", visit.address.clone()),
        ("Date of Birth", visit.date_of_birth.clone()),
        (
            "Years with Condition",
            visit.years_with_condition.map(|y| y.to_string()),
        ),
        ("Diagnosis", visit.diagnosis.clone()),
        ("Reason for Visit", visit.visit_reason.clone()),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            blocks.push(field(label, value));
        }
    }
}

fn push_symptoms(blocks: &mut Vec<ReportBlock>, entries: &[SymptomEntry]) {
    blocks.push(ReportBlock::Heading("Symptoms".into()));
    if entries.is_empty() {
        blocks.push(ReportBlock::Paragraph("No symptoms recorded.".into()));
        return;
    }

    let series = trend_series(entries);
    for trend in &series {
        let category = trend.category;
        blocks.push(ReportBlock::Subheading(category.label().to_string()));

        for entry in entries.iter().filter(|e| e.category == category) {
            push_entry(blocks, entry);
        }

        if trend.is_chartable() {
            blocks.push(ReportBlock::Chart(TrendChart {
                caption: format!("{} intensity over time", category.label()),
                points: trend.points.clone(),
            }));
        }
    }
}

fn push_entry(blocks: &mut Vec<ReportBlock>, entry: &SymptomEntry) {
    blocks.push(field(
        "Recorded",
        entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
    ));
    blocks.push(field("Frequency", entry.frequency.label()));
    blocks.push(field("Intensity", entry.intensity.label()));

    let times = entry.time_of_day.labels();
    if !times.is_empty() {
        blocks.push(field("Time of Day", times.join(", ")));
    }
    if let Some(onset) = entry.onset_date {
        blocks.push(field("Onset", onset.format("%Y-%m-%d").to_string()));
    }
    if entry.trigger.present {
        let description = entry
            .trigger
            .description
            .clone()
            .unwrap_or_else(|| "Yes".to_string());
        blocks.push(field("Trigger", description));
    }
    if !entry.treatments.is_empty() {
        blocks.push(field("Treatments", entry.treatments.join(", ")));
    }
    for answer in &entry.context_answers {
        blocks.push(field("Details", answer.clone()));
    }
    if let Some(notes) = &entry.notes {
        blocks.push(field("Notes", notes.clone()));
    }
}

fn push_treatments(blocks: &mut Vec<ReportBlock>, entries: &[SymptomEntry]) {
    blocks.push(ReportBlock::Heading("Treatment Effectiveness".into()));
    let usage = treatment_usage(entries);
    if usage.is_empty() {
        blocks.push(ReportBlock::Paragraph("No treatments recorded.".into()));
        return;
    }
    for treatment in usage {
        blocks.push(field(
            &treatment.treatment,
            format!(
                "used {} time{}, average intensity {:.1}/5",
                treatment.count,
                if treatment.count == 1 { "" } else { "s" },
                treatment.mean_intensity
            ),
        ));
    }
}

fn push_quality_of_life(
    blocks: &mut Vec<ReportBlock>,
    schema: &ProgramSchema,
    assessment: Option<&QualityOfLifeAssessment>,
) {
    blocks.push(ReportBlock::Heading("Quality of Life".into()));
    let Some(assessment) = assessment else {
        blocks.push(ReportBlock::Paragraph("No assessment submitted.".into()));
        return;
    };

    for dimension in schema.dimensions {
        if let Some(value) = assessment.rating(*dimension) {
            blocks.push(field(
                dimension.label(),
                format!("{}/{}", value, schema.rating_scale.max),
            ));
        }
    }
    if let Some(notes) = &assessment.notes {
        blocks.push(field("Notes", notes.clone()));
    }
}
