//! Diagnoses and the report that collects them.
//!
//! A [`Report`] is built through a [`ReportBuilder`] owned by a single run.
//! The builder only appends; [`ReportBuilder::finish`] consumes it, so a
//! report is finalized exactly once and is read-only afterwards. The
//! "has a problem" flags are derived from the diagnosis sequence on demand.

use serde::{Deserialize, Serialize};

use crate::probe::ProbeKind;

/// What kind of problem a diagnosis describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Auth,
    NotFound,
    Cors,
    Transport,
    Schema,
    Unknown,
}

/// One human-meaningful finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnosis {
    pub message: String,
    pub category: Category,

    /// Probe that produced this finding, once attributed by the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeKind>,
}

impl Diagnosis {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category,
            probe: None,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(Category::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Category::NotFound, message)
    }

    pub fn cors(message: impl Into<String>) -> Self {
        Self::new(Category::Cors, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(Category::Transport, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(Category::Schema, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(Category::Unknown, message)
    }

    /// Attribute this diagnosis to a probe.
    pub fn from_probe(mut self, probe: ProbeKind) -> Self {
        self.probe = Some(probe);
        self
    }
}

/// Finished outcome of one diagnostic run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    diagnoses: Vec<Diagnosis>,
}

impl Report {
    /// Diagnoses in the order they were found.
    pub fn diagnoses(&self) -> &[Diagnosis] {
        &self.diagnoses
    }

    pub fn has_problem(&self) -> bool {
        !self.diagnoses.is_empty()
    }

    pub fn has_cors_problem(&self) -> bool {
        self.diagnoses.iter().any(|d| d.category == Category::Cors)
    }

    /// Number of diagnoses in the given category.
    pub fn count(&self, category: Category) -> usize {
        self.diagnoses
            .iter()
            .filter(|d| d.category == category)
            .count()
    }
}

impl From<Vec<Diagnosis>> for Report {
    fn from(diagnoses: Vec<Diagnosis>) -> Self {
        Self { diagnoses }
    }
}

/// Append-only accumulator for a report under construction.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    diagnoses: Vec<Diagnosis>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnosis: Diagnosis) {
        self.diagnoses.push(diagnosis);
    }

    pub fn extend(&mut self, diagnoses: impl IntoIterator<Item = Diagnosis>) {
        self.diagnoses.extend(diagnoses);
    }

    /// Whether anything has been found so far in this run.
    pub fn has_problem(&self) -> bool {
        !self.diagnoses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnoses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnoses.is_empty()
    }

    pub fn finish(self) -> Report {
        Report {
            diagnoses: self.diagnoses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_has_no_problem() {
        let report = ReportBuilder::new().finish();
        assert!(!report.has_problem());
        assert!(!report.has_cors_problem());
        assert!(report.diagnoses().is_empty());
    }

    #[test]
    fn test_cors_flag_tracks_categories() {
        let all = [
            Category::Auth,
            Category::NotFound,
            Category::Cors,
            Category::Transport,
            Category::Schema,
            Category::Unknown,
        ];

        // Every subset of categories: the flag must equal "any Cors present".
        for mask in 0u32..(1 << all.len()) {
            let mut builder = ReportBuilder::new();
            for (i, category) in all.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    builder.push(Diagnosis::new(*category, "finding"));
                    builder.push(Diagnosis::new(*category, "another finding"));
                }
            }
            let report = builder.finish();
            let has_cors = mask & (1 << 2) != 0;
            assert_eq!(report.has_cors_problem(), has_cors, "mask {mask:#b}");
            assert_eq!(report.has_problem(), mask != 0, "mask {mask:#b}");
        }
    }

    #[test]
    fn test_builder_preserves_order() {
        let mut builder = ReportBuilder::new();
        builder.push(Diagnosis::auth("first"));
        builder.extend(vec![Diagnosis::cors("second"), Diagnosis::schema("third")]);
        assert!(builder.has_problem());
        assert_eq!(builder.len(), 3);

        let report = builder.finish();
        let messages: Vec<_> = report.diagnoses().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(report.count(Category::Cors), 1);
    }

    #[test]
    fn test_from_probe_attribution() {
        let diagnosis = Diagnosis::not_found("gone").from_probe(ProbeKind::Preflight);
        assert_eq!(diagnosis.probe, Some(ProbeKind::Preflight));
        assert_eq!(diagnosis.category, Category::NotFound);
    }

    #[test]
    fn test_diagnosis_serializes_category_snake_case() {
        let json = serde_json::to_value(Diagnosis::not_found("x")).unwrap();
        assert_eq!(json["category"], "not_found");
        assert!(json.get("probe").is_none());
    }
}
