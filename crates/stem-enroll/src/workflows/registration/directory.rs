//! Read-only reference data behind a trait seam so the orchestrator can run
//! against Postgres in production and the in-memory catalog in tests and
//! demos. Reference data is immutable for the duration of a session.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{CollegeId, CourseId, LocationId, LocationSelection, SubjectId, UniversityId};

/// Degree option: display name paired with its id and fixed duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOption {
    pub name: String,
    pub id: CourseId,
    pub duration_years: u8,
}

/// Generic display-name/identifier pair used for universities, colleges, and
/// subject sub-fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedOption<Id> {
    pub name: String,
    pub id: Id,
}

/// One level of location choices: distinct values in alphabetical order plus
/// the value-to-identifier lookup for that level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationOptions {
    pub values: Vec<String>,
    pub ids: BTreeMap<String, LocationId>,
}

impl LocationOptions {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, LocationId)>) -> Self {
        let mut ids: BTreeMap<String, LocationId> = BTreeMap::new();
        for (value, id) in pairs {
            // Smallest id wins for a repeated value, matching DISTINCT ON
            // over rows ordered by (value, id).
            ids.entry(value)
                .and_modify(|existing| {
                    if id.0 < existing.0 {
                        *existing = id;
                    }
                })
                .or_insert(id);
        }
        let values = ids.keys().cloned().collect();
        Self { values, ids }
    }

    pub fn id_of(&self, value: &str) -> Option<LocationId> {
        self.ids.get(value).copied()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.ids.contains_key(value)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("reference data unavailable: {0}")]
    Unavailable(String),
}

/// Catalog queries needed by the three registration steps.
///
/// `location_options` implements the hierarchical resolver: given zero, one,
/// two, or three selected levels it returns the distinct choices for the next
/// level. Cascade resets on re-selection of a higher level are the form
/// state's responsibility.
#[async_trait]
pub trait ReferenceDirectory: Send + Sync {
    /// Degrees on offer. One-year courses are excluded from the program.
    async fn course_options(&self) -> Result<Vec<CourseOption>, DirectoryError>;

    async fn university_options(&self) -> Result<Vec<NamedOption<UniversityId>>, DirectoryError>;

    async fn college_options(&self) -> Result<Vec<NamedOption<CollegeId>>, DirectoryError>;

    /// Sub-fields offered in the "currently pursuing" multi-select.
    async fn subject_options(&self) -> Result<Vec<NamedOption<SubjectId>>, DirectoryError>;

    /// Distinct subject areas for the future-interest question.
    async fn subject_areas(&self) -> Result<Vec<String>, DirectoryError>;

    /// Sub-fields belonging to one subject area; changing the area
    /// invalidates any previously chosen sub-field.
    async fn sub_fields(&self, area: &str) -> Result<Vec<NamedOption<SubjectId>>, DirectoryError>;

    /// Next-level location choices under the given partial selection.
    async fn location_options(
        &self,
        selection: &LocationSelection,
    ) -> Result<LocationOptions, DirectoryError>;
}
