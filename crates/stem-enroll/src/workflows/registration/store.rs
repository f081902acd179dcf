//! Storage abstraction for the write side of the pipeline. The orchestrator
//! talks to these traits only, so the same flow runs against Postgres in
//! production and the in-memory store in tests and demo mode.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{
    ApplicantId, CollegeId, CourseId, EnrollmentWindow, LocationId, SubjectId, UniversityId,
};

/// Applicant row as written by the upsert. `email` is already lower-cased;
/// the lower-cased value is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantUpsert {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub caste_category: String,
    pub annual_family_income: String,
    pub location_id: LocationId,
}

/// Education row: catalog identifiers plus the computed enrollment window.
/// `current_year_of_study` is clamped to the course duration before it gets
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub course_id: CourseId,
    pub current_year_of_study: u8,
    pub subject_ids: Vec<SubjectId>,
    pub interest_sub_field_id: SubjectId,
    pub university_id: Option<UniversityId>,
    pub college_id: Option<CollegeId>,
    pub college_location_id: LocationId,
    pub enrollment: EnrollmentWindow,
}

/// Free-form registration details preserved as JSON, plus the submission
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationMetadata {
    pub form_details: Value,
    pub submitted_at: DateTime<Utc>,
}

/// Optional professor referral. Written only when at least one field is
/// non-empty; an empty member is persisted as NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralRecord {
    pub college_id: Option<CollegeId>,
    pub professor_name: Option<String>,
    pub professor_phone: Option<String>,
}

/// Everything written inside the all-or-nothing transaction after the
/// applicant upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationBundle {
    pub education: EducationRecord,
    pub metadata: RegistrationMetadata,
    pub referral: Option<ReferralRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// The applicant row was saved but its identifier could not be read
    /// back. Callers surface this as the "basic record saved" condition.
    #[error("applicant row saved but no identifier was returned")]
    IdentifierUnavailable,
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Case-insensitive existence check against prior applicants.
    async fn email_registered(&self, email: &str) -> Result<bool, StoreError>;

    /// Atomic insert-or-update keyed by the lower-cased email, returning the
    /// stable applicant id. Must not be a read-then-write sequence; racing
    /// submissions for the same email degrade to last-writer-wins.
    async fn upsert_applicant(&self, applicant: &ApplicantUpsert)
        -> Result<ApplicantId, StoreError>;

    /// Write the education record, registration metadata, and optional
    /// referral in one transaction. A failure must leave none of them
    /// persisted.
    async fn persist_registration(
        &self,
        applicant_id: ApplicantId,
        bundle: &RegistrationBundle,
    ) -> Result<(), StoreError>;
}
