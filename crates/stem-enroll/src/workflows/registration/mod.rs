//! The registration pipeline: field validators, reference-data resolvers,
//! the three-step form state machine, the submission orchestrator, storage
//! adapters, and the HTTP surface.
//!
//! Data flows one direction: caller input -> validators -> form state -> (on
//! advance) resolvers refresh dependent options -> (on final submission) the
//! orchestrator upserts the applicant and writes the bundle in one
//! transaction.

pub mod catalog;
pub mod directory;
pub mod domain;
pub mod policy;
pub mod postgres;
pub mod router;
pub mod service;
pub mod state;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogImportError, ReferenceCatalog};
pub use directory::{
    CourseOption, DirectoryError, LocationOptions, NamedOption, ReferenceDirectory,
};
pub use domain::{
    AcademicYear, ApplicantId, CollegeId, CourseChoice, CourseId, EnrollmentWindow,
    InstitutionPick, LocationFields, LocationId, LocationSelection, ResolvedInstitution,
    StepOneFields, StepThreeFields, StepTwoFields, SubjectChoice, SubjectId, UniversityId,
    DOMESTIC_COUNTRY,
};
pub use policy::{CutoverDay, PolicyError, RegistrationPolicy};
pub use postgres::{PgReferenceDirectory, PgRegistrationStore};
pub use router::registration_router;
pub use service::{
    enrollment_window, split_full_name, RegistrationError, RegistrationService, StepFields,
    StepIssue, StepOutcome, SubmissionError, SubmissionReceipt,
};
pub use state::{
    AcademicsAnswers, FormStep, IdentityAnswers, LocationAnswers, PersonalAnswers,
    RegistrationForm,
};
pub use store::{
    ApplicantUpsert, EducationRecord, ReferralRecord, RegistrationBundle, RegistrationMetadata,
    RegistrationStore, StoreError,
};
pub use validation::{
    check_email, check_essay, check_phone, suggest_provider, EmailFault, EssayFault, PhoneFault,
};
