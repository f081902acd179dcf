//! The submission orchestrator. Validates each step against the reference
//! directory, drives the form state machine, and on final confirmation
//! derives the computed fields and performs the applicant upsert plus the
//! transactional bundle write.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::directory::{DirectoryError, ReferenceDirectory};
use super::domain::{
    AcademicYear, ApplicantId, CollegeId, CourseChoice, EnrollmentWindow, InstitutionPick,
    LocationFields, LocationSelection, ResolvedInstitution, StepOneFields, StepThreeFields,
    StepTwoFields, SubjectChoice, UniversityId, DOMESTIC_COUNTRY,
};
use super::policy::{CutoverDay, RegistrationPolicy};
use super::state::{
    AcademicsAnswers, FormStep, IdentityAnswers, LocationAnswers, PersonalAnswers,
    RegistrationForm,
};
use super::store::{
    ApplicantUpsert, EducationRecord, ReferralRecord, RegistrationBundle, RegistrationMetadata,
    RegistrationStore, StoreError,
};
use super::validation::{check_email, check_essay, check_phone, EmailFault, EssayFault, PhoneFault};

/// Fields for exactly one step, as accepted by [`RegistrationService::submit_step`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepFields {
    One(StepOneFields),
    Two(StepTwoFields),
    Three(StepThreeFields),
}

impl StepFields {
    pub const fn number(&self) -> u8 {
        match self {
            StepFields::One(_) => 1,
            StepFields::Two(_) => 2,
            StepFields::Three(_) => 3,
        }
    }
}

/// Per-field validation issues. `AlreadyRegistered` is deliberately its own
/// variant: callers branch on it to offer a log-in / different-email path
/// instead of a retry-this-field prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepIssue {
    #[error("please enter your email address")]
    EmailMissing,
    #[error("invalid email format")]
    EmailMalformed,
    #[error("invalid email domain")]
    EmailUnsupportedDomain,
    #[error("did you mean {suggestion}?")]
    EmailTypo { suggestion: String },
    #[error("already registered! log in, try another email, or contact {support}")]
    AlreadyRegistered { support: String },
    #[error("please confirm whether you identify as a woman")]
    EligibilityUnanswered,
    #[error("the program is currently open only to women pursuing STEM degrees")]
    NotEligible,

    #[error("step {submitted} cannot be submitted while the form is at the {current} step")]
    OutOfOrder { submitted: u8, current: &'static str },
    #[error("this registration has already been submitted")]
    AlreadyConfirmed,

    #[error("please enter your full name")]
    FullNameMissing,
    #[error("please select your academic year")]
    AcademicYearMissing,
    #[error("'{0}' is not a recognized academic year")]
    AcademicYearUnknown(String),
    #[error("please select your current degree level")]
    DegreeMissing,
    #[error("'{0}' is not in the degree list")]
    DegreeUnknown(String),
    #[error("please select your university")]
    UniversityMissing,
    #[error("'{0}' is not in the university list")]
    UniversityUnknown(String),
    #[error("please enter your university name")]
    UniversityNameMissing,
    #[error("please select your college")]
    CollegeMissing,
    #[error("'{0}' is not in the college list")]
    CollegeUnknown(String),
    #[error("please enter your college name")]
    CollegeNameMissing,
    #[error("please select your {scope} {level}")]
    LocationMissing {
        scope: &'static str,
        level: &'static str,
    },
    #[error("'{value}' is not a valid {scope} {level}")]
    LocationUnknown {
        scope: &'static str,
        level: &'static str,
        value: String,
    },
    #[error("please select at least one subject area")]
    SubjectsMissing,
    #[error("please select at most {max} subject areas")]
    TooManySubjects { max: usize },
    #[error("'{0}' is not in the subject list")]
    SubjectUnknown(String),

    #[error("whatsapp number: {0}")]
    Phone(PhoneFault),
    #[error("please enter your date of birth")]
    DateOfBirthMissing,
    #[error("please select your future subject area")]
    FutureSubjectAreaMissing,
    #[error("'{0}' is not a recognized subject area")]
    FutureSubjectAreaUnknown(String),
    #[error("please select your future sub-field")]
    FutureSubFieldMissing,
    #[error("'{sub_field}' is not a sub-field of {area}")]
    FutureSubFieldMismatch { area: String, sub_field: String },
    #[error("please select your caste/category")]
    CasteMissing,
    #[error("please select your income range")]
    IncomeMissing,
    #[error("{field}: {fault}")]
    Essay {
        field: &'static str,
        fault: EssayFault,
    },
    #[error("{field} is required")]
    EssayMissing { field: &'static str },
    #[error("professor's phone: {0}")]
    ProfessorPhone(PhoneFault),
    #[error("please select your partner organization")]
    PartnerMissing,
    #[error("'{0}' is not a recognized partner organization")]
    PartnerUnknown(String),
}

/// Result of one step submission. `advance` is true when the step's gate
/// passed; step three's gate passing means the form is ready for final
/// submission rather than advanced past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub advance: bool,
    pub issues: Vec<StepIssue>,
}

impl StepOutcome {
    fn advanced() -> Self {
        Self {
            advance: true,
            issues: Vec::new(),
        }
    }

    fn halted(issues: Vec<StepIssue>) -> Self {
        Self {
            advance: false,
            issues,
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    pub fn duplicate_email(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, StepIssue::AlreadyRegistered { .. }))
    }
}

/// Infrastructure failure while validating a step (reference data or the
/// uniqueness check). Distinct from validation issues, which are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the caller gets back after a successful final submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub applicant_id: ApplicantId,
    pub enrollment: EnrollmentWindow,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission blocked by validation issues")]
    Invalid(Vec<StepIssue>),
    /// The applicant row was saved but the registration could not be
    /// completed; the caller must show the support contact rather than a
    /// plain retry prompt.
    #[error("your basic information has been saved, but we could not complete the registration; please contact {support}")]
    BasicRecordSaved { support: String },
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service composing the validators, the reference directory, and the store.
pub struct RegistrationService<S, D> {
    store: Arc<S>,
    directory: Arc<D>,
    policy: RegistrationPolicy,
}

impl<S, D> RegistrationService<S, D>
where
    S: RegistrationStore + 'static,
    D: ReferenceDirectory + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, policy: RegistrationPolicy) -> Self {
        Self {
            store,
            directory,
            policy,
        }
    }

    pub fn policy(&self) -> &RegistrationPolicy {
        &self.policy
    }

    /// Validate one step and advance the form when its gate passes. The form
    /// is taken and returned by value; nothing about a failed step is lost.
    /// Re-submitting an earlier step rewinds the flow to just after it while
    /// preserving every later answer.
    pub async fn submit_step(
        &self,
        mut form: RegistrationForm,
        fields: StepFields,
    ) -> Result<(RegistrationForm, StepOutcome), RegistrationError> {
        if form.step() == FormStep::Confirmed {
            return Ok((form, StepOutcome::halted(vec![StepIssue::AlreadyConfirmed])));
        }

        let outcome = match fields {
            StepFields::One(fields) => self.apply_identity(&mut form, fields).await?,
            StepFields::Two(fields) => {
                if form.step() == FormStep::Identity {
                    StepOutcome::halted(vec![StepIssue::OutOfOrder {
                        submitted: 2,
                        current: form.step().label(),
                    }])
                } else {
                    self.apply_academics(&mut form, fields).await?
                }
            }
            StepFields::Three(fields) => {
                if form.step() != FormStep::Personal {
                    StepOutcome::halted(vec![StepIssue::OutOfOrder {
                        submitted: 3,
                        current: form.step().label(),
                    }])
                } else {
                    self.apply_personal(&mut form, fields).await?
                }
            }
        };

        Ok((form, outcome))
    }

    async fn apply_identity(
        &self,
        form: &mut RegistrationForm,
        fields: StepOneFields,
    ) -> Result<StepOutcome, RegistrationError> {
        let mut issues = Vec::new();
        let email = fields.email.trim().to_string();

        if email.is_empty() {
            issues.push(StepIssue::EmailMissing);
        } else {
            match check_email(&email) {
                Ok(()) => {
                    if self.store.email_registered(&email).await? {
                        issues.push(StepIssue::AlreadyRegistered {
                            support: self.policy.support_contact.clone(),
                        });
                    }
                }
                Err(EmailFault::Malformed) => issues.push(StepIssue::EmailMalformed),
                Err(EmailFault::UnsupportedDomain) => issues.push(StepIssue::EmailUnsupportedDomain),
                Err(EmailFault::KnownTypo { suggestion }) => {
                    issues.push(StepIssue::EmailTypo { suggestion });
                }
            }
        }

        match fields.identifies_as_woman {
            Some(true) => {}
            Some(false) => issues.push(StepIssue::NotEligible),
            None => issues.push(StepIssue::EligibilityUnanswered),
        }

        // Record the answers even when halting so nothing is retyped.
        form.identity = IdentityAnswers {
            email,
            identifies_as_woman: fields.identifies_as_woman,
        };

        if issues.is_empty() {
            form.set_step(FormStep::Academics);
            Ok(StepOutcome::advanced())
        } else {
            Ok(StepOutcome::halted(issues))
        }
    }

    async fn apply_academics(
        &self,
        form: &mut RegistrationForm,
        fields: StepTwoFields,
    ) -> Result<StepOutcome, RegistrationError> {
        let mut issues = Vec::new();

        let full_name = fields.full_name.trim().to_string();
        if full_name.is_empty() {
            issues.push(StepIssue::FullNameMissing);
        }

        let academic_year = match non_empty(fields.academic_year) {
            None => {
                issues.push(StepIssue::AcademicYearMissing);
                None
            }
            Some(label) => match AcademicYear::parse(&label) {
                Some(year) => Some(year),
                None => {
                    issues.push(StepIssue::AcademicYearUnknown(label));
                    None
                }
            },
        };

        let degree = match non_empty(fields.degree) {
            None => {
                issues.push(StepIssue::DegreeMissing);
                None
            }
            Some(name) => {
                let options = self.directory.course_options().await?;
                match options.into_iter().find(|option| option.name == name) {
                    Some(option) => Some(CourseChoice {
                        name: option.name,
                        id: option.id,
                        duration_years: option.duration_years,
                    }),
                    None => {
                        issues.push(StepIssue::DegreeUnknown(name));
                        None
                    }
                }
            }
        };

        let university: Option<ResolvedInstitution<UniversityId>> = match fields.university {
            None => {
                issues.push(StepIssue::UniversityMissing);
                None
            }
            Some(InstitutionPick::Listed { name }) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    issues.push(StepIssue::UniversityMissing);
                    None
                } else {
                    let options = self.directory.university_options().await?;
                    match options.into_iter().find(|option| option.name == name) {
                        Some(option) => Some(ResolvedInstitution::Listed {
                            name: option.name,
                            id: option.id,
                        }),
                        None => {
                            issues.push(StepIssue::UniversityUnknown(name));
                            None
                        }
                    }
                }
            }
            Some(InstitutionPick::Other { name }) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    issues.push(StepIssue::UniversityNameMissing);
                    None
                } else {
                    Some(ResolvedInstitution::Other { name })
                }
            }
        };

        let college: Option<ResolvedInstitution<CollegeId>> = match fields.college {
            None => {
                issues.push(StepIssue::CollegeMissing);
                None
            }
            Some(InstitutionPick::Listed { name }) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    issues.push(StepIssue::CollegeMissing);
                    None
                } else {
                    let options = self.directory.college_options().await?;
                    match options.into_iter().find(|option| option.name == name) {
                        Some(option) => Some(ResolvedInstitution::Listed {
                            name: option.name,
                            id: option.id,
                        }),
                        None => {
                            issues.push(StepIssue::CollegeUnknown(name));
                            None
                        }
                    }
                }
            }
            Some(InstitutionPick::Other { name }) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    issues.push(StepIssue::CollegeNameMissing);
                    None
                } else {
                    Some(ResolvedInstitution::Other { name })
                }
            }
        };

        let college_location = self
            .resolve_location(&fields.college_location, "college", &mut issues)
            .await?;

        let mut subjects = Vec::new();
        if fields.subjects.is_empty() {
            issues.push(StepIssue::SubjectsMissing);
        } else if fields.subjects.len() > self.policy.max_subject_selections {
            issues.push(StepIssue::TooManySubjects {
                max: self.policy.max_subject_selections,
            });
        } else {
            let options = self.directory.subject_options().await?;
            for raw in &fields.subjects {
                let name = raw.trim();
                match options.iter().find(|option| option.name == name) {
                    Some(option) => subjects.push(SubjectChoice {
                        name: option.name.clone(),
                        id: option.id,
                    }),
                    None => issues.push(StepIssue::SubjectUnknown(name.to_string())),
                }
            }
        }

        if issues.is_empty() {
            form.academics = AcademicsAnswers {
                full_name,
                academic_year,
                degree,
                university,
                college,
                college_location,
                subjects,
            };
            form.set_step(FormStep::Personal);
            Ok(StepOutcome::advanced())
        } else {
            Ok(StepOutcome::halted(issues))
        }
    }

    async fn apply_personal(
        &self,
        form: &mut RegistrationForm,
        fields: StepThreeFields,
    ) -> Result<StepOutcome, RegistrationError> {
        let mut issues = Vec::new();

        let phone = match check_phone(&fields.phone) {
            Ok(digits) => digits,
            Err(fault) => {
                issues.push(StepIssue::Phone(fault));
                String::new()
            }
        };

        if fields.date_of_birth.is_none() {
            issues.push(StepIssue::DateOfBirthMissing);
        }

        let future_subject_area = non_empty(fields.future_subject_area);
        let mut future_sub_field = None;
        match &future_subject_area {
            None => issues.push(StepIssue::FutureSubjectAreaMissing),
            Some(area) => {
                let areas = self.directory.subject_areas().await?;
                if !areas.iter().any(|known| known == area) {
                    issues.push(StepIssue::FutureSubjectAreaUnknown(area.clone()));
                } else {
                    match non_empty(fields.future_sub_field) {
                        None => issues.push(StepIssue::FutureSubFieldMissing),
                        Some(name) => {
                            let options = self.directory.sub_fields(area).await?;
                            match options.into_iter().find(|option| option.name == name) {
                                Some(option) => {
                                    future_sub_field = Some(SubjectChoice {
                                        name: option.name,
                                        id: option.id,
                                    });
                                }
                                None => issues.push(StepIssue::FutureSubFieldMismatch {
                                    area: area.clone(),
                                    sub_field: name,
                                }),
                            }
                        }
                    }
                }
            }
        }

        let hometown = self
            .resolve_location(&fields.hometown, "hometown", &mut issues)
            .await?;

        let caste_category = non_empty(fields.caste_category);
        if caste_category.is_none() {
            issues.push(StepIssue::CasteMissing);
        }
        let income_range = non_empty(fields.income_range);
        if income_range.is_none() {
            issues.push(StepIssue::IncomeMissing);
        }

        let motivation = self.checked_essay("motivation", fields.motivation, &mut issues);
        let challenges = self.checked_essay("challenges", fields.challenges, &mut issues);

        let professor_name = non_empty(fields.professor_name);
        let professor_phone = match non_empty(fields.professor_phone) {
            None => None,
            Some(raw) => match check_phone(&raw) {
                Ok(digits) => Some(digits),
                Err(fault) => {
                    issues.push(StepIssue::ProfessorPhone(fault));
                    None
                }
            },
        };

        let partner_organization = non_empty(fields.partner_organization);
        match &partner_organization {
            None => {
                if self.policy.partner_required {
                    issues.push(StepIssue::PartnerMissing);
                }
            }
            Some(choice) => {
                if !self
                    .policy
                    .partner_organizations
                    .iter()
                    .any(|option| option == choice)
                {
                    issues.push(StepIssue::PartnerUnknown(choice.clone()));
                }
            }
        }

        if issues.is_empty() {
            let mut personal = PersonalAnswers {
                phone,
                date_of_birth: fields.date_of_birth,
                future_subject_area: None,
                future_sub_field: None,
                hometown,
                caste_category,
                income_range,
                motivation,
                challenges,
                professor_name,
                professor_phone,
                partner_organization,
            };
            if let Some(area) = future_subject_area {
                personal.select_future_subject_area(area);
                personal.future_sub_field = future_sub_field;
            }
            form.personal = personal;
            Ok(StepOutcome::advanced())
        } else {
            Ok(StepOutcome::halted(issues))
        }
    }

    /// Walk a submitted location chain level by level, confirming each value
    /// against the options valid under its parent. The returned answers
    /// carry the identifier of the most specific resolved level. Countries
    /// other than the domestic one resolve at the country level.
    async fn resolve_location(
        &self,
        fields: &LocationFields,
        scope: &'static str,
        issues: &mut Vec<StepIssue>,
    ) -> Result<LocationAnswers, RegistrationError> {
        let mut answers = LocationAnswers::default();

        let Some(country) = fields.country.as_deref().map(str::trim).filter(|v| !v.is_empty())
        else {
            issues.push(StepIssue::LocationMissing {
                scope,
                level: "country",
            });
            return Ok(answers);
        };
        let options = self
            .directory
            .location_options(&LocationSelection::default())
            .await?;
        match options.id_of(country) {
            Some(id) => answers.select_country(country.to_string(), id),
            None => {
                issues.push(StepIssue::LocationUnknown {
                    scope,
                    level: "country",
                    value: country.to_string(),
                });
                return Ok(answers);
            }
        }
        if country != DOMESTIC_COUNTRY {
            return Ok(answers);
        }

        let Some(state) = fields.state.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
            issues.push(StepIssue::LocationMissing {
                scope,
                level: "state/union territory",
            });
            return Ok(answers);
        };
        let options = self.directory.location_options(&answers.selection()).await?;
        match options.id_of(state) {
            Some(id) => answers.select_state(state.to_string(), id),
            None => {
                issues.push(StepIssue::LocationUnknown {
                    scope,
                    level: "state/union territory",
                    value: state.to_string(),
                });
                return Ok(answers);
            }
        }

        let Some(district) = fields
            .district
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        else {
            issues.push(StepIssue::LocationMissing {
                scope,
                level: "district",
            });
            return Ok(answers);
        };
        let options = self.directory.location_options(&answers.selection()).await?;
        match options.id_of(district) {
            Some(id) => answers.select_district(district.to_string(), id),
            None => {
                issues.push(StepIssue::LocationUnknown {
                    scope,
                    level: "district",
                    value: district.to_string(),
                });
                return Ok(answers);
            }
        }

        let Some(city) = fields
            .city_category
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        else {
            issues.push(StepIssue::LocationMissing {
                scope,
                level: "city category",
            });
            return Ok(answers);
        };
        let options = self.directory.location_options(&answers.selection()).await?;
        match options.id_of(city) {
            Some(id) => answers.select_city_category(city.to_string(), id),
            None => {
                issues.push(StepIssue::LocationUnknown {
                    scope,
                    level: "city category",
                    value: city.to_string(),
                });
            }
        }

        Ok(answers)
    }

    fn checked_essay(
        &self,
        field: &'static str,
        value: Option<String>,
        issues: &mut Vec<StepIssue>,
    ) -> Option<String> {
        let value = non_empty(value);
        match &value {
            None => {
                if self.policy.essays_required {
                    issues.push(StepIssue::EssayMissing { field });
                }
            }
            Some(text) => {
                if let Err(fault) = check_essay(text, self.policy.essay_min_chars) {
                    issues.push(StepIssue::Essay { field, fault });
                }
            }
        }
        value
    }

    /// Final confirmation: revalidate every gate from the recorded answers,
    /// derive the computed fields, upsert the applicant, and write the
    /// bundle in one transaction. The form is returned unchanged on failure
    /// so no data is lost; on success it moves to `Confirmed`.
    pub async fn submit_final(
        &self,
        mut form: RegistrationForm,
    ) -> (RegistrationForm, Result<SubmissionReceipt, SubmissionError>) {
        match form.step() {
            FormStep::Personal => {}
            FormStep::Confirmed => {
                return (
                    form,
                    Err(SubmissionError::Invalid(vec![StepIssue::AlreadyConfirmed])),
                );
            }
            other => {
                return (
                    form,
                    Err(SubmissionError::Invalid(vec![StepIssue::OutOfOrder {
                        submitted: 3,
                        current: other.label(),
                    }])),
                );
            }
        }

        let submitted_at = Utc::now();
        let (upsert, bundle, enrollment) = match self.prepare_submission(&form, submitted_at) {
            Ok(prepared) => prepared,
            Err(issues) => return (form, Err(SubmissionError::Invalid(issues))),
        };

        let applicant_id = match self.store.upsert_applicant(&upsert).await {
            Ok(id) => id,
            Err(StoreError::IdentifierUnavailable) => {
                warn!(email = %upsert.email, "applicant saved but id retrieval failed");
                return (
                    form,
                    Err(SubmissionError::BasicRecordSaved {
                        support: self.policy.support_contact.clone(),
                    }),
                );
            }
            Err(other) => return (form, Err(SubmissionError::Store(other))),
        };

        if let Err(error) = self.store.persist_registration(applicant_id, &bundle).await {
            warn!(applicant = applicant_id.0, %error, "registration bundle rolled back");
            return (form, Err(SubmissionError::Store(error)));
        }

        form.confirm();
        info!(applicant = applicant_id.0, "registration persisted");
        (
            form,
            Ok(SubmissionReceipt {
                applicant_id,
                enrollment,
                submitted_at,
            }),
        )
    }

    /// Revalidate the recorded answers and derive everything the store
    /// needs. Identifier-level consistency was established while the steps
    /// were applied; this pass guards required-ness and formats so a
    /// caller-assembled form gets the same treatment as a stepped one.
    #[allow(clippy::type_complexity)]
    fn prepare_submission(
        &self,
        form: &RegistrationForm,
        submitted_at: DateTime<Utc>,
    ) -> Result<(ApplicantUpsert, RegistrationBundle, EnrollmentWindow), Vec<StepIssue>> {
        let mut issues = Vec::new();

        let identity = &form.identity;
        let academics = &form.academics;
        let personal = &form.personal;

        let email = identity.email.trim();
        if email.is_empty() {
            issues.push(StepIssue::EmailMissing);
        } else if let Err(fault) = check_email(email) {
            issues.push(match fault {
                EmailFault::Malformed => StepIssue::EmailMalformed,
                EmailFault::UnsupportedDomain => StepIssue::EmailUnsupportedDomain,
                EmailFault::KnownTypo { suggestion } => StepIssue::EmailTypo { suggestion },
            });
        }
        match identity.identifies_as_woman {
            Some(true) => {}
            Some(false) => issues.push(StepIssue::NotEligible),
            None => issues.push(StepIssue::EligibilityUnanswered),
        }

        let full_name = academics.full_name.trim();
        if full_name.is_empty() {
            issues.push(StepIssue::FullNameMissing);
        }
        if academics.academic_year.is_none() {
            issues.push(StepIssue::AcademicYearMissing);
        }
        if academics.degree.is_none() {
            issues.push(StepIssue::DegreeMissing);
        }
        match &academics.university {
            None => issues.push(StepIssue::UniversityMissing),
            Some(ResolvedInstitution::Other { name }) if name.trim().is_empty() => {
                issues.push(StepIssue::UniversityNameMissing);
            }
            Some(_) => {}
        }
        match &academics.college {
            None => issues.push(StepIssue::CollegeMissing),
            Some(ResolvedInstitution::Other { name }) if name.trim().is_empty() => {
                issues.push(StepIssue::CollegeNameMissing);
            }
            Some(_) => {}
        }
        if academics.college_location.location_id().is_none() {
            issues.push(StepIssue::LocationMissing {
                scope: "college",
                level: "location",
            });
        }
        if academics.subjects.is_empty() {
            issues.push(StepIssue::SubjectsMissing);
        } else if academics.subjects.len() > self.policy.max_subject_selections {
            issues.push(StepIssue::TooManySubjects {
                max: self.policy.max_subject_selections,
            });
        }

        if let Err(fault) = check_phone(&personal.phone) {
            issues.push(StepIssue::Phone(fault));
        }
        if personal.date_of_birth.is_none() {
            issues.push(StepIssue::DateOfBirthMissing);
        }
        if personal.future_subject_area.is_none() {
            issues.push(StepIssue::FutureSubjectAreaMissing);
        }
        if personal.future_sub_field.is_none() {
            issues.push(StepIssue::FutureSubFieldMissing);
        }
        if personal.hometown.location_id().is_none() {
            issues.push(StepIssue::LocationMissing {
                scope: "hometown",
                level: "location",
            });
        }
        if personal.caste_category.is_none() {
            issues.push(StepIssue::CasteMissing);
        }
        if personal.income_range.is_none() {
            issues.push(StepIssue::IncomeMissing);
        }
        for (field, value) in [
            ("motivation", &personal.motivation),
            ("challenges", &personal.challenges),
        ] {
            match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                None => {
                    if self.policy.essays_required {
                        issues.push(StepIssue::EssayMissing { field });
                    }
                }
                Some(text) => {
                    if let Err(fault) = check_essay(text, self.policy.essay_min_chars) {
                        issues.push(StepIssue::Essay { field, fault });
                    }
                }
            }
        }
        if let Some(raw) = personal
            .professor_phone
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            if let Err(fault) = check_phone(raw) {
                issues.push(StepIssue::ProfessorPhone(fault));
            }
        }
        match &personal.partner_organization {
            None => {
                if self.policy.partner_required {
                    issues.push(StepIssue::PartnerMissing);
                }
            }
            Some(choice) => {
                if !self
                    .policy
                    .partner_organizations
                    .iter()
                    .any(|option| option == choice)
                {
                    issues.push(StepIssue::PartnerUnknown(choice.clone()));
                }
            }
        }

        let college_id = academics.college.as_ref().and_then(ResolvedInstitution::id);

        match (
            &academics.academic_year,
            &academics.degree,
            academics.college_location.location_id(),
            personal.date_of_birth,
            &personal.future_sub_field,
            personal.hometown.location_id(),
            &personal.caste_category,
            &personal.income_range,
        ) {
            (
                Some(academic_year),
                Some(degree),
                Some(college_location_id),
                Some(date_of_birth),
                Some(sub_field),
                Some(hometown_location_id),
                Some(caste_category),
                Some(income_range),
            ) if issues.is_empty() => {
                let (enrollment, current_year_of_study) = enrollment_window(
                    *academic_year,
                    degree.duration_years,
                    submitted_at.date_naive(),
                    self.policy.academic_cutover,
                );

                let (first_name, last_name) = split_full_name(full_name);
                let upsert = ApplicantUpsert {
                    email: email.to_lowercase(),
                    first_name,
                    last_name,
                    gender: "F".to_string(),
                    phone: personal.phone.clone(),
                    date_of_birth,
                    caste_category: caste_category.clone(),
                    annual_family_income: income_range.clone(),
                    location_id: hometown_location_id,
                };

                let form_details = json!({
                    "motivation": personal.motivation,
                    "challenges": personal.challenges,
                    "partner_organization": personal.partner_organization,
                    "new_university_name": academics
                        .university
                        .as_ref()
                        .and_then(ResolvedInstitution::manual_name),
                    "new_college_name": academics
                        .college
                        .as_ref()
                        .and_then(ResolvedInstitution::manual_name),
                    "currently_pursuing_year": academic_year.label(),
                });

                let bundle = RegistrationBundle {
                    education: EducationRecord {
                        course_id: degree.id,
                        current_year_of_study,
                        subject_ids: academics
                            .subjects
                            .iter()
                            .map(|subject| subject.id)
                            .collect(),
                        interest_sub_field_id: sub_field.id,
                        university_id: academics
                            .university
                            .as_ref()
                            .and_then(ResolvedInstitution::id),
                        college_id,
                        college_location_id,
                        enrollment,
                    },
                    metadata: RegistrationMetadata {
                        form_details,
                        submitted_at,
                    },
                    referral: referral_record(
                        college_id,
                        personal.professor_name.clone(),
                        personal.professor_phone.clone(),
                    ),
                };

                Ok((upsert, bundle, enrollment))
            }
            _ => Err(issues),
        }
    }
}

/// Map the academic-year label ordinal onto the enrollment window, clamping
/// the year of study to the course duration. Returns the window and the
/// clamped ordinal.
pub fn enrollment_window(
    year: AcademicYear,
    duration_years: u8,
    on: NaiveDate,
    cutover: CutoverDay,
) -> (EnrollmentWindow, u8) {
    let current_year_of_study = year.ordinal().min(duration_years);
    let boundary = cutover.boundary_year(on);
    let start_year = boundary - i32::from(current_year_of_study) + 1;
    (
        EnrollmentWindow {
            start_year,
            end_year: start_year + i32::from(duration_years),
        },
        current_year_of_study,
    )
}

/// Split a full name on the first space and title-case each half.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(' ') {
        Some((first, rest)) => (title_case(first), title_case(rest.trim())),
        None => (title_case(trimmed), String::new()),
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn referral_record(
    college_id: Option<CollegeId>,
    professor_name: Option<String>,
    professor_phone: Option<String>,
) -> Option<ReferralRecord> {
    let professor_name = non_empty(professor_name);
    let professor_phone = non_empty(professor_phone);
    if professor_name.is_none() && professor_phone.is_none() {
        return None;
    }
    Some(ReferralRecord {
        college_id,
        professor_name,
        professor_phone,
    })
}
