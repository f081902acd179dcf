//! The three-step form state machine. The form is an explicit, serializable
//! value passed to and returned from every transition; there is no ambient
//! session storage. Cascade resets (location levels, subject-area to
//! sub-field) are transition logic here, not rendering side effects.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    AcademicYear, CollegeId, CourseChoice, LocationId, LocationSelection, ResolvedInstitution,
    SubjectChoice, UniversityId,
};

/// Where the applicant currently is in the flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    #[default]
    Identity,
    Academics,
    Personal,
    Confirmed,
}

impl FormStep {
    pub const fn label(self) -> &'static str {
        match self {
            FormStep::Identity => "identity",
            FormStep::Academics => "academics",
            FormStep::Personal => "personal",
            FormStep::Confirmed => "confirmed",
        }
    }

    /// Step number as presented to callers (1-based; `Confirmed` is
    /// terminal and unnumbered).
    pub const fn number(self) -> Option<u8> {
        match self {
            FormStep::Identity => Some(1),
            FormStep::Academics => Some(2),
            FormStep::Personal => Some(3),
            FormStep::Confirmed => None,
        }
    }
}

/// Answers from the identity/eligibility step. Recorded even when the step
/// halts so nothing is lost on a back-and-forth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAnswers {
    pub email: String,
    pub identifies_as_woman: Option<bool>,
}

/// Answers from the academic/institution step, resolved against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicsAnswers {
    pub full_name: String,
    pub academic_year: Option<AcademicYear>,
    pub degree: Option<CourseChoice>,
    pub university: Option<ResolvedInstitution<UniversityId>>,
    pub college: Option<ResolvedInstitution<CollegeId>>,
    pub college_location: LocationAnswers,
    pub subjects: Vec<SubjectChoice>,
}

/// Answers from the personal step. Phone numbers are stored normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalAnswers {
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub future_subject_area: Option<String>,
    pub future_sub_field: Option<SubjectChoice>,
    pub hometown: LocationAnswers,
    pub caste_category: Option<String>,
    pub income_range: Option<String>,
    pub motivation: Option<String>,
    pub challenges: Option<String>,
    pub professor_name: Option<String>,
    pub professor_phone: Option<String>,
    pub partner_organization: Option<String>,
}

impl PersonalAnswers {
    /// Changing the subject area invalidates the previously chosen
    /// sub-field.
    pub fn select_future_subject_area(&mut self, area: String) {
        if self.future_subject_area.as_deref() != Some(area.as_str()) {
            self.future_sub_field = None;
        }
        self.future_subject_area = Some(area);
    }
}

/// A resolved location chain. Fields are private so every mutation goes
/// through the setters, which enforce the cascade reset: selecting a level
/// clears everything beneath it and re-anchors the identifier at the most
/// specific selected level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationAnswers {
    country: Option<String>,
    state: Option<String>,
    district: Option<String>,
    city_category: Option<String>,
    location_id: Option<LocationId>,
}

impl LocationAnswers {
    pub fn select_country(&mut self, name: String, id: LocationId) {
        self.country = Some(name);
        self.state = None;
        self.district = None;
        self.city_category = None;
        self.location_id = Some(id);
    }

    pub fn select_state(&mut self, name: String, id: LocationId) {
        self.state = Some(name);
        self.district = None;
        self.city_category = None;
        self.location_id = Some(id);
    }

    pub fn select_district(&mut self, name: String, id: LocationId) {
        self.district = Some(name);
        self.city_category = None;
        self.location_id = Some(id);
    }

    pub fn select_city_category(&mut self, name: String, id: LocationId) {
        self.city_category = Some(name);
        self.location_id = Some(id);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    pub fn city_category(&self) -> Option<&str> {
        self.city_category.as_deref()
    }

    /// Identifier of the most specific level selected so far.
    pub fn location_id(&self) -> Option<LocationId> {
        self.location_id
    }

    pub fn selection(&self) -> LocationSelection {
        LocationSelection {
            country: self.country.clone(),
            state: self.state.clone(),
            district: self.district.clone(),
        }
    }
}

/// The whole in-progress form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationForm {
    step: FormStep,
    pub identity: IdentityAnswers,
    pub academics: AcademicsAnswers,
    pub personal: PersonalAnswers,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a fully answered form ready for final submission. This is
    /// the entry point for callers that collected all fields up front and
    /// only use the final-submission operation.
    pub fn assembled(
        identity: IdentityAnswers,
        academics: AcademicsAnswers,
        personal: PersonalAnswers,
    ) -> Self {
        Self {
            step: FormStep::Personal,
            identity,
            academics,
            personal,
        }
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    /// Move one step back, keeping every recorded answer. Returns `false`
    /// when already at the first step or after confirmation.
    pub fn back(&mut self) -> bool {
        match self.step {
            FormStep::Academics => {
                self.step = FormStep::Identity;
                true
            }
            FormStep::Personal => {
                self.step = FormStep::Academics;
                true
            }
            FormStep::Identity | FormStep::Confirmed => false,
        }
    }

    pub(crate) fn set_step(&mut self, step: FormStep) {
        self.step = step;
    }

    pub(crate) fn confirm(&mut self) {
        self.step = FormStep::Confirmed;
    }
}
