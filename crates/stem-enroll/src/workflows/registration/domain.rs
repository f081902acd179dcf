use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable numeric identifier of a stored applicant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub i64);

/// Identifier of a degree/course in the reference catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(pub i32);

/// Identifier of a university in the reference catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniversityId(pub i32);

/// Identifier of a college in the reference catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollegeId(pub i32);

/// Identifier of a subject sub-field in the reference catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub i32);

/// Identifier of a node in the location hierarchy. Always the id of the most
/// specific level the applicant selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub i32);

/// The country whose full four-level location chain (state, district,
/// city-category) must be resolved; other countries stop at the country id.
pub const DOMESTIC_COUNTRY: &str = "India";

/// Academic year the applicant is currently pursuing. The persisted
/// year-of-study is clamped to the course duration at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcademicYear {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl AcademicYear {
    pub const ALL: [AcademicYear; 5] = [
        AcademicYear::First,
        AcademicYear::Second,
        AcademicYear::Third,
        AcademicYear::Fourth,
        AcademicYear::Fifth,
    ];

    pub const fn ordinal(self) -> u8 {
        match self {
            AcademicYear::First => 1,
            AcademicYear::Second => 2,
            AcademicYear::Third => 3,
            AcademicYear::Fourth => 4,
            AcademicYear::Fifth => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AcademicYear::First => "1st Year",
            AcademicYear::Second => "2nd Year",
            AcademicYear::Third => "3rd Year",
            AcademicYear::Fourth => "4th Year",
            AcademicYear::Fifth => "5th Year",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|year| year.label().eq_ignore_ascii_case(trimmed))
    }
}

/// Institution dropdown selection; "Others" carries a manually typed name
/// instead of a catalog identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionPick {
    Listed { name: String },
    Other { name: String },
}

/// An institution selection after resolution against the reference catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedInstitution<Id> {
    Listed { name: String, id: Id },
    Other { name: String },
}

impl<Id: Copy> ResolvedInstitution<Id> {
    pub fn id(&self) -> Option<Id> {
        match self {
            ResolvedInstitution::Listed { id, .. } => Some(*id),
            ResolvedInstitution::Other { .. } => None,
        }
    }

    /// The manually entered name, present only for the "Others" override.
    pub fn manual_name(&self) -> Option<&str> {
        match self {
            ResolvedInstitution::Listed { .. } => None,
            ResolvedInstitution::Other { name } => Some(name),
        }
    }
}

/// A degree selection resolved to its catalog id and fixed duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseChoice {
    pub name: String,
    pub id: CourseId,
    pub duration_years: u8,
}

/// A subject (sub-field) selection resolved to its catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectChoice {
    pub name: String,
    pub id: SubjectId,
}

/// Partial location chain as selected so far, most specific level last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub country: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
}

impl LocationSelection {
    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            state: None,
            district: None,
        }
    }

    pub fn state(country: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            state: Some(state.into()),
            district: None,
        }
    }

    pub fn district(
        country: impl Into<String>,
        state: impl Into<String>,
        district: impl Into<String>,
    ) -> Self {
        Self {
            country: Some(country.into()),
            state: Some(state.into()),
            district: Some(district.into()),
        }
    }
}

/// Raw location levels as submitted by the caller for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFields {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub city_category: Option<String>,
}

/// Computed enrollment window derived from the academic-year ordinal and the
/// course duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentWindow {
    pub start_year: i32,
    pub end_year: i32,
}

/// Fields collected on the identity/eligibility step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOneFields {
    pub email: String,
    #[serde(default)]
    pub identifies_as_woman: Option<bool>,
}

/// Fields collected on the academic/institution step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTwoFields {
    pub full_name: String,
    #[serde(default)]
    pub academic_year: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub university: Option<InstitutionPick>,
    #[serde(default)]
    pub college: Option<InstitutionPick>,
    #[serde(default)]
    pub college_location: LocationFields,
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// Fields collected on the personal/submission step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepThreeFields {
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub future_subject_area: Option<String>,
    #[serde(default)]
    pub future_sub_field: Option<String>,
    #[serde(default)]
    pub hometown: LocationFields,
    #[serde(default)]
    pub caste_category: Option<String>,
    #[serde(default)]
    pub income_range: Option<String>,
    #[serde(default)]
    pub motivation: Option<String>,
    #[serde(default)]
    pub challenges: Option<String>,
    #[serde(default)]
    pub professor_name: Option<String>,
    #[serde(default)]
    pub professor_phone: Option<String>,
    #[serde(default)]
    pub partner_organization: Option<String>,
}
