//! Deployment-varying registration rules. Historical deployments disagreed on
//! whether the essays are required and which partner organizations appear, so
//! both are configuration rather than code.

use std::env;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Month/day on which the academic year rolls over; dates before it belong
/// to the previous academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoverDay {
    pub month: u32,
    pub day: u32,
}

impl CutoverDay {
    pub const DEFAULT: CutoverDay = CutoverDay { month: 7, day: 1 };

    /// The calendar year in which the academic year containing `on` started.
    pub fn boundary_year(self, on: NaiveDate) -> i32 {
        let cutover = NaiveDate::from_ymd_opt(on.year(), self.month, self.day).or_else(|| {
            NaiveDate::from_ymd_opt(on.year(), Self::DEFAULT.month, Self::DEFAULT.day)
        });
        match cutover {
            Some(cutover) if on < cutover => on.year() - 1,
            _ => on.year(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("APP_ESSAY_MIN_CHARS must be a non-negative integer")]
    InvalidEssayMinimum,
    #[error("APP_ESSAYS_REQUIRED must be 'true' or 'false'")]
    InvalidEssaysRequired,
    #[error("APP_PARTNER_REQUIRED must be 'true' or 'false'")]
    InvalidPartnerRequired,
    #[error("APP_MAX_SUBJECTS must be a positive integer")]
    InvalidMaxSubjects,
    #[error("APP_ACADEMIC_CUTOVER must be 'MM-DD' naming a valid date")]
    InvalidCutover,
}

/// Rules applied by the orchestrator on the final step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationPolicy {
    pub essay_min_chars: usize,
    pub essays_required: bool,
    pub partner_organizations: Vec<String>,
    pub partner_required: bool,
    pub max_subject_selections: usize,
    pub academic_cutover: CutoverDay,
    pub support_contact: String,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            essay_min_chars: 50,
            essays_required: false,
            partner_organizations: default_partner_organizations(),
            partner_required: true,
            max_subject_selections: 4,
            academic_cutover: CutoverDay::DEFAULT,
            support_contact: "support@stem-enroll.example".to_string(),
        }
    }
}

fn default_partner_organizations() -> Vec<String> {
    [
        "Avanti Fellows",
        "Christ University / Trivandrum Chapter",
        "Christ University / Bangalore Chapter",
        "Dr. Reddy's Foundation - SASHAKTH",
        "Eklavya Foundation",
        "Udayan Care - Udayan Shalini Fellowship",
        "I'm applying on my own (not through any organization)",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl RegistrationPolicy {
    /// Build the policy from the environment, falling back to the defaults
    /// field by field.
    pub fn from_env() -> Result<Self, PolicyError> {
        let mut policy = Self::default();

        if let Ok(value) = env::var("APP_ESSAY_MIN_CHARS") {
            policy.essay_min_chars = value
                .trim()
                .parse()
                .map_err(|_| PolicyError::InvalidEssayMinimum)?;
        }
        if let Ok(value) = env::var("APP_ESSAYS_REQUIRED") {
            policy.essays_required = parse_bool(&value).ok_or(PolicyError::InvalidEssaysRequired)?;
        }
        if let Ok(value) = env::var("APP_PARTNER_ORGS") {
            let organizations: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect();
            if !organizations.is_empty() {
                policy.partner_organizations = organizations;
            }
        }
        if let Ok(value) = env::var("APP_PARTNER_REQUIRED") {
            policy.partner_required = parse_bool(&value).ok_or(PolicyError::InvalidPartnerRequired)?;
        }
        if let Ok(value) = env::var("APP_MAX_SUBJECTS") {
            let max = value
                .trim()
                .parse::<usize>()
                .map_err(|_| PolicyError::InvalidMaxSubjects)?;
            if max == 0 {
                return Err(PolicyError::InvalidMaxSubjects);
            }
            policy.max_subject_selections = max;
        }
        if let Ok(value) = env::var("APP_ACADEMIC_CUTOVER") {
            policy.academic_cutover = parse_cutover(&value).ok_or(PolicyError::InvalidCutover)?;
        }
        if let Ok(value) = env::var("APP_SUPPORT_CONTACT") {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                policy.support_contact = trimmed.to_string();
            }
        }

        Ok(policy)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_cutover(value: &str) -> Option<CutoverDay> {
    let (month, day) = value.trim().split_once('-')?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    // Probe against a leap year so 02-29 stays representable.
    NaiveDate::from_ymd_opt(2024, month, day)?;
    Some(CutoverDay { month, day })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ESSAY_MIN_CHARS");
        env::remove_var("APP_ESSAYS_REQUIRED");
        env::remove_var("APP_PARTNER_ORGS");
        env::remove_var("APP_PARTNER_REQUIRED");
        env::remove_var("APP_MAX_SUBJECTS");
        env::remove_var("APP_ACADEMIC_CUTOVER");
        env::remove_var("APP_SUPPORT_CONTACT");
    }

    #[test]
    fn defaults_match_the_production_deployment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let policy = RegistrationPolicy::from_env().expect("policy loads");
        assert_eq!(policy.essay_min_chars, 50);
        assert!(!policy.essays_required);
        assert!(policy.partner_required);
        assert_eq!(policy.max_subject_selections, 4);
        assert_eq!(policy.academic_cutover, CutoverDay::DEFAULT);
        assert!(policy
            .partner_organizations
            .iter()
            .any(|org| org == "Avanti Fellows"));
    }

    #[test]
    fn env_overrides_replace_individual_fields() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ESSAY_MIN_CHARS", "120");
        env::set_var("APP_ESSAYS_REQUIRED", "true");
        env::set_var("APP_PARTNER_ORGS", "Org A, Org B ,, ");
        env::set_var("APP_ACADEMIC_CUTOVER", "08-15");

        let policy = RegistrationPolicy::from_env().expect("policy loads");
        assert_eq!(policy.essay_min_chars, 120);
        assert!(policy.essays_required);
        assert_eq!(policy.partner_organizations, ["Org A", "Org B"]);
        assert_eq!(policy.academic_cutover, CutoverDay { month: 8, day: 15 });
        reset_env();
    }

    #[test]
    fn invalid_cutover_strings_are_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ACADEMIC_CUTOVER", "13-40");
        let error = RegistrationPolicy::from_env().expect_err("bad cutover rejected");
        assert!(matches!(error, PolicyError::InvalidCutover));
        reset_env();
    }

    #[test]
    fn boundary_year_flips_at_the_cutover() {
        let cutover = CutoverDay::DEFAULT;
        let before = NaiveDate::from_ymd_opt(2026, 6, 30).expect("valid date");
        let on = NaiveDate::from_ymd_opt(2026, 7, 1).expect("valid date");
        assert_eq!(cutover.boundary_year(before), 2025);
        assert_eq!(cutover.boundary_year(on), 2026);
    }
}
