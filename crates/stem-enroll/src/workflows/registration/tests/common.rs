use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::workflows::registration::catalog::ReferenceCatalog;
use crate::workflows::registration::domain::{
    ApplicantId, InstitutionPick, LocationFields, LocationId, StepOneFields, StepThreeFields,
    StepTwoFields,
};
use crate::workflows::registration::policy::RegistrationPolicy;
use crate::workflows::registration::service::{RegistrationService, StepFields};
use crate::workflows::registration::state::RegistrationForm;
use crate::workflows::registration::store::{
    ApplicantUpsert, RegistrationBundle, RegistrationStore, StoreError,
};

#[derive(Default)]
struct MemoryStoreInner {
    next_id: i64,
    applicants: HashMap<String, (ApplicantId, ApplicantUpsert)>,
    bundles: Vec<(ApplicantId, RegistrationBundle)>,
}

/// In-memory store with the same observable semantics as the Postgres
/// adapter: upsert keyed by lower-cased email, bundle writes all-or-nothing.
#[derive(Default)]
pub(super) struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    pub(super) fn applicant_count(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").applicants.len()
    }

    pub(super) fn applicant(&self, email: &str) -> Option<(ApplicantId, ApplicantUpsert)> {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .applicants
            .get(&email.to_lowercase())
            .cloned()
    }

    pub(super) fn bundles(&self) -> Vec<(ApplicantId, RegistrationBundle)> {
        self.inner.lock().expect("store mutex poisoned").bundles.clone()
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn email_registered(&self, email: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.applicants.contains_key(&email.to_lowercase()))
    }

    async fn upsert_applicant(
        &self,
        applicant: &ApplicantUpsert,
    ) -> Result<ApplicantId, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let key = applicant.email.to_lowercase();
        if let Some((id, existing)) = inner.applicants.get_mut(&key) {
            let id = *id;
            *existing = applicant.clone();
            return Ok(id);
        }
        inner.next_id += 1;
        let id = ApplicantId(inner.next_id);
        inner.applicants.insert(key, (id, applicant.clone()));
        Ok(id)
    }

    async fn persist_registration(
        &self,
        applicant_id: ApplicantId,
        bundle: &RegistrationBundle,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.bundles.push((applicant_id, bundle.clone()));
        Ok(())
    }
}

/// Store that refuses everything, for surfacing infrastructure failures.
pub(super) struct UnavailableStore;

#[async_trait]
impl RegistrationStore for UnavailableStore {
    async fn email_registered(&self, _email: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn upsert_applicant(
        &self,
        _applicant: &ApplicantUpsert,
    ) -> Result<ApplicantId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn persist_registration(
        &self,
        _applicant_id: ApplicantId,
        _bundle: &RegistrationBundle,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Store whose upsert saves the row but loses the identifier, reproducing
/// the partial-save condition.
#[derive(Default)]
pub(super) struct MissingIdStore {
    saved: Mutex<Vec<ApplicantUpsert>>,
}

impl MissingIdStore {
    pub(super) fn saved_count(&self) -> usize {
        self.saved.lock().expect("store mutex poisoned").len()
    }
}

#[async_trait]
impl RegistrationStore for MissingIdStore {
    async fn email_registered(&self, _email: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn upsert_applicant(
        &self,
        applicant: &ApplicantUpsert,
    ) -> Result<ApplicantId, StoreError> {
        self.saved
            .lock()
            .expect("store mutex poisoned")
            .push(applicant.clone());
        Err(StoreError::IdentifierUnavailable)
    }

    async fn persist_registration(
        &self,
        _applicant_id: ApplicantId,
        _bundle: &RegistrationBundle,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Store where the applicant upsert succeeds but the bundle transaction
/// always rolls back.
#[derive(Default)]
pub(super) struct BrokenBundleStore {
    delegate: MemoryStore,
}

impl BrokenBundleStore {
    pub(super) fn applicant_count(&self) -> usize {
        self.delegate.applicant_count()
    }

    pub(super) fn bundle_count(&self) -> usize {
        self.delegate.bundles().len()
    }
}

#[async_trait]
impl RegistrationStore for BrokenBundleStore {
    async fn email_registered(&self, email: &str) -> Result<bool, StoreError> {
        self.delegate.email_registered(email).await
    }

    async fn upsert_applicant(
        &self,
        applicant: &ApplicantUpsert,
    ) -> Result<ApplicantId, StoreError> {
        self.delegate.upsert_applicant(applicant).await
    }

    async fn persist_registration(
        &self,
        _applicant_id: ApplicantId,
        _bundle: &RegistrationBundle,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(
            "transaction aborted: deadlock detected".to_string(),
        ))
    }
}

pub(super) fn policy() -> RegistrationPolicy {
    RegistrationPolicy::default()
}

pub(super) fn build_service() -> (
    RegistrationService<MemoryStore, ReferenceCatalog>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::default());
    let directory = Arc::new(ReferenceCatalog::sample());
    let service = RegistrationService::new(store.clone(), directory, policy());
    (service, store)
}

pub(super) fn service_with_store<S: RegistrationStore + 'static>(
    store: Arc<S>,
) -> RegistrationService<S, ReferenceCatalog> {
    RegistrationService::new(store, Arc::new(ReferenceCatalog::sample()), policy())
}

pub(super) fn step_one() -> StepOneFields {
    StepOneFields {
        email: "new.student@gmail.com".to_string(),
        identifies_as_woman: Some(true),
    }
}

pub(super) fn step_two() -> StepTwoFields {
    StepTwoFields {
        full_name: "asha rani".to_string(),
        academic_year: Some("2nd Year".to_string()),
        degree: Some("B.Tech".to_string()),
        university: Some(InstitutionPick::Listed {
            name: "Savitribai Phule Pune University".to_string(),
        }),
        college: Some(InstitutionPick::Listed {
            name: "Fergusson College".to_string(),
        }),
        college_location: LocationFields {
            country: Some("India".to_string()),
            state: Some("Maharashtra".to_string()),
            district: Some("Pune".to_string()),
            city_category: Some("Tier 1".to_string()),
        },
        subjects: vec!["Physics".to_string(), "Mathematics".to_string()],
    }
}

pub(super) fn step_three() -> StepThreeFields {
    StepThreeFields {
        phone: "9876543210".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2004, 6, 15),
        future_subject_area: Some("Physical Sciences".to_string()),
        future_sub_field: Some("Physics".to_string()),
        hometown: LocationFields {
            country: Some("India".to_string()),
            state: Some("Maharashtra".to_string()),
            district: Some("Nagpur".to_string()),
            city_category: Some("Tier 2".to_string()),
        },
        caste_category: Some("General".to_string()),
        income_range: Some("Below or Equal to 3 lacs per year (INR)".to_string()),
        motivation: Some(
            "I want to build a research career in physics and need the mentorship.".to_string(),
        ),
        challenges: None,
        professor_name: None,
        professor_phone: None,
        partner_organization: Some("Avanti Fellows".to_string()),
    }
}

/// Drive a fresh form through all three step gates.
pub(super) async fn ready_form<S: RegistrationStore + 'static>(
    service: &RegistrationService<S, ReferenceCatalog>,
) -> RegistrationForm {
    let form = RegistrationForm::new();
    let (form, outcome) = service
        .submit_step(form, StepFields::One(step_one()))
        .await
        .expect("step one runs");
    assert!(outcome.advance, "step one should advance: {:?}", outcome.issues);
    let (form, outcome) = service
        .submit_step(form, StepFields::Two(step_two()))
        .await
        .expect("step two runs");
    assert!(outcome.advance, "step two should advance: {:?}", outcome.issues);
    let (form, outcome) = service
        .submit_step(form, StepFields::Three(step_three()))
        .await
        .expect("step three runs");
    assert!(
        outcome.advance,
        "step three should pass its gate: {:?}",
        outcome.issues
    );
    form
}

pub(super) fn sample_location_id() -> LocationId {
    LocationId(501)
}
