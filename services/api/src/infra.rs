use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use stem_enroll::workflows::registration::{
    ApplicantId, ApplicantUpsert, RegistrationBundle, RegistrationStore, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreRows {
    next_id: i64,
    applicants: HashMap<String, (ApplicantId, ApplicantUpsert)>,
    bundles: Vec<(ApplicantId, RegistrationBundle)>,
}

/// In-memory registration store backing demo mode, with the same observable
/// semantics as the Postgres adapter.
#[derive(Default)]
pub(crate) struct InMemoryRegistrationStore {
    rows: Mutex<StoreRows>,
}

impl InMemoryRegistrationStore {
    pub(crate) fn applicant_count(&self) -> usize {
        self.rows.lock().expect("store mutex poisoned").applicants.len()
    }

    pub(crate) fn bundle_count(&self) -> usize {
        self.rows.lock().expect("store mutex poisoned").bundles.len()
    }
}

#[async_trait::async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn email_registered(&self, email: &str) -> Result<bool, StoreError> {
        let rows = self.rows.lock().expect("store mutex poisoned");
        Ok(rows.applicants.contains_key(&email.to_lowercase()))
    }

    async fn upsert_applicant(
        &self,
        applicant: &ApplicantUpsert,
    ) -> Result<ApplicantId, StoreError> {
        let mut rows = self.rows.lock().expect("store mutex poisoned");
        let key = applicant.email.to_lowercase();
        if let Some((id, existing)) = rows.applicants.get_mut(&key) {
            let id = *id;
            *existing = applicant.clone();
            return Ok(id);
        }
        rows.next_id += 1;
        let id = ApplicantId(rows.next_id);
        rows.applicants.insert(key, (id, applicant.clone()));
        Ok(id)
    }

    async fn persist_registration(
        &self,
        applicant_id: ApplicantId,
        bundle: &RegistrationBundle,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().expect("store mutex poisoned");
        rows.bundles.push((applicant_id, bundle.clone()));
        Ok(())
    }
}
