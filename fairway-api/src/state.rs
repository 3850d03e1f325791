use fairway_core::identity::{MockPhoneAuthenticator, PhoneAuthenticator};
use fairway_core::notify::{MockVerificationSender, VerificationSender};
use fairway_ledger::LedgerEngine;
use fairway_store::app_config::{BusinessRules, LiveConfig};
use fairway_store::Directory;
use fairway_trip::{FareSchedule, TripManager};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
    pub ledger: Arc<LedgerEngine>,
    pub trips: Arc<TripManager>,
    pub phone_auth: Arc<dyn PhoneAuthenticator>,
    pub verification: Arc<dyn VerificationSender>,
    pub live: LiveConfig,
}

impl AppState {
    /// Wire the service graph with the mock external collaborators.
    /// Production deployments swap in real provider handles here.
    pub fn new(rules: &BusinessRules, live: LiveConfig) -> Self {
        let directory = Arc::new(Directory::new());
        let ledger = Arc::new(LedgerEngine::new(rules.max_topup));
        let trips = Arc::new(TripManager::new(
            directory.clone(),
            ledger.clone(),
            FareSchedule::from(rules),
            live.channel_capacity,
        ));

        Self {
            directory,
            ledger,
            trips,
            phone_auth: Arc::new(MockPhoneAuthenticator),
            verification: Arc::new(MockVerificationSender),
            live,
        }
    }
}
