pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    account_service::AccountService, admission_service::AdmissionControl,
    application_service::ApplicationService, closure_service::ClosurePolicy,
    ledger_service::CapacityLedger, posting_service::PostingService,
    profile_service::ProfileService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub account_service: AccountService,
    pub profile_service: ProfileService,
    pub posting_service: PostingService,
    pub application_service: ApplicationService,
    pub ledger: CapacityLedger,
    pub admission: AdmissionControl,
    pub closure_policy: ClosurePolicy,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let account_service = AccountService::new(pool.clone());
        let profile_service = ProfileService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let ledger = CapacityLedger::new(pool.clone());
        let admission = AdmissionControl::new(pool.clone());
        let closure_policy = ClosurePolicy::new(pool.clone(), config.deactivation_days);
        let posting_service = PostingService::new(pool.clone(), closure_policy.clone());

        Self {
            pool,
            account_service,
            profile_service,
            posting_service,
            application_service,
            ledger,
            admission,
            closure_policy,
        }
    }
}
