pub mod account_service;
pub mod admission_service;
pub mod application_service;
pub mod closure_service;
pub mod ledger_service;
pub mod posting_service;
pub mod profile_service;
