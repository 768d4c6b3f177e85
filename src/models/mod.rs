pub mod account;
pub mod application;
pub mod employer_profile;
pub mod job_posting;
