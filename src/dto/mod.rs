pub mod application_dto;
pub mod auth_dto;
pub mod posting_dto;
pub mod profile_dto;
