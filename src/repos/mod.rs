pub mod access_control_repo;
pub mod error;
