pub mod access;
pub mod bearer;

pub use bearer::{BearerError, bearer_token};
