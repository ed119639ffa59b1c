pub mod instrument;
pub mod membership_request;
pub mod person;
pub mod user;
