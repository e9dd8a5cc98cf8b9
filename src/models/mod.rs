pub mod auth;
pub mod document;
pub mod payment;
pub mod summary;
pub mod user;
