pub mod auth;
pub mod documents;
pub mod payments;
pub mod users;
