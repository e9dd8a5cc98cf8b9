pub mod auth;
pub mod gateway;
pub mod lifecycle;
pub mod storage;
pub mod store;
