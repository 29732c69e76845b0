pub mod config;
pub mod dashboard;
pub mod error;
pub mod flags;
pub mod identity;
pub mod routes;
pub mod server;
pub mod storage;
