//! Backend access: wire types, HTTP client and typed services.

pub mod errors;
pub mod http;
pub mod models;
pub mod page;
pub mod services;
