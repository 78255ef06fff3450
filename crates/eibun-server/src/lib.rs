//! eibun-server — the inbound HTTP surface for the correction service.

pub mod config;
pub mod routes;
