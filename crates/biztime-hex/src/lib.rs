//! biztime-hex: hexagonal BizTime API library (services + inbound HTTP)

pub mod config;
pub mod errors;

pub mod application;

pub use biztime_types::{api, domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
