//! biztime-types: domain models, wire shapes and repository ports shared by
//! the server, the adapters and the client.

pub mod api;
pub mod domain;
pub mod ports;
