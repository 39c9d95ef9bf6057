//! Port traits at the domain boundary.

pub mod config_port;
pub mod parser_port;
pub mod snapshot_port;
