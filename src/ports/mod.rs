//! Port traits for the collaborators the simulator depends on.

pub mod config_port;
pub mod data_port;
pub mod report_port;
