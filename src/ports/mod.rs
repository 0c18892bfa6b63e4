//! Collaborator traits the simulation consumes and produces through.

pub mod config_port;
pub mod data_port;
pub mod report_port;
pub mod sentiment_port;
