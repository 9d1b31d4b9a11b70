pub mod artifact;
pub mod commands;
pub mod config;
pub mod error;
pub mod link_set;
pub mod package;
pub mod platform;
pub mod relocate;
pub mod runtime;
