pub mod backup;
pub mod backup_error;
pub mod commands;
pub mod config;
pub mod escape;
pub mod exec;
pub mod folder;
pub mod queue;
