//! Repository-level commands that run before any graph exists.

pub mod init;
