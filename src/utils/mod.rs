//! Utility modules for the publisher.

pub mod exec;
pub mod git;
pub mod mailbox;
