//! Core types shared by every dakline crate: the task record, the officer
//! directory, pure normalization/deadline logic, configuration, and the
//! common error type.

pub mod config;
pub mod deadline;
pub mod directory;
pub mod error;
pub mod task;

pub use error::{Error, Result};
