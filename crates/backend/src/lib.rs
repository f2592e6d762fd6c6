//! REST client for the task backend and its employee directory.
//!
//! The pipeline holds the backend behind the [`TaskBackend`] trait so the
//! commit engine can be exercised against a mock; [`HttpBackend`] is the
//! production implementation.

pub mod http;
pub mod traits;

pub use http::HttpBackend;
pub use traits::TaskBackend;
