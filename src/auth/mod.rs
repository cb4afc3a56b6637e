//! Authentication: platform identity login and session lifecycle.

pub mod service;

pub use service::{SessionService, VerifiedIdentity};
