//! Core types and error handling for the import engine
//!
//! - [`error`] - the [`ImportError`] taxonomy and [`ErrorContext`] rendering
//!
//! Batch-structure errors ([`ImportError::DuplicateLegacyId`],
//! [`ImportError::DanglingReference`], [`ImportError::CycleDetected`]) are fatal
//! to the whole batch. Per-property problems during deferred resolution are not
//! errors at all; they surface as omitted references on the item's outcome.

pub mod error;

pub use error::{ErrorContext, ImportError, ReferenceRelation, user_friendly_error};
