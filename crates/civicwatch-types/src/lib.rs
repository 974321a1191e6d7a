//! # CivicWatch Types
//!
//! Domain model for the CivicWatch issue-reporting system.
//!
//! This crate defines the records that flow between the remote document
//! store and the synchronization layer:
//!
//! - [`Issue`]: a reported civic problem, including its denormalized
//!   [`ReporterSnapshot`]
//! - [`NewIssue`]: the creation-form payload
//! - [`UserProfile`] and [`Role`]: the `users` collection document
//! - [`IssueCategory`] and [`IssueStatus`]: the fixed enumerations
//!
//! Wire compatibility: documents use camelCase field names (`createdAt`,
//! `reporterId`, `photoURL`, ...) so snapshots round-trip unchanged
//! against the hosted store's existing collections.

pub mod document;
pub mod issue;
pub mod user;

pub use document::{DocumentError, Fields};
pub use issue::{Issue, IssueCategory, IssueStatus, NewIssue, UnknownCategory, UnknownStatus};
pub use user::{ReporterSnapshot, Role, UserProfile};
