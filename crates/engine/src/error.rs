//! The module contains the errors the engine can throw.
//!
//! Every variant belongs to one [`ErrorKind`]:
//!
//! - validation errors are detected before a handler runs and never touch
//!   the store ([`MissingField`], [`UnknownAction`], ...);
//! - [`KeyNotFound`] is raised when a name or id does not resolve in scope;
//! - constraint violations reject a mutation that would break a category
//!   invariant ([`CycleDetected`], [`HasChildren`], [`InUse`], ...);
//! - [`Database`] carries the store's own error, displayed verbatim; a row
//!   the store returned but the engine cannot read is also a store error.
//!
//!  [`MissingField`]: EngineError::MissingField
//!  [`UnknownAction`]: EngineError::UnknownAction
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`CycleDetected`]: EngineError::CycleDetected
//!  [`HasChildren`]: EngineError::HasChildren
//!  [`InUse`]: EngineError::InUse
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("missing required field '{field}' for action '{action}'")]
    MissingField { action: String, field: &'static str },
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("companyId '{0}' does not match batch company")]
    CompanyMismatch(String),
    #[error("{0} not found")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("category '{0}' cannot be its own parent")]
    SelfParent(String),
    #[error("assigning '{parent}' as parent of '{child}' would create a cycle")]
    CycleDetected { child: String, parent: String },
    #[error("category '{name}' has {count} child categories; delete or reassign them first")]
    HasChildren { name: String, count: usize },
    #[error(
        "category '{0}' is referenced by transactions; reassign or delete those transactions first"
    )]
    InUse(String),
    #[error(
        "invalid category type '{0}': expected one of Asset, Liability, Equity, Revenue, COGS, Expense"
    )]
    InvalidType(String),
    #[error("invalid stored value: {0}")]
    InvalidStoredValue(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification of [`EngineError`], used by callers that only
/// care about which family a failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Constraint,
    Store,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. }
            | Self::UnknownAction(_)
            | Self::InvalidName(_)
            | Self::CompanyMismatch(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::ExistingKey(_)
            | Self::SelfParent(_)
            | Self::CycleDetected { .. }
            | Self::HasChildren { .. }
            | Self::InUse(_)
            | Self::InvalidType(_) => ErrorKind::Constraint,
            Self::InvalidStoredValue(_) | Self::Database(_) => ErrorKind::Store,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::MissingField {
                    action: a,
                    field: f,
                },
                Self::MissingField {
                    action: b,
                    field: g,
                },
            ) => a == b && f == g,
            (Self::UnknownAction(a), Self::UnknownAction(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::CompanyMismatch(a), Self::CompanyMismatch(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::SelfParent(a), Self::SelfParent(b)) => a == b,
            (
                Self::CycleDetected {
                    child: a,
                    parent: p,
                },
                Self::CycleDetected {
                    child: b,
                    parent: q,
                },
            ) => a == b && p == q,
            (
                Self::HasChildren { name: a, count: n },
                Self::HasChildren { name: b, count: m },
            ) => a == b && n == m,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::InvalidType(a), Self::InvalidType(b)) => a == b,
            (Self::InvalidStoredValue(a), Self::InvalidStoredValue(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
