//! Chart-of-accounts engine.
//!
//! Categories form one forest per company. The [`Engine`] exposes six
//! mutations (create, rename, change type, delete, assign parent, reassign
//! parent) that validate against a [`CategorySnapshot`] before touching the
//! [`CategoryStore`], plus a batch sequencer that threads one snapshot
//! through a list of heterogeneous operations.

pub use batch::{BatchStep, CategoryOperation, OperationOutcome, OperationRequest};
pub use category::{Category, CategoryType};
pub use companies::Company;
pub use error::{EngineError, ErrorKind};
pub use ops::{Engine, EngineBuilder};
pub use snapshot::{CategoryNode, CategorySnapshot, NameResolution};
pub use store::{CategoryPatch, CategoryStore, SqlCategoryStore};
pub use transactions::TransactionRef;

mod batch;
mod categories;
mod category;
mod companies;
mod error;
mod ops;
mod snapshot;
mod store;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
