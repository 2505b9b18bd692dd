//! Credit card records: the data model, field validation and storage backends.
//!
//! Handlers never touch a collection directly; they receive a [`Storage`]
//! through an axum `Extension` and call its four operations (`save`, `list`,
//! `update`, `delete`). Every record reaching storage has already passed
//! [`validate`].

pub mod model;
pub mod storage;
pub mod validation;

pub use self::model::{Card, CardRequest};
pub use self::storage::{Storage, StorageError, memory::MemoryStorage, postgres::PgStorage};
pub use self::validation::{ValidationErrors, validate};
