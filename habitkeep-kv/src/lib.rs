//! Key-value storage layer for habitkeep.
//!
//! Provides:
//! - the generic [`KvStore`] collaborator interface
//!   (`get`/`set`/`delete`/`list_by_prefix`, optional TTL)
//! - [`MemoryKv`], an in-memory backend with an injectable clock
//! - [`DuckDbKv`], a persistent DuckDB backend
//! - [`EnvelopeStore`], the encrypt/decrypt wrapper every domain record
//!   passes through

pub mod clock;
mod duckdb_kv;
mod envelope;
mod error;
mod memory;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duckdb_kv::DuckDbKv;
pub use envelope::EnvelopeStore;
pub use error::{KvError, KvResult};
pub use memory::MemoryKv;
pub use store::{Consistency, KvStore, SetOptions};
