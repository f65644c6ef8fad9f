//! Caller-facing encrypted data layer for habitkeep.
//!
//! [`DataService`] is the surface route handlers consume: settings,
//! habit content, daily entries, profiles, sessions, export, wipe, and
//! the recovery flow. Everything it persists goes through the envelope
//! store with the appropriate tier of the key hierarchy; nothing below
//! this crate ever sees a signed-in request.

mod config;
mod error;
mod recovery;
mod service;
mod session;
mod types;

pub use config::{DataConfig, DERIVE_ITERATIONS_ENV, DERIVE_SALT_ENV};
pub use error::{DataError, DataResult};
pub use service::DataService;
pub use types::{
    ContentConfig, DayEntry, ExportBundle, FieldDef, FieldKind, RecoverOutcome, SessionRecord,
    SessionToken, Settings, UserProfile,
};

pub use habitkeep_keys::{DekName, Kek, UserScope, KEK_ENV};
