//! Key hierarchy for habitkeep.
//!
//! Three tiers of symmetric keys scope every persisted record:
//!
//! 1. **KEK** — supplied through the environment, encrypts the DEK ring.
//! 2. **DEK ring** — four named keys (user-record, session, settings,
//!    signing) persisted as one encrypted record and cached in memory.
//! 3. **uuDEK** — one key per user, lazily created, encrypted under the
//!    user-record DEK.
//!
//! The rotation engine replaces any tier in place; the recovery primitives
//! sit deliberately outside the hierarchy (self-keyed by a user-held
//! secret).

mod derive;
mod error;
mod kek;
pub mod layout;
pub mod recovery;
mod ring;
mod rotation;

pub use derive::{KeyDeriver, UserScope};
pub use error::{KeyError, KeyResult};
pub use kek::{Kek, KEK_ENV};
pub use recovery::{
    generate_recovery_secret, recovery_lookup_index, recovery_record_key, RecoveryRecord,
    RECOVERY_SECRET_BYTES,
};
pub use ring::{DekName, KeyRing};
pub use rotation::{KekRotation, RotationEngine, RotationReport};
