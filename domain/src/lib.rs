//! Coin reward pricing and pickup lifecycle policy for TrashTrack.
//!
//! Pure and synchronous: every operation takes values and returns new ones,
//! so it can be called from any number of callers without coordination.
//! Serializing concurrent collections of the same stored request is the
//! persistence layer's job.

pub mod error;
pub mod ledger;
pub mod materials;
pub mod pickup;
pub mod profile;
pub mod roles;
pub mod summary;

pub use error::{DomainError, DomainResult};
pub use ledger::CoinBalance;
pub use materials::{coins_for, MaterialKind, MaterialRates};
pub use pickup::{collect, quote, Collection, PickupRequest, PickupStatus};
pub use profile::{validate_full_name, MAX_FULL_NAME_LEN};
pub use roles::Role;
pub use summary::{MaterialTally, PickupSummary};
