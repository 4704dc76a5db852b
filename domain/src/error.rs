use thiserror::Error;

use crate::materials::MaterialKind;
use crate::roles::Role;

/// Errors raised by the pricing and pickup policy.
///
/// All variants are local and recoverable: nothing here is fatal, and none of
/// them leave a request half-updated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Weight was zero, negative, or not a finite number.
    #[error("Invalid weight {weight_kg} kg: weight must be greater than 0")]
    InvalidWeight { weight_kg: f64 },

    /// The request already left the `Requested` state.
    #[error("Pickup has already been collected")]
    AlreadyCollected,

    /// The acting role cannot award coins.
    #[error("Role '{role}' is not allowed to award coins")]
    Unauthorized { role: Role },

    /// Another collector already claimed the request.
    #[error("Pickup is claimed by another collector")]
    ClaimedByOther,

    /// Only the claiming collector or an admin may release a claim.
    #[error("Only the claiming collector or an admin can release this pickup")]
    NotClaimant,

    #[error("Full name must be 1-{max} characters (got {len})")]
    InvalidName { len: usize, max: usize },

    #[error("Role '{role}' cannot be self-registered")]
    SelfRegistrationDenied { role: Role },

    #[error("Amount must be greater than 0")]
    InvalidAmount,

    #[error("Insufficient coins: have {balance}, need {amount}")]
    InsufficientCoins { balance: u64, amount: u64 },

    #[error("Unknown material code '{0}'")]
    UnknownMaterial(String),

    #[error("Unknown role '{0}'")]
    UnknownRole(String),

    /// A base rate override was zero, negative, or not finite.
    #[error("Invalid base rate {rate} for {material}")]
    InvalidRate { material: MaterialKind, rate: f64 },
}

pub type DomainResult<T> = Result<T, DomainError>;
