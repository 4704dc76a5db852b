// ============================================================================
// MATERIAL PRICING
// ============================================================================
// Maps a material and a collected weight to a coin reward.
//
// Rules:
// - Paper:   round(rate * kg)
// - Plastic: round(rate * kg), plus a flat bulk bonus above 5 kg (strictly)
// - Iron:    round(rate * 1.1 * kg), replaces the generic formula entirely
// ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default coins per kilogram of paper
pub const DEFAULT_PAPER_RATE: f64 = 2.0;

/// Default coins per kilogram of plastic
pub const DEFAULT_PLASTIC_RATE: f64 = 3.0;

/// Default coins per kilogram of iron (before the premium)
pub const DEFAULT_IRON_RATE: f64 = 6.0;

/// Plastic loads strictly heavier than this earn the bulk bonus
pub const PLASTIC_BULK_BONUS_THRESHOLD_KG: f64 = 5.0;

/// Flat coins added to a bulk plastic load
pub const PLASTIC_BULK_BONUS_COINS: u64 = 5;

/// Iron pays a 10% premium on its base rate
pub const IRON_PREMIUM_MULTIPLIER: f64 = 1.1;

// ============================================================================
// MATERIAL KIND
// ============================================================================

/// The fixed set of materials a recycler can hand in.
#[cfg_attr(feature = "spacetimedb", derive(spacetimedb::SpacetimeType))]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialKind {
    Paper,
    Plastic,
    Iron,
}

lazy_static! {
    /// Lowercased material code -> kind. Clients send both "iron" and "IRON".
    static ref MATERIAL_CODES: HashMap<&'static str, MaterialKind> = {
        let mut m = HashMap::new();
        for kind in MaterialKind::ALL {
            m.insert(kind.code_lower(), kind);
        }
        m
    };
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 3] = [MaterialKind::Paper, MaterialKind::Plastic, MaterialKind::Iron];

    /// Wire code stored by clients, e.g. `"PLASTIC"`.
    pub fn code(self) -> &'static str {
        match self {
            MaterialKind::Paper => "PAPER",
            MaterialKind::Plastic => "PLASTIC",
            MaterialKind::Iron => "IRON",
        }
    }

    fn code_lower(self) -> &'static str {
        match self {
            MaterialKind::Paper => "paper",
            MaterialKind::Plastic => "plastic",
            MaterialKind::Iron => "iron",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MaterialKind::Paper => "Paper",
            MaterialKind::Plastic => "Plastic",
            MaterialKind::Iron => "Iron",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for MaterialKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        MATERIAL_CODES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| DomainError::UnknownMaterial(s.to_string()))
    }
}

// ============================================================================
// RATES
// ============================================================================

/// Base rates in coins per kilogram. Overridable per deployment.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct MaterialRates {
    pub paper: f64,
    pub plastic: f64,
    pub iron: f64,
}

impl Default for MaterialRates {
    fn default() -> Self {
        MaterialRates {
            paper: DEFAULT_PAPER_RATE,
            plastic: DEFAULT_PLASTIC_RATE,
            iron: DEFAULT_IRON_RATE,
        }
    }
}

impl MaterialRates {
    /// Builds a validated rate table. Every rate must be finite and positive.
    pub fn new(paper: f64, plastic: f64, iron: f64) -> DomainResult<Self> {
        MaterialRates { paper, plastic, iron }.validated()
    }

    /// Re-checks a table that came from outside (e.g. deserialized JSON).
    pub fn validated(self) -> DomainResult<Self> {
        for kind in MaterialKind::ALL {
            let rate = self.base_rate(kind);
            if !rate.is_finite() || rate <= 0.0 {
                return Err(DomainError::InvalidRate { material: kind, rate });
            }
        }
        Ok(self)
    }

    pub fn with_rate(mut self, material: MaterialKind, rate: f64) -> DomainResult<Self> {
        match material {
            MaterialKind::Paper => self.paper = rate,
            MaterialKind::Plastic => self.plastic = rate,
            MaterialKind::Iron => self.iron = rate,
        }
        self.validated()
    }

    pub fn base_rate(&self, material: MaterialKind) -> f64 {
        match material {
            MaterialKind::Paper => self.paper,
            MaterialKind::Plastic => self.plastic,
            MaterialKind::Iron => self.iron,
        }
    }

    /// Coins earned for collecting `weight_kg` of `material`.
    ///
    /// Fails with [`DomainError::InvalidWeight`] when the weight is not a
    /// finite positive number, or when it is so large that the award would
    /// not fit in a `u64`.
    pub fn coins_for(&self, material: MaterialKind, weight_kg: f64) -> DomainResult<u64> {
        let weight_kg = validate_weight(weight_kg)?;
        let rate = self.base_rate(material);

        let coins = match material {
            MaterialKind::Paper => round_coins(rate * weight_kg, weight_kg)?,
            MaterialKind::Plastic => {
                let base = round_coins(rate * weight_kg, weight_kg)?;
                if weight_kg > PLASTIC_BULK_BONUS_THRESHOLD_KG {
                    base.saturating_add(PLASTIC_BULK_BONUS_COINS)
                } else {
                    base
                }
            }
            MaterialKind::Iron => round_coins(rate * IRON_PREMIUM_MULTIPLIER * weight_kg, weight_kg)?,
        };
        Ok(coins)
    }
}

/// [`MaterialRates::coins_for`] with the default rates.
pub fn coins_for(material: MaterialKind, weight_kg: f64) -> DomainResult<u64> {
    MaterialRates::default().coins_for(material, weight_kg)
}

/// Rejects zero, negative, NaN and infinite weights.
pub fn validate_weight(weight_kg: f64) -> DomainResult<f64> {
    if weight_kg.is_finite() && weight_kg > 0.0 {
        Ok(weight_kg)
    } else {
        Err(DomainError::InvalidWeight { weight_kg })
    }
}

// f64::round is half-away-from-zero; inputs here are always positive.
// A product that does not fit in u64 is reported against the weight rather
// than saturated by the cast.
fn round_coins(raw: f64, weight_kg: f64) -> DomainResult<u64> {
    let rounded = raw.round();
    if !rounded.is_finite() || rounded >= u64::MAX as f64 {
        log::debug!("coin amount {} for {} kg is out of range", raw, weight_kg);
        return Err(DomainError::InvalidWeight { weight_kg });
    }
    Ok(rounded as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_uses_base_rate() {
        assert_eq!(coins_for(MaterialKind::Paper, 5.0), Ok(10));
        assert_eq!(coins_for(MaterialKind::Paper, 1.25), Ok(3)); // 2.5 rounds up
    }

    #[test]
    fn plastic_bonus_only_strictly_above_threshold() {
        assert_eq!(coins_for(MaterialKind::Plastic, 3.0), Ok(9));
        assert_eq!(coins_for(MaterialKind::Plastic, 5.0), Ok(15));
        assert_eq!(coins_for(MaterialKind::Plastic, 6.0), Ok(23));
        assert_eq!(coins_for(MaterialKind::Plastic, 5.01), Ok(20));
    }

    #[test]
    fn iron_applies_premium_instead_of_base() {
        assert_eq!(coins_for(MaterialKind::Iron, 2.0), Ok(13));
        assert_eq!(coins_for(MaterialKind::Iron, 10.0), Ok(66));
    }

    #[test]
    fn rejects_non_positive_or_non_finite_weight() {
        for w in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = coins_for(MaterialKind::Paper, w).unwrap_err();
            assert!(matches!(err, DomainError::InvalidWeight { .. }), "weight {w}");
        }
    }

    #[test]
    fn award_too_large_for_u64_is_rejected() {
        assert_eq!(
            coins_for(MaterialKind::Iron, 1e308),
            Err(DomainError::InvalidWeight { weight_kg: 1e308 })
        );
        assert_eq!(
            coins_for(MaterialKind::Paper, 1e19),
            Err(DomainError::InvalidWeight { weight_kg: 1e19 })
        );
        assert_eq!(coins_for(MaterialKind::Paper, 1e18), Ok(2_000_000_000_000_000_000));
    }

    #[test]
    fn overridden_rates_flow_through_each_rule() {
        let rates = MaterialRates::new(1.0, 4.0, 10.0).unwrap();
        assert_eq!(rates.coins_for(MaterialKind::Paper, 3.0), Ok(3));
        assert_eq!(rates.coins_for(MaterialKind::Plastic, 6.0), Ok(29));
        assert_eq!(rates.coins_for(MaterialKind::Iron, 1.0), Ok(11));
    }

    #[test]
    fn invalid_rates_are_rejected() {
        let err = MaterialRates::new(2.0, 0.0, 6.0).unwrap_err();
        assert_eq!(err, DomainError::InvalidRate { material: MaterialKind::Plastic, rate: 0.0 });
        assert!(MaterialRates::default().with_rate(MaterialKind::Iron, f64::NAN).is_err());
    }

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("IRON".parse::<MaterialKind>(), Ok(MaterialKind::Iron));
        assert_eq!(" plastic ".parse::<MaterialKind>(), Ok(MaterialKind::Plastic));
        assert_eq!("Paper".parse::<MaterialKind>(), Ok(MaterialKind::Paper));
        assert_eq!(
            "glass".parse::<MaterialKind>(),
            Err(DomainError::UnknownMaterial("glass".to_string()))
        );
    }

    #[test]
    fn codes_round_trip_through_parse() {
        for kind in MaterialKind::ALL {
            assert_eq!(kind.code().parse::<MaterialKind>(), Ok(kind));
        }
    }
}
