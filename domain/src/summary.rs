use std::collections::BTreeMap;

use crate::materials::MaterialKind;
use crate::pickup::{PickupRequest, PickupStatus};

/// Count and weight handed in for one material.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialTally {
    pub count: u32,
    pub weight_kg: f64,
}

/// Dashboard figures over a set of pickup requests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PickupSummary {
    pub total_requests: u32,
    pub pending: u32,
    pub collected: u32,
    pub total_weight_kg: f64,
    pub total_coins: u64,
    pub by_material: BTreeMap<MaterialKind, MaterialTally>,
}

impl PickupSummary {
    pub fn from_requests<'a, U: 'a, I>(requests: I) -> Self
    where
        I: IntoIterator<Item = &'a PickupRequest<U>>,
    {
        let mut summary = PickupSummary::default();
        for req in requests {
            summary.total_requests += 1;
            match req.status() {
                PickupStatus::Requested => summary.pending += 1,
                PickupStatus::Collected => summary.collected += 1,
            }
            summary.total_weight_kg += req.weight_kg();
            summary.total_coins = summary.total_coins.saturating_add(req.coins_awarded());

            let tally = summary.by_material.entry(req.material()).or_default();
            tally.count += 1;
            tally.weight_kg += req.weight_kg();
        }
        summary
    }

    /// Share of requests already collected, as a rounded percentage.
    pub fn completion_percent(&self) -> u32 {
        if self.total_requests == 0 {
            return 0;
        }
        ((self.collected as f64 / self.total_requests as f64) * 100.0).round() as u32
    }

    pub fn tally(&self, material: MaterialKind) -> MaterialTally {
        self.by_material.get(&material).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_has_zero_completion() {
        let summary = PickupSummary::from_requests(Vec::<PickupRequest<u8>>::new().iter());
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.completion_percent(), 0);
    }

    #[test]
    fn counts_statuses_weights_and_materials() {
        let reqs = vec![
            PickupRequest::restore(1u8, MaterialKind::Paper, 5.0, PickupStatus::Collected, 10, Some(2u8)),
            PickupRequest::restore(1u8, MaterialKind::Plastic, 3.0, PickupStatus::Requested, 0, None),
            PickupRequest::restore(1u8, MaterialKind::Paper, 1.5, PickupStatus::Requested, 0, None),
        ];
        let s = PickupSummary::from_requests(&reqs);
        assert_eq!(s.total_requests, 3);
        assert_eq!(s.pending, 2);
        assert_eq!(s.collected, 1);
        assert_eq!(s.total_coins, 10);
        assert!((s.total_weight_kg - 9.5).abs() < 1e-9);
        assert_eq!(s.completion_percent(), 33);
        assert_eq!(s.tally(MaterialKind::Paper).count, 2);
        assert!((s.tally(MaterialKind::Paper).weight_kg - 6.5).abs() < 1e-9);
        assert_eq!(s.tally(MaterialKind::Iron), MaterialTally::default());
    }
}
