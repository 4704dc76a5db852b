use proptest::prelude::*;
use trashtrack_domain::{
    coins_for, collect, DomainError, MaterialKind, MaterialRates, PickupRequest, Role,
};

fn any_material() -> impl Strategy<Value = MaterialKind> {
    prop_oneof![
        Just(MaterialKind::Paper),
        Just(MaterialKind::Plastic),
        Just(MaterialKind::Iron),
    ]
}

proptest! {
    #[test]
    fn paper_is_twice_the_weight_rounded(w in 0.001f64..1000.0) {
        prop_assert_eq!(coins_for(MaterialKind::Paper, w).unwrap(), (2.0 * w).round() as u64);
    }

    #[test]
    fn light_plastic_has_no_bonus(w in 0.001f64..=5.0) {
        prop_assert_eq!(coins_for(MaterialKind::Plastic, w).unwrap(), (3.0 * w).round() as u64);
    }

    #[test]
    fn heavy_plastic_gets_flat_bonus(w in 5.000001f64..1000.0) {
        prop_assert_eq!(coins_for(MaterialKind::Plastic, w).unwrap(), (3.0 * w).round() as u64 + 5);
    }

    #[test]
    fn iron_pays_ten_percent_premium(w in 0.001f64..1000.0) {
        prop_assert_eq!(coins_for(MaterialKind::Iron, w).unwrap(), (6.0 * 1.1 * w).round() as u64);
    }

    #[test]
    fn non_positive_weight_never_prices(material in any_material(), w in -1000.0f64..=0.0) {
        prop_assert!(coins_for(material, w).is_err());
    }

    /// Second collection is rejected and the award stays as first computed.
    #[test]
    fn collection_awards_exactly_once(material in any_material(), w in 0.001f64..500.0) {
        let rates = MaterialRates::default();
        let req = PickupRequest::request(7u32, material, w).unwrap();

        let first = collect(&req, 100u32, Role::Collector, &rates).unwrap();
        prop_assert_eq!(first.coins, coins_for(material, w).unwrap());

        let second = collect(&first.request, 200u32, Role::Admin, &rates);
        prop_assert_eq!(second, Err(DomainError::AlreadyCollected));
        prop_assert_eq!(first.request.coins_awarded(), first.coins);
    }

    #[test]
    fn recycler_never_collects(material in any_material(), w in 0.001f64..500.0) {
        let req = PickupRequest::request(7u32, material, w).unwrap();
        prop_assert_eq!(
            collect(&req, 7u32, Role::Recycler, &MaterialRates::default()),
            Err(DomainError::Unauthorized { role: Role::Recycler })
        );
        prop_assert_eq!(req.coins_awarded(), 0);
        prop_assert!(!req.is_collected());
    }

    #[test]
    fn only_the_claimant_collects_a_claimed_request(
        material in any_material(),
        w in 0.001f64..500.0,
        claimant in 100u32..200,
        other in 200u32..300,
    ) {
        let rates = MaterialRates::default();
        let claimed = PickupRequest::request(7u32, material, w)
            .unwrap()
            .claim(claimant, Role::Collector)
            .unwrap();

        prop_assert_eq!(
            collect(&claimed, other, Role::Collector, &rates),
            Err(DomainError::ClaimedByOther)
        );
        let out = collect(&claimed, claimant, Role::Collector, &rates).unwrap();
        prop_assert_eq!(out.request.collector(), Some(&claimant));
    }
}
