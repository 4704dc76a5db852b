// ============================================================================
// PICKUP LIFECYCLE
// ============================================================================
// Requested --collect--> Collected (terminal)
//
// - Creation validates the weight and starts at Requested with 0 coins.
// - While Requested, an award-capable collector may claim the request; only
//   the claimant (or an admin) may release it, and only the claimant may
//   collect it.
// - Collection is rejected (never ignored) once the request is Collected.
// - The coin amount is computed once, on the transition, and handed back to
//   the caller, who credits the collecting actor's ledger exactly once.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::materials::{validate_weight, MaterialKind, MaterialRates};
use crate::roles::Role;

#[cfg_attr(feature = "spacetimedb", derive(spacetimedb::SpacetimeType))]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickupStatus {
    Requested,
    Collected,
}

/// One recycler's submission for collection.
///
/// Generic over the user identifier so the server can use its own identity
/// type. The row id belongs to whatever stores the request.
#[derive(Clone, Debug, PartialEq)]
pub struct PickupRequest<U> {
    user_id: U,
    material: MaterialKind,
    weight_kg: f64,
    status: PickupStatus,
    coins_awarded: u64,
    collector: Option<U>,
}

/// Result of a successful collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection<U> {
    /// The request in its `Collected` state.
    pub request: PickupRequest<U>,
    /// Coins to credit to the collecting actor. Credit this once.
    pub coins: u64,
}

impl<U> PickupRequest<U> {
    /// Creates a new, unclaimed request in the `Requested` state.
    pub fn request(user_id: U, material: MaterialKind, weight_kg: f64) -> DomainResult<Self> {
        let weight_kg = validate_weight(weight_kg)?;
        Ok(PickupRequest {
            user_id,
            material,
            weight_kg,
            status: PickupStatus::Requested,
            coins_awarded: 0,
            collector: None,
        })
    }

    /// Rehydrates a request that was already validated and stored.
    pub fn restore(
        user_id: U,
        material: MaterialKind,
        weight_kg: f64,
        status: PickupStatus,
        coins_awarded: u64,
        collector: Option<U>,
    ) -> Self {
        PickupRequest { user_id, material, weight_kg, status, coins_awarded, collector }
    }

    pub fn user_id(&self) -> &U {
        &self.user_id
    }

    pub fn material(&self) -> MaterialKind {
        self.material
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn status(&self) -> PickupStatus {
        self.status
    }

    pub fn coins_awarded(&self) -> u64 {
        self.coins_awarded
    }

    /// Collector who claimed (or collected) this request.
    pub fn collector(&self) -> Option<&U> {
        self.collector.as_ref()
    }

    pub fn is_collected(&self) -> bool {
        self.status == PickupStatus::Collected
    }

    fn ensure_requested(&self) -> DomainResult<()> {
        if self.status != PickupStatus::Requested {
            log::debug!("transition rejected: request already {:?}", self.status);
            return Err(DomainError::AlreadyCollected);
        }
        Ok(())
    }
}

impl<U: Clone + PartialEq> PickupRequest<U> {
    /// Marks the request as being handled by `by`. Claiming your own claim
    /// again is a no-op; a claim held by someone else is rejected.
    pub fn claim(&self, by: U, role: Role) -> DomainResult<Self> {
        self.ensure_requested()?;
        ensure_can_award(role)?;
        match &self.collector {
            Some(existing) if *existing == by => Ok(self.clone()),
            Some(_) => Err(DomainError::ClaimedByOther),
            None => Ok(PickupRequest { collector: Some(by), ..self.clone() }),
        }
    }

    /// Drops the claim. Allowed for the claimant and for admins; releasing an
    /// unclaimed request is a no-op.
    pub fn release(&self, by: &U, role: Role) -> DomainResult<Self> {
        self.ensure_requested()?;
        match &self.collector {
            None => Ok(self.clone()),
            Some(existing) if existing == by || role == Role::Admin => {
                Ok(PickupRequest { collector: None, ..self.clone() })
            }
            Some(_) => Err(DomainError::NotClaimant),
        }
    }
}

fn ensure_can_award(role: Role) -> DomainResult<()> {
    if !role.can_award_coins() {
        log::debug!("transition rejected: role {} cannot award coins", role);
        return Err(DomainError::Unauthorized { role });
    }
    Ok(())
}

/// Moves a request from `Requested` to `Collected`.
///
/// Checks the state first, then the collector's role, then that nobody else
/// holds a claim. On success the input is left untouched and the collected
/// copy, attributed to `collector`, is returned with the award.
pub fn collect<U: Clone + PartialEq>(
    request: &PickupRequest<U>,
    collector: U,
    collecting_role: Role,
    rates: &MaterialRates,
) -> DomainResult<Collection<U>> {
    request.ensure_requested()?;
    ensure_can_award(collecting_role)?;
    if matches!(&request.collector, Some(existing) if *existing != collector) {
        return Err(DomainError::ClaimedByOther);
    }

    let coins = rates.coins_for(request.material, request.weight_kg)?;
    let collected = PickupRequest {
        user_id: request.user_id.clone(),
        material: request.material,
        weight_kg: request.weight_kg,
        status: PickupStatus::Collected,
        coins_awarded: coins,
        collector: Some(collector),
    };
    Ok(Collection { request: collected, coins })
}

/// Coins the request would earn if collected now. Collected requests report
/// what they were actually awarded.
pub fn quote<U>(request: &PickupRequest<U>, rates: &MaterialRates) -> DomainResult<u64> {
    match request.status {
        PickupStatus::Collected => Ok(request.coins_awarded),
        PickupStatus::Requested => rates.coins_for(request.material, request.weight_kg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plastic_six() -> PickupRequest<&'static str> {
        PickupRequest::request("u-1", MaterialKind::Plastic, 6.0).unwrap()
    }

    #[test]
    fn new_request_starts_requested_with_no_coins() {
        let req = plastic_six();
        assert_eq!(req.status(), PickupStatus::Requested);
        assert_eq!(req.coins_awarded(), 0);
        assert_eq!(*req.user_id(), "u-1");
        assert_eq!(req.collector(), None);
    }

    #[test]
    fn zero_weight_is_rejected_on_creation() {
        let err = PickupRequest::request("u-1", MaterialKind::Paper, 0.0).unwrap_err();
        assert_eq!(err, DomainError::InvalidWeight { weight_kg: 0.0 });
    }

    #[test]
    fn collect_awards_and_leaves_input_untouched() {
        let req = plastic_six();
        let out = collect(&req, "c-1", Role::Collector, &MaterialRates::default()).unwrap();
        assert_eq!(out.coins, 23);
        assert_eq!(out.request.status(), PickupStatus::Collected);
        assert_eq!(out.request.coins_awarded(), 23);
        assert_eq!(out.request.collector(), Some(&"c-1"));
        assert_eq!(req.status(), PickupStatus::Requested);
        assert_eq!(req.coins_awarded(), 0);
    }

    #[test]
    fn state_is_checked_before_role() {
        let collected =
            PickupRequest::restore("u-1", MaterialKind::Iron, 2.0, PickupStatus::Collected, 13, Some("c-1"));
        let err = collect(&collected, "u-1", Role::Recycler, &MaterialRates::default()).unwrap_err();
        assert_eq!(err, DomainError::AlreadyCollected);
    }

    #[test]
    fn quote_matches_pricing_until_collected() {
        let rates = MaterialRates::default();
        let req = plastic_six();
        assert_eq!(quote(&req, &rates), Ok(23));

        let collected =
            PickupRequest::restore("u-1", MaterialKind::Iron, 2.0, PickupStatus::Collected, 12, Some("c-1"));
        assert_eq!(quote(&collected, &rates), Ok(12));
    }

    #[test]
    fn claim_sets_collector_and_is_idempotent_for_claimant() {
        let claimed = plastic_six().claim("c-1", Role::Collector).unwrap();
        assert_eq!(claimed.collector(), Some(&"c-1"));
        assert_eq!(claimed.status(), PickupStatus::Requested);
        assert_eq!(claimed.claim("c-1", Role::Collector), Ok(claimed.clone()));
    }

    #[test]
    fn claim_held_by_another_collector_is_rejected() {
        let claimed = plastic_six().claim("c-1", Role::Collector).unwrap();
        assert_eq!(claimed.claim("c-2", Role::Collector), Err(DomainError::ClaimedByOther));
        assert_eq!(claimed.claim("a-1", Role::Admin), Err(DomainError::ClaimedByOther));
    }

    #[test]
    fn recycler_cannot_claim() {
        assert_eq!(
            plastic_six().claim("u-1", Role::Recycler),
            Err(DomainError::Unauthorized { role: Role::Recycler })
        );
    }

    #[test]
    fn collected_request_cannot_be_claimed_or_released() {
        let out = collect(&plastic_six(), "c-1", Role::Collector, &MaterialRates::default()).unwrap();
        assert_eq!(out.request.claim("c-2", Role::Collector), Err(DomainError::AlreadyCollected));
        assert_eq!(out.request.release(&"c-1", Role::Admin), Err(DomainError::AlreadyCollected));
    }

    #[test]
    fn release_is_limited_to_claimant_or_admin() {
        let claimed = plastic_six().claim("c-1", Role::Collector).unwrap();
        assert_eq!(claimed.release(&"c-2", Role::Collector), Err(DomainError::NotClaimant));

        let by_owner = claimed.release(&"c-1", Role::Collector).unwrap();
        assert_eq!(by_owner.collector(), None);

        let by_admin = claimed.release(&"a-1", Role::Admin).unwrap();
        assert_eq!(by_admin.collector(), None);

        // Nothing to release.
        assert_eq!(plastic_six().release(&"c-2", Role::Recycler), Ok(plastic_six()));
    }

    #[test]
    fn collect_rejects_foreign_claim_but_accepts_claimant() {
        let rates = MaterialRates::default();
        let claimed = plastic_six().claim("c-1", Role::Collector).unwrap();

        assert_eq!(collect(&claimed, "c-2", Role::Collector, &rates), Err(DomainError::ClaimedByOther));
        assert_eq!(collect(&claimed, "a-1", Role::Admin, &rates), Err(DomainError::ClaimedByOther));

        let out = collect(&claimed, "c-1", Role::Collector, &rates).unwrap();
        assert_eq!(out.coins, 23);
    }
}
