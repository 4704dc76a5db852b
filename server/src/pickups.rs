// ============================================================================
// PICKUP REQUESTS
// ============================================================================
// Persistence side of the pickup lifecycle:
// - Recyclers create requests (Requested, 0 coins)
// - Collectors may claim a request before collecting it
// - Collection runs trashtrack_domain::collect and credits the collector
//
// Each reducer is one transaction, so two collectors racing on the same row
// are serialized: the second one sees Collected and is rejected.
// ============================================================================

use spacetimedb::{Identity, ReducerContext, Table, Timestamp};
use log;
use trashtrack_domain::{collect, MaterialKind, PickupRequest, PickupStatus};

// Import table traits
use crate::pickups::pickup_request as PickupRequestTableTrait;

#[spacetimedb::table(
    accessor = pickup_request,
    public,
    index(accessor = idx_pickup_user, btree(columns = [user_id]))
)]
#[derive(Clone, Debug)]
pub struct PickupRequestRow {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    /// Recycler who submitted the request
    pub user_id: Identity,

    pub material: MaterialKind,
    pub weight_kg: f64,
    pub status: PickupStatus,

    /// 0 until collected, then the amount credited to the collector
    pub coins_awarded: u64,

    /// Collector who claimed or collected this request
    pub collector_id: Option<Identity>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub collected_at: Option<Timestamp>,
}

impl PickupRequestRow {
    pub fn to_domain(&self) -> PickupRequest<Identity> {
        PickupRequest::restore(
            self.user_id,
            self.material,
            self.weight_kg,
            self.status,
            self.coins_awarded,
            self.collector_id,
        )
    }
}

// --- Helpers ---

fn find_pickup(ctx: &ReducerContext, pickup_id: u64) -> Result<PickupRequestRow, String> {
    ctx.db.pickup_request().id().find(&pickup_id)
        .ok_or_else(|| format!("Pickup {} not found", pickup_id))
}

// ============================================================================
// REDUCERS
// ============================================================================

/// Recycler submits material for collection.
#[spacetimedb::reducer]
pub fn request_pickup(ctx: &ReducerContext, material_code: String, weight_kg: f64) -> Result<(), String> {
    let profile = crate::profile::caller_profile(ctx)?;
    let material = material_code.parse::<MaterialKind>().map_err(|e| e.to_string())?;

    let request = PickupRequest::request(profile.identity, material, weight_kg).map_err(|e| {
        log::warn!("[RequestPickup] {:?} rejected: {}", ctx.sender(), e);
        e.to_string()
    })?;

    let row = PickupRequestRow {
        id: 0, // auto_inc
        user_id: *request.user_id(),
        material: request.material(),
        weight_kg: request.weight_kg(),
        status: request.status(),
        coins_awarded: request.coins_awarded(),
        collector_id: None,
        created_at: ctx.timestamp,
        updated_at: ctx.timestamp,
        collected_at: None,
    };
    let inserted = ctx.db.pickup_request().try_insert(row)
        .map_err(|e| format!("Failed to create pickup: {}", e))?;

    log::info!("[RequestPickup] {:?} requested pickup {} ({} {} kg)",
              ctx.sender(), inserted.id, inserted.material, inserted.weight_kg);

    if let Err(e) = crate::stats::refresh_stats_for(ctx, inserted.user_id) {
        log::error!("[RequestPickup] Failed to refresh stats for {:?}: {}", inserted.user_id, e);
    }
    Ok(())
}

/// Collector claims a requested pickup so others know it is being handled.
#[spacetimedb::reducer]
pub fn assign_pickup(ctx: &ReducerContext, pickup_id: u64) -> Result<(), String> {
    let profile = crate::profile::caller_profile(ctx)?;
    let mut pickup = find_pickup(ctx, pickup_id)?;

    let claimed = pickup.to_domain().claim(ctx.sender(), profile.role).map_err(|e| {
        log::warn!("[AssignPickup] {:?} could not claim pickup {}: {}", ctx.sender(), pickup_id, e);
        e.to_string()
    })?;
    if pickup.collector_id == claimed.collector().copied() {
        log::debug!("[AssignPickup] Pickup {} already claimed by {:?}", pickup_id, ctx.sender());
        return Ok(());
    }

    pickup.collector_id = claimed.collector().copied();
    pickup.updated_at = ctx.timestamp;
    ctx.db.pickup_request().id().update(pickup);

    log::info!("[AssignPickup] {:?} claimed pickup {}", ctx.sender(), pickup_id);
    Ok(())
}

/// The claiming collector, or an admin, releases a claim.
#[spacetimedb::reducer]
pub fn release_pickup(ctx: &ReducerContext, pickup_id: u64) -> Result<(), String> {
    let profile = crate::profile::caller_profile(ctx)?;
    let mut pickup = find_pickup(ctx, pickup_id)?;

    let released = pickup.to_domain().release(&ctx.sender(), profile.role).map_err(|e| {
        log::warn!("[ReleasePickup] {:?} could not release pickup {}: {}", ctx.sender(), pickup_id, e);
        e.to_string()
    })?;
    let Some(claimed_by) = pickup.collector_id else {
        log::debug!("[ReleasePickup] Pickup {} is not claimed", pickup_id);
        return Ok(());
    };

    pickup.collector_id = released.collector().copied();
    pickup.updated_at = ctx.timestamp;
    ctx.db.pickup_request().id().update(pickup);

    log::info!("[ReleasePickup] {:?} released pickup {} (was {:?})", ctx.sender(), pickup_id, claimed_by);
    Ok(())
}

/// Marks a pickup collected and credits the reward to the collector.
#[spacetimedb::reducer]
pub fn collect_pickup(ctx: &ReducerContext, pickup_id: u64) -> Result<(), String> {
    let collector = crate::profile::caller_profile(ctx)?;
    let mut pickup = find_pickup(ctx, pickup_id)?;

    let rates = crate::pricing::active_rates(ctx);
    let collection = collect(&pickup.to_domain(), ctx.sender(), collector.role, &rates).map_err(|e| {
        log::warn!("[CollectPickup] {:?} could not collect pickup {}: {}", ctx.sender(), pickup_id, e);
        e.to_string()
    })?;

    pickup.status = collection.request.status();
    pickup.coins_awarded = collection.request.coins_awarded();
    pickup.collector_id = collection.request.collector().copied();
    pickup.updated_at = ctx.timestamp;
    pickup.collected_at = Some(ctx.timestamp);
    let owner = pickup.user_id;
    ctx.db.pickup_request().id().update(pickup);

    let balance = crate::ledger::credit(ctx, ctx.sender(), collection.coins)?;

    log::info!("[CollectPickup] {:?} collected pickup {} for {} coins (balance now {})",
              ctx.sender(), pickup_id, collection.coins, balance.balance);

    if let Err(e) = crate::stats::refresh_stats_for(ctx, owner) {
        log::error!("[CollectPickup] Failed to refresh stats for {:?}: {}", owner, e);
    }
    Ok(())
}
