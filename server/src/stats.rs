use spacetimedb::{Identity, ReducerContext, Table, Timestamp};
use log;
use trashtrack_domain::{MaterialKind, PickupRequest, PickupSummary};

// Import table traits
use crate::pickups::pickup_request as PickupRequestTableTrait;
use crate::stats::pickup_stats as PickupStatsTableTrait;

/// Dashboard figures for one recycler, recomputed from their pickups.
#[spacetimedb::table(accessor = pickup_stats, public)]
#[derive(Clone, Debug)]
pub struct PickupStats {
    #[primary_key]
    pub user_id: Identity,
    pub total_requests: u32,
    pub pending: u32,
    pub collected: u32,
    pub completion_percent: u32,
    pub total_weight_kg: f64,
    pub total_coins: u64,
    pub paper_kg: f64,
    pub plastic_kg: f64,
    pub iron_kg: f64,
    pub updated_at: Timestamp,
}

/// Rebuilds the stats row for `user_id` from the pickup table.
pub fn refresh_stats_for(ctx: &ReducerContext, user_id: Identity) -> Result<(), String> {
    let requests: Vec<PickupRequest<Identity>> = ctx.db.pickup_request().idx_pickup_user()
        .filter(&user_id)
        .map(|row| row.to_domain())
        .collect();

    if requests.is_empty() && ctx.db.pickup_stats().user_id().find(&user_id).is_none() {
        log::trace!("No pickups for {:?}; skipping stats row.", user_id);
        return Ok(());
    }

    let summary = PickupSummary::from_requests(&requests);
    let row = PickupStats {
        user_id,
        total_requests: summary.total_requests,
        pending: summary.pending,
        collected: summary.collected,
        completion_percent: summary.completion_percent(),
        total_weight_kg: summary.total_weight_kg,
        total_coins: summary.total_coins,
        paper_kg: summary.tally(MaterialKind::Paper).weight_kg,
        plastic_kg: summary.tally(MaterialKind::Plastic).weight_kg,
        iron_kg: summary.tally(MaterialKind::Iron).weight_kg,
        updated_at: ctx.timestamp,
    };

    let stats = ctx.db.pickup_stats();
    if stats.user_id().find(&user_id).is_some() {
        stats.user_id().update(row);
    } else {
        stats.try_insert(row).map_err(|e| format!("Failed to insert pickup stats: {}", e))?;
    }
    Ok(())
}

/// Explicit refresh of the caller's stats row.
#[spacetimedb::reducer]
pub fn refresh_pickup_stats(ctx: &ReducerContext) -> Result<(), String> {
    refresh_stats_for(ctx, ctx.sender())
}
