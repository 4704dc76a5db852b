use spacetimedb::{ConnectionId, Identity, ReducerContext, Table, Timestamp};
use log;

// Declare the modules
mod profile; // Profiles, roles and session tracking
mod pricing; // Material base rate configuration
mod pickups; // Pickup request lifecycle reducers
mod ledger; // Coin balances
mod stats; // Per-recycler pickup summaries

// Re-export reducers for client bindings
pub use profile::{register_profile, update_full_name, switch_role, set_user_role, Profile};
pub use pricing::{set_material_rates, MaterialRateConfig, ModuleOwner};
pub use pickups::{request_pickup, assign_pickup, release_pickup, collect_pickup, PickupRequestRow};
pub use ledger::{ensure_coin_balance, redeem_coins, CoinBalanceRow};
pub use stats::{refresh_pickup_stats, PickupStats};

// Import table traits needed in this module
use crate::active_connection as ActiveConnectionTableTrait;
use crate::profile::profile as ProfileTableTrait;

/// One row per connected identity. Replaced on reconnect.
#[spacetimedb::table(accessor = active_connection)]
#[derive(Clone, Debug)]
pub struct ActiveConnection {
    #[primary_key]
    pub identity: Identity,
    pub connection_id: ConnectionId,
    pub timestamp: Timestamp,
}

// --- Lifecycle Reducers ---

// Called once when the module is published or updated
#[spacetimedb::reducer(init)]
pub fn init_module(ctx: &ReducerContext) -> Result<(), String> {
    log::info!("Initializing TrashTrack module...");

    crate::pricing::record_module_owner(ctx)?;
    crate::pricing::seed_material_rates(ctx)?;

    log::info!("Module initialization complete.");
    Ok(())
}

/// Tracks the client's connection and marks its profile online.
#[spacetimedb::reducer(client_connected)]
pub fn identity_connected(ctx: &ReducerContext) -> Result<(), String> {
    let client_identity = ctx.sender();
    let connection_id = ctx.connection_id().ok_or_else(|| {
        log::error!("[Connect] Missing ConnectionId in client_connected context for {:?}", client_identity);
        "Internal error: Missing connection ID on connect".to_string()
    })?;

    let active_connections = ctx.db.active_connection();
    let new_active_conn = ActiveConnection {
        identity: client_identity,
        connection_id,
        timestamp: ctx.timestamp,
    };

    if active_connections.identity().find(&client_identity).is_some() {
        active_connections.identity().update(new_active_conn);
        log::info!("[Connect] Updated existing active connection record for {:?}.", client_identity);
    } else {
        active_connections.try_insert(new_active_conn).map_err(|e| {
            log::error!("[Connect] Failed to insert active connection for {:?}: {}", client_identity, e);
            format!("Failed to track connection: {}", e)
        })?;
        log::info!("[Connect] Inserted new active connection record for {:?}.", client_identity);
    }

    let profiles = ctx.db.profile();
    if let Some(mut profile) = profiles.identity().find(&client_identity) {
        if !profile.is_online {
            profile.is_online = true;
            profiles.identity().update(profile);
        }
    } else {
        // Not registered yet; register_profile sets is_online.
        log::debug!("[Connect] {:?} has no profile yet.", client_identity);
    }

    // Summaries may be stale after time offline.
    if let Err(e) = crate::stats::refresh_stats_for(ctx, client_identity) {
        log::error!("[Connect] Failed to refresh pickup stats for {:?}: {}", client_identity, e);
    }

    Ok(())
}

/// Drops the connection record and marks the profile offline, unless the
/// identity already reconnected on a newer connection.
#[spacetimedb::reducer(client_disconnected)]
pub fn identity_disconnected(ctx: &ReducerContext) {
    let sender_id = ctx.sender();
    let disconnecting_connection_id = match ctx.connection_id() {
        Some(id) => id,
        None => return,
    };

    let active_connections = ctx.db.active_connection();
    let Some(active_conn) = active_connections.identity().find(&sender_id) else {
        return;
    };
    if active_conn.connection_id != disconnecting_connection_id {
        // Reconnected before this disconnect was processed.
        return;
    }

    active_connections.identity().delete(&sender_id);

    let profiles = ctx.db.profile();
    if let Some(mut profile) = profiles.identity().find(&sender_id) {
        if profile.is_online {
            profile.is_online = false;
            profiles.identity().update(profile);
            log::info!("[Disconnect] Set profile {:?} to offline.", sender_id);
        }
    }
}
