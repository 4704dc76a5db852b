// ============================================================================
// COIN LEDGER
// ============================================================================
// Storage for coin balances. The arithmetic lives in
// trashtrack_domain::CoinBalance; this module only loads, applies, and saves.
// ============================================================================

use spacetimedb::{Identity, ReducerContext, Table, Timestamp};
use log;
use trashtrack_domain::CoinBalance;

// Import table traits
use crate::ledger::coin_balance as CoinBalanceTableTrait;

#[spacetimedb::table(accessor = coin_balance, public)]
#[derive(Clone, Debug)]
pub struct CoinBalanceRow {
    #[primary_key]
    pub owner_id: Identity,

    /// Current coin balance
    pub balance: u64,

    /// Total coins ever earned
    pub total_earned: u64,

    /// Total coins ever spent
    pub total_spent: u64,

    /// Last transaction timestamp
    pub last_transaction: Timestamp,
}

impl CoinBalanceRow {
    fn as_value(&self) -> CoinBalance {
        CoinBalance::new(self.balance, self.total_earned, self.total_spent)
    }

    fn with_value(mut self, value: CoinBalance, at: Timestamp) -> Self {
        self.balance = value.balance;
        self.total_earned = value.total_earned;
        self.total_spent = value.total_spent;
        self.last_transaction = at;
        self
    }
}

/// Makes sure `owner_id` has a balance row, creating an empty one if needed.
pub fn ensure_balance_row(ctx: &ReducerContext, owner_id: Identity) -> Result<CoinBalanceRow, String> {
    let balances = ctx.db.coin_balance();
    if let Some(row) = balances.owner_id().find(&owner_id) {
        return Ok(row);
    }
    balances.try_insert(CoinBalanceRow {
        owner_id,
        balance: 0,
        total_earned: 0,
        total_spent: 0,
        last_transaction: ctx.timestamp,
    }).map_err(|e| format!("Failed to create coin balance: {}", e))
}

/// Credits `amount` coins to `owner_id`. Must run in the same transaction as
/// the state change that earned them.
pub fn credit(ctx: &ReducerContext, owner_id: Identity, amount: u64) -> Result<CoinBalance, String> {
    let row = ensure_balance_row(ctx, owner_id)?;
    let updated = row.as_value().credit(amount);
    ctx.db.coin_balance().owner_id().update(row.with_value(updated, ctx.timestamp));
    Ok(updated)
}

// --- Reducers ---

/// Clients subscribe to the table; this just ensures a record exists.
#[spacetimedb::reducer]
pub fn ensure_coin_balance(ctx: &ReducerContext) -> Result<(), String> {
    ensure_balance_row(ctx, ctx.sender())?;
    Ok(())
}

/// Spend coins from the caller's balance. Overdrafts are refused.
#[spacetimedb::reducer]
pub fn redeem_coins(ctx: &ReducerContext, amount: u64) -> Result<(), String> {
    crate::profile::caller_profile(ctx)?;

    let row = ensure_balance_row(ctx, ctx.sender())?;
    let updated = row.as_value().redeem(amount).map_err(|e| {
        log::warn!("[RedeemCoins] {:?} could not redeem {}: {}", ctx.sender(), amount, e);
        e.to_string()
    })?;
    ctx.db.coin_balance().owner_id().update(row.with_value(updated, ctx.timestamp));

    log::info!("[RedeemCoins] {:?} redeemed {} coins (balance now {})", ctx.sender(), amount, updated.balance);
    Ok(())
}
