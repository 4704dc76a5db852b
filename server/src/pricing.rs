// ============================================================================
// MATERIAL RATE CONFIGURATION
// ============================================================================
// Base rates live in a singleton row so a deployment can override them
// without republishing. The pricing rules themselves are fixed in
// trashtrack_domain::materials.
// ============================================================================

use spacetimedb::{Identity, ReducerContext, Table, Timestamp};
use log;
use trashtrack_domain::MaterialRates;

// Import table traits
use crate::pricing::material_rate_config as MaterialRateConfigTableTrait;
use crate::pricing::module_owner as ModuleOwnerTableTrait;

const CONFIG_ROW_ID: u8 = 0;

/// Identity that published the module. Allowed to register as admin.
#[spacetimedb::table(accessor = module_owner)]
#[derive(Clone, Debug)]
pub struct ModuleOwner {
    #[primary_key]
    pub id: u8,
    pub owner: Identity,
}

#[spacetimedb::table(accessor = material_rate_config, public)]
#[derive(Clone, Debug)]
pub struct MaterialRateConfig {
    #[primary_key]
    pub id: u8,
    pub paper_rate: f64,
    pub plastic_rate: f64,
    pub iron_rate: f64,
    pub updated_by: Option<Identity>,
    pub updated_at: Timestamp,
}

impl MaterialRateConfig {
    fn rates(&self) -> MaterialRates {
        MaterialRates {
            paper: self.paper_rate,
            plastic: self.plastic_rate,
            iron: self.iron_rate,
        }
    }
}

// ============================================================================
// INITIALIZATION
// ============================================================================

pub fn record_module_owner(ctx: &ReducerContext) -> Result<(), String> {
    let owners = ctx.db.module_owner();
    if owners.id().find(&CONFIG_ROW_ID).is_some() {
        log::debug!("Module owner already recorded.");
        return Ok(());
    }
    owners.try_insert(ModuleOwner { id: CONFIG_ROW_ID, owner: ctx.sender() })
        .map_err(|e| format!("Failed to record module owner: {}", e))?;
    log::info!("Recorded module owner {:?}", ctx.sender());
    Ok(())
}

/// Seeds the default rates on first publish. Existing overrides are kept.
pub fn seed_material_rates(ctx: &ReducerContext) -> Result<(), String> {
    let configs = ctx.db.material_rate_config();
    if configs.id().find(&CONFIG_ROW_ID).is_some() {
        log::debug!("Material rate config already exists.");
        return Ok(());
    }

    let defaults = MaterialRates::default();
    configs.try_insert(MaterialRateConfig {
        id: CONFIG_ROW_ID,
        paper_rate: defaults.paper,
        plastic_rate: defaults.plastic,
        iron_rate: defaults.iron,
        updated_by: None,
        updated_at: ctx.timestamp,
    }).map_err(|e| format!("Failed to seed material rates: {}", e))?;

    log::info!("Seeded material rates: paper={} plastic={} iron={}", defaults.paper, defaults.plastic, defaults.iron);
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

pub fn is_module_owner(ctx: &ReducerContext, identity: &Identity) -> bool {
    ctx.db.module_owner().id().find(&CONFIG_ROW_ID)
        .map(|row| row.owner == *identity)
        .unwrap_or(false)
}

/// Rates currently in force. Falls back to the defaults if the row is
/// missing or holds values that no longer validate.
pub fn active_rates(ctx: &ReducerContext) -> MaterialRates {
    match ctx.db.material_rate_config().id().find(&CONFIG_ROW_ID) {
        Some(config) => config.rates().validated().unwrap_or_else(|e| {
            log::error!("Stored material rates are invalid ({}); using defaults", e);
            MaterialRates::default()
        }),
        None => {
            log::warn!("Material rate config missing; using defaults");
            MaterialRates::default()
        }
    }
}

// ============================================================================
// REDUCERS
// ============================================================================

/// Admin-only: replace the base rates, given as JSON
/// (`{"paper":2.0,"plastic":3.0,"iron":6.0}`).
#[spacetimedb::reducer]
pub fn set_material_rates(ctx: &ReducerContext, rates_json: String) -> Result<(), String> {
    let caller = crate::profile::caller_profile(ctx)?;
    if !caller.role.can_configure_rates() {
        log::warn!("[SetMaterialRates] {:?} ({}) may not configure rates.", ctx.sender(), caller.role);
        return Err(format!("Role '{}' cannot configure material rates", caller.role));
    }

    let rates: MaterialRates = serde_json::from_str(&rates_json)
        .map_err(|e| format!("Invalid rates JSON: {}", e))?;
    let rates = MaterialRates::new(rates.paper, rates.plastic, rates.iron).map_err(|e| e.to_string())?;

    let row = MaterialRateConfig {
        id: CONFIG_ROW_ID,
        paper_rate: rates.paper,
        plastic_rate: rates.plastic,
        iron_rate: rates.iron,
        updated_by: Some(ctx.sender()),
        updated_at: ctx.timestamp,
    };
    let configs = ctx.db.material_rate_config();
    if configs.id().find(&CONFIG_ROW_ID).is_some() {
        configs.id().update(row);
    } else {
        configs.try_insert(row).map_err(|e| format!("Failed to store material rates: {}", e))?;
    }

    log::info!("[SetMaterialRates] {:?} set rates paper={} plastic={} iron={}",
              ctx.sender(), rates.paper, rates.plastic, rates.iron);
    Ok(())
}
