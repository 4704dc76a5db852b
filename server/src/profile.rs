// ============================================================================
// PROFILES
// ============================================================================
// A profile binds an authenticated identity to a display name and a Role.
// - Anyone may register as a recycler or collector.
// - Admin is granted to the module owner, or by another admin.
// ============================================================================

use spacetimedb::{Identity, ReducerContext, Table, Timestamp};
use log;
use trashtrack_domain::{validate_full_name, DomainError, Role};

// Import table traits
use crate::profile::profile as ProfileTableTrait;

// --- Configuration Constants ---
/// Lets users switch between recycler and collector themselves (testing aid).
/// Switching into admin is never allowed through this path.
const ENABLE_ROLE_SWITCHING: bool = true;

#[spacetimedb::table(accessor = profile, public)]
#[derive(Clone, Debug)]
pub struct Profile {
    #[primary_key]
    pub identity: Identity,
    pub full_name: String,
    pub role: Role,
    pub is_online: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// --- Helpers ---

/// Profile of the calling identity, or an error telling the client to register.
pub fn caller_profile(ctx: &ReducerContext) -> Result<Profile, String> {
    ctx.db.profile().identity().find(&ctx.sender())
        .ok_or_else(|| "Profile not found. Register first.".to_string())
}

fn parse_role(role: &str) -> Result<Role, String> {
    role.parse::<Role>().map_err(|e| e.to_string())
}

// --- Reducers ---

/// Creates the caller's profile, or refreshes its name on re-registration.
/// The role of an existing profile is left alone.
#[spacetimedb::reducer]
pub fn register_profile(ctx: &ReducerContext, full_name: String, role: String) -> Result<(), String> {
    let sender_id = ctx.sender();
    let name = validate_full_name(&full_name).map_err(|e| e.to_string())?;
    let profiles = ctx.db.profile();

    if let Some(mut existing) = profiles.identity().find(&sender_id) {
        log::info!("[RegisterProfile] Found existing profile '{}' ({:?}).", existing.full_name, sender_id);
        existing.full_name = name;
        existing.is_online = true;
        existing.updated_at = ctx.timestamp;
        profiles.identity().update(existing);
        return Ok(());
    }

    let requested_role = parse_role(&role)?;
    let is_owner = crate::pricing::is_module_owner(ctx, &sender_id);
    if !requested_role.may_self_register(is_owner) {
        log::warn!("[RegisterProfile] {:?} tried to self-register as {}.", sender_id, requested_role);
        return Err(DomainError::SelfRegistrationDenied { role: requested_role }.to_string());
    }

    let profile = Profile {
        identity: sender_id,
        full_name: name,
        role: requested_role,
        is_online: true,
        created_at: ctx.timestamp,
        updated_at: ctx.timestamp,
    };
    let inserted = profiles.try_insert(profile)
        .map_err(|e| format!("Failed to create profile: {}", e))?;

    crate::ledger::ensure_balance_row(ctx, sender_id)?;

    log::info!("[RegisterProfile] Registered '{}' as {} ({:?}).", inserted.full_name, inserted.role, sender_id);
    Ok(())
}

#[spacetimedb::reducer]
pub fn update_full_name(ctx: &ReducerContext, full_name: String) -> Result<(), String> {
    let mut profile = caller_profile(ctx)?;
    profile.full_name = validate_full_name(&full_name).map_err(|e| e.to_string())?;
    profile.updated_at = ctx.timestamp;
    ctx.db.profile().identity().update(profile);
    Ok(())
}

/// Switch the caller between recycler and collector.
#[spacetimedb::reducer]
pub fn switch_role(ctx: &ReducerContext, role: String) -> Result<(), String> {
    if !ENABLE_ROLE_SWITCHING {
        return Err("Role switching is disabled".to_string());
    }

    let new_role = parse_role(&role)?;
    if new_role == Role::Admin {
        return Err("Admin role can only be granted by an admin".to_string());
    }

    let mut profile = caller_profile(ctx)?;
    if profile.role == new_role {
        log::debug!("[SwitchRole] {:?} is already {}.", ctx.sender(), new_role);
        return Ok(());
    }

    log::info!("[SwitchRole] {:?}: {} -> {}", ctx.sender(), profile.role, new_role);
    profile.role = new_role;
    profile.updated_at = ctx.timestamp;
    ctx.db.profile().identity().update(profile);
    Ok(())
}

/// Admin-only: set another user's role.
#[spacetimedb::reducer]
pub fn set_user_role(ctx: &ReducerContext, target: Identity, role: String) -> Result<(), String> {
    let caller = caller_profile(ctx)?;
    if caller.role != Role::Admin {
        log::warn!("[SetUserRole] {:?} ({}) is not an admin.", ctx.sender(), caller.role);
        return Err("Only admins can change other users' roles".to_string());
    }

    let new_role = parse_role(&role)?;
    let profiles = ctx.db.profile();
    let mut target_profile = profiles.identity().find(&target)
        .ok_or("Target profile not found")?;

    log::info!("[SetUserRole] {:?} set {:?} from {} to {}", ctx.sender(), target, target_profile.role, new_role);
    target_profile.role = new_role;
    target_profile.updated_at = ctx.timestamp;
    profiles.identity().update(target_profile);
    Ok(())
}
