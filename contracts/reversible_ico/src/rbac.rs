//! # RBAC: Role-Based Access Control
//!
//! The sale knows three privileged roles:
//!
//! ```text
//! Deployer             freeze / unfreeze
//! WhitelistController  approve / reject participants
//! ProjectWallet        withdraw released funds
//! ```
//!
//! ## Storage layout
//!
//! - `DataKey::Deployer` → `Address`, set once by `init`.
//! - `WhitelistController` and `ProjectWallet` are read from the stored
//!   [`SaleConfig`](crate::types::SaleConfig).
//!
//! Roles are never granted or revoked after `init`. One address may hold
//! several roles (e.g. the deployer may also be the whitelist controller).
//!
//! ## Event emissions
//!
//! | Event topic prefix | Trigger                          |
//! |--------------------|----------------------------------|
//! | `role_set`         | A role holder recorded by `init` |

use soroban_sdk::{contracttype, symbol_short, Address, Env, Vec};

use crate::storage;
use crate::Error;

/// The set of privileged roles. Every caller without one is a participant.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// Called `init`; can freeze and unfreeze the sale.
    Deployer,
    /// Approves or rejects participants.
    WhitelistController,
    /// Receives released funds through `project_withdraw`.
    ProjectWallet,
}

const ALL_ROLES: [Role; 3] = [Role::Deployer, Role::WhitelistController, Role::ProjectWallet];

// ─────────────────────────────────────────────────────────
// Initialisation
// ─────────────────────────────────────────────────────────

/// Record the deployer and announce all role holders.
/// Fails with `Error::AlreadyInitialized` if a deployer is already stored.
pub fn init_roles(
    env: &Env,
    deployer: &Address,
    whitelist_controller: &Address,
    project_wallet: &Address,
) -> Result<(), Error> {
    if storage::load_deployer(env).is_some() {
        return Err(Error::AlreadyInitialized);
    }
    storage::save_deployer(env, deployer);

    emit(env, deployer, Role::Deployer);
    emit(env, whitelist_controller, Role::WhitelistController);
    emit(env, project_wallet, Role::ProjectWallet);
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Lookup
// ─────────────────────────────────────────────────────────

/// The address holding `role`, or `None` before `init`.
pub fn holder(env: &Env, role: Role) -> Option<Address> {
    match role {
        Role::Deployer => storage::load_deployer(env),
        Role::WhitelistController => storage::load_config(env)
            .ok()
            .map(|c| c.whitelist_controller),
        Role::ProjectWallet => storage::load_config(env).ok().map(|c| c.project_wallet),
    }
}

// ─────────────────────────────────────────────────────────
// Access guards (called from lib.rs handlers)
// ─────────────────────────────────────────────────────────

/// Assert that `address` holds `role`.
/// Fails with `Error::Unauthorized` otherwise.
pub fn require_role(env: &Env, address: &Address, role: Role) -> Result<(), Error> {
    match holder(env, role) {
        Some(ref h) if h == address => Ok(()),
        _ => Err(Error::Unauthorized),
    }
}

#[inline]
pub fn require_deployer(env: &Env, address: &Address) -> Result<(), Error> {
    require_role(env, address, Role::Deployer)
}

/// Gates `approve` and `reject`.
#[inline]
pub fn require_whitelist_controller(env: &Env, address: &Address) -> Result<(), Error> {
    require_role(env, address, Role::WhitelistController)
}

/// Gates `project_withdraw`.
#[inline]
pub fn require_project_wallet(env: &Env, address: &Address) -> Result<(), Error> {
    require_role(env, address, Role::ProjectWallet)
}

// ─────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────

/// Every role held by `address`, in declaration order.
pub fn roles_of(env: &Env, address: &Address) -> Vec<Role> {
    let mut roles = Vec::new(env);
    for role in ALL_ROLES {
        if has_role(env, address, role) {
            roles.push_back(role);
        }
    }
    roles
}

pub fn has_role(env: &Env, address: &Address, role: Role) -> bool {
    holder(env, role).map(|h| &h == address).unwrap_or(false)
}

// ─────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────

/// Topic: `(role_set, holder_address, role_name_symbol)`
fn emit(env: &Env, holder: &Address, role: Role) {
    env.events().publish(
        (symbol_short!("role_set"), holder.clone(), role_to_symbol(role)),
        (),
    );
}

fn role_to_symbol(role: Role) -> soroban_sdk::Symbol {
    match role {
        Role::Deployer => symbol_short!("deployer"),
        Role::WhitelistController => symbol_short!("wl_ctrl"),
        Role::ProjectWallet => symbol_short!("proj_wal"),
    }
}
