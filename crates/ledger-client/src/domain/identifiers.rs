//! # Identifier Derivation
//!
//! Maps a logical name and the holder identity to the identifier the ledger
//! stores the object under. No normalization or escaping is applied; empty
//! names still produce an identifier and the ledger decides acceptance.
//!
//! | Kind | Shape |
//! |------|-------|
//! | Contract | `{contract_name}_{holder_id}` |
//! | Asset | `{holder_id}-{id}` |

use super::identity::IdentityContext;
use serde::Serialize;
use std::fmt;

/// Separator between contract name and holder id.
pub const CONTRACT_ID_SEPARATOR: char = '_';

/// Separator between holder id and asset id.
pub const ASSET_ID_SEPARATOR: char = '-';

/// Backend identifier of a registered contract.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContractId(String);

impl ContractId {
    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend identifier of an asset subject to validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the contract identifier for `contract_name` registered by `identity`.
#[must_use]
pub fn derive_contract_id(contract_name: &str, identity: &IdentityContext) -> ContractId {
    ContractId(format!(
        "{contract_name}{CONTRACT_ID_SEPARATOR}{}",
        identity.holder_id()
    ))
}

/// Derive the asset identifier for the caller-supplied short `id`.
#[must_use]
pub fn derive_asset_id(id: &str, identity: &IdentityContext) -> AssetId {
    AssetId(format!("{}{ASSET_ID_SEPARATOR}{id}", identity.holder_id()))
}
