//! Admin Allow-List
//!
//! Static set of lower-cased addresses with elevated privilege. Loaded once
//! at startup and never mutated.

use std::collections::HashSet;

use kernel::address::{AddressError, WalletAddress};

#[derive(Debug, Clone, Default)]
pub struct AllowList {
    members: HashSet<String>,
}

impl AllowList {
    pub fn new(addresses: impl IntoIterator<Item = WalletAddress>) -> Self {
        Self {
            members: addresses
                .into_iter()
                .map(|address| address.to_lowercase_hex())
                .collect(),
        }
    }

    /// Parse a comma-separated list. Blank entries are skipped; any other
    /// entry that is not an address fails the whole list.
    pub fn from_env_list(value: &str) -> Result<Self, AddressError> {
        let addresses = value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(WalletAddress::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(addresses))
    }

    /// Membership by lower-cased string. Malformed input is never privileged.
    pub fn is_privileged(&self, address: &str) -> bool {
        WalletAddress::parse(address).is_ok_and(|address| self.contains(&address))
    }

    pub fn contains(&self, address: &WalletAddress) -> bool {
        self.members.contains(&address.to_lowercase_hex())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
