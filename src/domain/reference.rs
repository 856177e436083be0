//! Reference data for supported storage chains and currencies.
//!
//! Both tables are ordered. The first entry of each table is the default
//! selection of the form, so the order of the built-in tables (and of any
//! override file) is part of the configuration.

use super::errors::{DomainError, DomainResult};
use super::models::{Currency, CurrencyType, NetworkType, StorageChain};
use serde::Deserialize;
use std::collections::HashSet;

/// An ordered, immutable key/entry table with exact-match lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable<T> {
    entries: Vec<(String, T)>,
}

impl<T> ReferenceTable<T> {
    /// Builds a table, rejecting empty tables and duplicate keys.
    pub fn new(entries: Vec<(String, T)>) -> DomainResult<Self> {
        if entries.is_empty() {
            return Err(DomainError::InvalidReferenceData("table has no entries".to_string()));
        }
        let mut seen = HashSet::new();
        for (key, _) in &entries {
            if key.is_empty() {
                return Err(DomainError::InvalidReferenceData("empty key".to_string()));
            }
            if !seen.insert(key.as_str()) {
                return Err(DomainError::InvalidReferenceData(format!("duplicate key {}", key)));
            }
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Key of the entry selected by default: the first in table order.
    pub fn default_key(&self) -> &str {
        &self.entries[0].0
    }

    /// Key following `key` in table order, wrapping around.
    ///
    /// An unknown key yields the default key.
    pub fn next_key(&self, key: &str) -> &str {
        match self.position(key) {
            Some(i) => &self.entries[(i + 1) % self.entries.len()].0,
            None => self.default_key(),
        }
    }

    /// Key preceding `key` in table order, wrapping around.
    pub fn previous_key(&self, key: &str) -> &str {
        match self.position(key) {
            Some(i) => {
                let len = self.entries.len();
                &self.entries[(i + len - 1) % len].0
            }
            None => self.default_key(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

/// The storage-chain and currency tables used by the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    pub storage_chains: ReferenceTable<StorageChain>,
    pub currencies: ReferenceTable<Currency>,
}

#[derive(Deserialize)]
struct Keyed<T> {
    key: String,
    #[serde(flatten)]
    entry: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceFile {
    storage_chains: Vec<Keyed<StorageChain>>,
    currencies: Vec<Keyed<Currency>>,
}

impl ReferenceData {
    /// Parses reference data from the JSON override format:
    ///
    /// ```json
    /// { "storageChains": [{ "key": "100", "name": "Gnosis", "type": "mainnet", "gateway": "..." }],
    ///   "currencies": [{ "key": "...", "symbol": "USDC", "type": "ERC20", "value": "0x..", "network": "xdai", "decimals": 6 }] }
    /// ```
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let file: ReferenceFile = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidReferenceData(e.to_string()))?;
        let storage_chains = ReferenceTable::new(
            file.storage_chains.into_iter().map(|k| (k.key, k.entry)).collect(),
        )?;
        let currencies = ReferenceTable::new(
            file.currencies.into_iter().map(|k| (k.key, k.entry)).collect(),
        )?;
        Ok(Self { storage_chains, currencies })
    }

    pub fn currency(&self, key: &str) -> DomainResult<&Currency> {
        self.currencies
            .lookup(key)
            .ok_or_else(|| DomainError::UnknownCurrency(key.to_string()))
    }

    pub fn storage_chain(&self, key: &str) -> DomainResult<&StorageChain> {
        self.storage_chains
            .lookup(key)
            .ok_or_else(|| DomainError::UnknownStorageChain(key.to_string()))
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            storage_chains: ReferenceTable {
                entries: vec![
                    storage_chain("100", "Gnosis", NetworkType::Mainnet, "https://xdai.gateway.request.network/"),
                    storage_chain("11155111", "Sepolia", NetworkType::Testnet, "https://sepolia.gateway.request.network/"),
                ],
            },
            currencies: ReferenceTable {
                entries: vec![
                    erc20("FAU", "0x370DE27fdb7D1Ff1e1BaA7D11c5820a324Cf623C", "sepolia", 18),
                    erc20("USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "mainnet", 6),
                    erc20("USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7", "mainnet", 6),
                    erc20("DAI", "0x6B175474E89094C44Da98b954EedeAC495271d0F", "mainnet", 18),
                    erc20("USDC", "0xDDAfbb505ad214D7b80b1f830fcCc89B60fb7A83", "xdai", 6),
                    erc20("USDC", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "matic", 6),
                    erc20("USDC", "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85", "optimism", 6),
                    erc20("USDC", "0xaf88d065e77c8cC2239327C5EDb3A432268e5831", "arbitrum-one", 6),
                ],
            },
        }
    }
}

fn storage_chain(key: &str, name: &str, network_type: NetworkType, gateway: &str) -> (String, StorageChain) {
    (
        key.to_string(),
        StorageChain {
            name: name.to_string(),
            network_type,
            gateway: gateway.to_string(),
        },
    )
}

fn erc20(symbol: &str, address: &str, network: &str, decimals: u32) -> (String, Currency) {
    (
        format!("{}_{}", network, address),
        Currency {
            symbol: symbol.to_string(),
            currency_type: CurrencyType::Erc20,
            value: address.to_string(),
            network: network.to_string(),
            decimals,
        },
    )
}
