//! Cache key derivation for dividend lookups

use std::fmt;

/// A structured cache key that can be converted to a string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Dividend for one hotkey on one subnet
    Hotkey { netuid: u16, hotkey: String },
    /// Dividends for every hotkey on one subnet
    Subnet(u16),
    /// No subnet given; a lone hotkey degenerates to this key too
    All,
}

impl CacheKey {
    /// Derive the key for a dividend query
    pub fn dividend(netuid: Option<u16>, hotkey: Option<&str>) -> Self {
        match (netuid, hotkey) {
            (Some(netuid), Some(hotkey)) => Self::Hotkey {
                netuid,
                hotkey: hotkey.to_string(),
            },
            (Some(netuid), None) => Self::Subnet(netuid),
            (None, _) => Self::All,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hotkey { netuid, hotkey } => write!(f, "dividend:{}:{}", netuid, hotkey),
            Self::Subnet(netuid) => write!(f, "dividend:{}:all", netuid),
            Self::All => write!(f, "dividend:all"),
        }
    }
}
