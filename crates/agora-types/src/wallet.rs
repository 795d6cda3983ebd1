use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypeError;

/// EVM-style wallet address (`0x` + 40 hex characters).
///
/// Addresses are normalized to lowercase on construction so index lookups
/// are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(address: &str) -> Result<Self, TypeError> {
        let trimmed = address.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| TypeError::InvalidWallet(trimmed.to_string()))?;

        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidWallet(trimmed.to_string()));
        }

        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for logging, e.g. `0x1234..abcd`.
    pub fn short(&self) -> String {
        format!("{}..{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WalletAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case() {
        let upper = WalletAddress::new("0xABCDEF0123456789abcdef0123456789ABCDEF01").unwrap();
        let lower = WalletAddress::new("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(WalletAddress::new("abcdef").is_err());
        assert!(WalletAddress::new("0x1234").is_err());
        assert!(WalletAddress::new("0xzzzzzz0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn test_short_form() {
        let addr = WalletAddress::new("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(addr.short(), "0xabcd..ef01");
    }
}
