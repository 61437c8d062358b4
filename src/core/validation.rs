use anyhow::Result;
use regex::Regex;
use rust_decimal::Decimal;
use sha3::{Digest, Keccak256};
use std::str::FromStr;

/// Validates an EVM address (length/hex, EIP-55 checksum when mixed-case).
pub fn validate_evm_address(address: &str) -> Result<()> {
    if !address.starts_with("0x") || address.len() != 42 {
        return Err(anyhow::anyhow!("Invalid EVM address format"));
    }
    let hex_regex =
        Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("Hardcoded regex should always compile");
    if !hex_regex.is_match(address) {
        return Err(anyhow::anyhow!("Invalid EVM address characters"));
    }
    // EIP-55: enforce checksum only for mixed-case input. All-lower or
    // all-upper is accepted for compatibility.
    let body = &address[2..];
    let is_all_lower = body.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
    let is_all_upper = body.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(());
    }
    if !is_eip55_checksum_valid(address) {
        return Err(anyhow::anyhow!("Invalid EIP-55 checksum for EVM address"));
    }
    Ok(())
}

fn is_eip55_checksum_valid(addr: &str) -> bool {
    if addr.len() != 42 || !addr.starts_with("0x") {
        return false;
    }
    let body = &addr[2..];
    let lower = body.to_lowercase();
    let mut keccak = Keccak256::new();
    keccak.update(lower.as_bytes());
    let hash = keccak.finalize();
    for (i, ch) in body.chars().enumerate() {
        let nibble = (hash[i / 2] >> (4 * (1 - (i % 2)))) & 0x0f;
        match ch {
            'a'..='f' => {
                if nibble >= 8 {
                    return false;
                }
            }
            'A'..='F' => {
                if nibble < 8 {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Validates a Solana address (base58-encoded 32-byte public key).
pub fn validate_solana_address(address: &str) -> Result<()> {
    if address.len() < 32 || address.len() > 44 {
        return Err(anyhow::anyhow!("Invalid Solana address length"));
    }
    match bs58::decode(address).into_vec() {
        Ok(decoded) => {
            if decoded.len() != 32 {
                return Err(anyhow::anyhow!("Solana address must decode to 32 bytes"));
            }
        }
        Err(_) => return Err(anyhow::anyhow!("Invalid base58 encoding in Solana address")),
    }
    Ok(())
}

/// Strict decimal validator for user-entered amounts.
/// Accepts patterns like 123, 0.1, 1.234567 up to `max_decimals` decimals.
/// No leading '+', no exponent, must be positive.
pub fn validate_amount_strict(amount: &str, max_decimals: usize) -> Result<()> {
    if amount.is_empty() {
        return Err(anyhow::anyhow!("Amount cannot be empty"));
    }
    let re = Regex::new(&format!(r"^(?:0|[1-9]\d*)(?:\.(\d{{1,{}}}))?$", max_decimals))
        .expect("Decimal regex pattern should always be valid");
    if !re.is_match(amount) {
        return Err(anyhow::anyhow!("Invalid decimal amount"));
    }
    // disallow 0 or 0.0... values
    if amount.trim_matches('0').trim_matches('.').is_empty() {
        return Err(anyhow::anyhow!("Amount must be positive"));
    }
    Ok(())
}

/// Parses a user-entered amount into a positive `Decimal`.
pub fn parse_amount(amount: &str) -> Result<Decimal> {
    let value = Decimal::from_str(amount.trim())
        .map_err(|_| anyhow::anyhow!("Invalid amount format: '{}'", amount))?;
    if value <= Decimal::ZERO {
        return Err(anyhow::anyhow!("Amount must be positive"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_evm_address_valid() {
        assert!(validate_evm_address("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913").is_ok());
        assert!(validate_evm_address("0x000000000000000000000000000000000000dead").is_ok());
    }

    #[test]
    fn test_validate_evm_address_invalid_length() {
        assert!(validate_evm_address("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA0291").is_err());
    }

    #[test]
    fn test_validate_evm_address_invalid_chars() {
        assert!(validate_evm_address("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA0291g").is_err());
    }

    #[test]
    fn test_validate_evm_address_bad_checksum() {
        // Mixed case with the checksum casing broken on the first letter.
        assert!(validate_evm_address("0x833589FCD6eDb6E08f4c7C32D4f71b54bdA02913").is_err());
    }

    #[test]
    fn test_validate_solana_address() {
        assert!(validate_solana_address("11111111111111111111111111111111").is_ok());
        assert!(validate_solana_address("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v").is_ok());
        assert!(validate_solana_address("not-base58!").is_err());
        assert!(validate_solana_address("abc").is_err());
    }

    #[test]
    fn strict_amount_basic_edges() {
        // Valid
        assert!(validate_amount_strict("1", 18).is_ok());
        assert!(validate_amount_strict("0.1", 18).is_ok());
        assert!(validate_amount_strict("1.000000000000000000", 18).is_ok());
        // Invalid
        assert!(validate_amount_strict("", 18).is_err());
        assert!(validate_amount_strict("+1", 18).is_err());
        assert!(validate_amount_strict("1.", 18).is_err());
        assert!(validate_amount_strict("01", 18).is_err());
        assert!(validate_amount_strict("0", 18).is_err());
        assert!(validate_amount_strict("0.000000000000000000", 18).is_err());
        assert!(validate_amount_strict("1e-3", 18).is_err());
        assert!(validate_amount_strict(".1", 18).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.5").unwrap(), Decimal::new(15, 1));
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("abc").is_err());
    }
}
