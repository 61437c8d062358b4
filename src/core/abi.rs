//! Minimal ABI helpers for the handful of ERC-20 calls the EVM adapter makes.
//! Hand-encoding three fixed-shape functions is simpler than carrying a full
//! contract binding for them.

use anyhow::Result;
use ethers::types::U256;
use sha3::{Digest, Keccak256};

/// Compute the 4-byte function selector from a signature string,
/// e.g. "transfer(address,uint256)".
pub fn selector_from_signature(signature: &str) -> [u8; 4] {
    let mut keccak = Keccak256::new();
    keccak.update(signature.as_bytes());
    let out = keccak.finalize();
    [out[0], out[1], out[2], out[3]]
}

/// Encode a 20-byte address (hex, with or without 0x) into a left-padded
/// 32-byte ABI word.
pub fn abi_word_address(addr_hex: &str) -> Result<[u8; 32]> {
    let addr = addr_hex.strip_prefix("0x").unwrap_or(addr_hex);
    if addr.len() != 40 || !addr.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow::anyhow!("Invalid EVM address hex"));
    }
    let mut out = [0u8; 32];
    for i in 0..20 {
        out[12 + i] = u8::from_str_radix(&addr[2 * i..2 * i + 2], 16)
            .map_err(|_| anyhow::anyhow!("Invalid hex in address"))?;
    }
    Ok(out)
}

/// Encode a U256 into a 32-byte big-endian ABI word.
pub fn abi_word_uint256(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Pack a selector and ABI words contiguously into calldata.
pub fn abi_pack(selector: [u8; 4], words: &[[u8; 32]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 32 * words.len());
    out.extend_from_slice(&selector);
    for w in words {
        out.extend_from_slice(w);
    }
    out
}

/// Decode a single uint256 return word.
pub fn decode_uint256(data: &[u8]) -> Result<U256> {
    if data.len() < 32 {
        return Err(anyhow::anyhow!("Return data too short for uint256: {} bytes", data.len()));
    }
    Ok(U256::from_big_endian(&data[..32]))
}

/// Decode a uint8 return value (ABI-encoded as a full word, e.g. decimals()).
pub fn decode_uint8(data: &[u8]) -> Result<u8> {
    let value = decode_uint256(data)?;
    if value > U256::from(u8::MAX) {
        return Err(anyhow::anyhow!("Return value out of range for uint8"));
    }
    Ok(value.as_u32() as u8)
}
