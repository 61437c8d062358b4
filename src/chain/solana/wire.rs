//! Solana legacy transaction wire format, serialized by hand.
//!
//! A single system-program transfer is the only shape this client ever
//! broadcasts, so the compact binary encoding is implemented directly with
//! `bs58`/`base64` instead of pulling in the full SDK.

use anyhow::Result;

/// The system program id (all-zero public key).
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// System program instruction index for `Transfer`.
const TRANSFER_INSTRUCTION_INDEX: u32 = 2;

/// Encodes a length using Solana's compact-u16 ("shortvec") encoding:
/// 7 bits per byte, low byte first, high bit as continuation flag.
pub fn encode_compact_u16(mut value: u16, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decodes a base58 public key into its 32 raw bytes.
pub fn pubkey_bytes(address: &str) -> Result<[u8; 32]> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| anyhow::anyhow!("Invalid base58 public key '{}': {}", address, e))?;
    let bytes: [u8; 32] = decoded
        .try_into()
        .map_err(|_| anyhow::anyhow!("Public key '{}' is not 32 bytes", address))?;
    Ok(bytes)
}

/// Builds the message bytes for a single system transfer of `lamports` from
/// `from` to `to`, anchored to `recent_blockhash`.
///
/// Account keys are deduplicated the way the reference transaction compiler
/// does: when the recipient or the program id collides with an earlier key,
/// the earlier (more privileged) slot is reused. The vault on this bridge is
/// the system program id itself, so that path is exercised in practice.
pub fn build_transfer_message(
    from: &[u8; 32],
    to: &[u8; 32],
    lamports: u64,
    recent_blockhash: &[u8; 32],
) -> Vec<u8> {
    // Ordered unique account keys: payer first (signer, writable), then the
    // writable recipient, then the readonly program id.
    let mut keys: Vec<[u8; 32]> = vec![*from];
    if to != from {
        keys.push(*to);
    }
    let program_in_own_slot = !keys.contains(&SYSTEM_PROGRAM_ID);
    if program_in_own_slot {
        keys.push(SYSTEM_PROGRAM_ID);
    }

    let index_of = |key: &[u8; 32]| -> u8 {
        keys.iter().position(|k| k == key).expect("key compiled above") as u8
    };
    let num_readonly_unsigned: u8 = if program_in_own_slot { 1 } else { 0 };

    let mut message = Vec::with_capacity(3 + 1 + keys.len() * 32 + 32 + 16);

    // Header: one required signature, no readonly signed accounts.
    message.push(1);
    message.push(0);
    message.push(num_readonly_unsigned);

    encode_compact_u16(keys.len() as u16, &mut message);
    for key in &keys {
        message.extend_from_slice(key);
    }

    message.extend_from_slice(recent_blockhash);

    // One instruction: system transfer.
    encode_compact_u16(1, &mut message);
    message.push(index_of(&SYSTEM_PROGRAM_ID));
    encode_compact_u16(2, &mut message);
    message.push(index_of(from));
    message.push(index_of(to));

    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&TRANSFER_INSTRUCTION_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    encode_compact_u16(data.len() as u16, &mut message);
    message.extend_from_slice(&data);

    message
}

/// Assembles a signed wire transaction from one signature and the message.
pub fn assemble_transaction(signature: &[u8; 64], message: &[u8]) -> Vec<u8> {
    let mut tx = Vec::with_capacity(1 + 64 + message.len());
    encode_compact_u16(1, &mut tx);
    tx.extend_from_slice(signature);
    tx.extend_from_slice(message);
    tx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(value: u16) -> Vec<u8> {
        let mut out = Vec::new();
        encode_compact_u16(value, &mut out);
        out
    }

    #[test]
    fn test_compact_u16_edges() {
        assert_eq!(compact(0), vec![0x00]);
        assert_eq!(compact(1), vec![0x01]);
        assert_eq!(compact(127), vec![0x7f]);
        assert_eq!(compact(128), vec![0x80, 0x01]);
        assert_eq!(compact(16383), vec![0xff, 0x7f]);
        assert_eq!(compact(16384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn test_pubkey_bytes() {
        assert_eq!(pubkey_bytes("11111111111111111111111111111111").unwrap(), [0u8; 32]);
        assert!(pubkey_bytes("not-base58!").is_err());
        assert!(pubkey_bytes("abc").is_err());
    }

    #[test]
    fn test_transfer_message_layout_distinct_keys() {
        let from = [1u8; 32];
        let to = [2u8; 32];
        let blockhash = [3u8; 32];
        let message = build_transfer_message(&from, &to, 1_000_000_000, &blockhash);

        // Header: 1 signature, 0 readonly signed, 1 readonly unsigned.
        assert_eq!(&message[..3], &[1, 0, 1]);
        // Three account keys: payer, recipient, system program.
        assert_eq!(message[3], 3);
        assert_eq!(&message[4..36], &from);
        assert_eq!(&message[36..68], &to);
        assert_eq!(&message[68..100], &SYSTEM_PROGRAM_ID);
        assert_eq!(&message[100..132], &blockhash);
        // One instruction against key index 2 with accounts [0, 1].
        assert_eq!(&message[132..137], &[1, 2, 2, 0, 1]);
        // 12-byte data: u32 LE index 2, u64 LE lamports.
        assert_eq!(message[137], 12);
        assert_eq!(&message[138..142], &2u32.to_le_bytes());
        assert_eq!(&message[142..150], &1_000_000_000u64.to_le_bytes());
        assert_eq!(message.len(), 150);
    }

    #[test]
    fn test_transfer_message_vault_is_system_program() {
        // Sending to the system program id (the SOL vault) merges the
        // recipient and program slots.
        let from = [1u8; 32];
        let message = build_transfer_message(&from, &SYSTEM_PROGRAM_ID, 42, &[9u8; 32]);

        // No readonly unsigned slot: the shared key stays writable.
        assert_eq!(&message[..3], &[1, 0, 0]);
        // Two unique keys only.
        assert_eq!(message[3], 2);
        assert_eq!(&message[4..36], &from);
        assert_eq!(&message[36..68], &SYSTEM_PROGRAM_ID);
        // Program id index and recipient index both point at slot 1.
        assert_eq!(&message[100..105], &[1, 1, 2, 0, 1]);
    }

    #[test]
    fn test_assemble_transaction() {
        let message = build_transfer_message(&[1u8; 32], &[2u8; 32], 7, &[0u8; 32]);
        let signature = [5u8; 64];
        let tx = assemble_transaction(&signature, &message);
        assert_eq!(tx[0], 1);
        assert_eq!(&tx[1..65], &signature);
        assert_eq!(&tx[65..], &message[..]);
    }
}
