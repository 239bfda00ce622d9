//! System Program transfer transactions in Solana's legacy wire format.
//!
//! Only the one transaction shape the wallet sends is supported: a single
//! `Transfer` instruction paid for and signed by the sender.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16 (always 1)
//!   signature               64 bytes
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16 (always 1)
//!     program_id_index      u8
//!     num_accounts          compact-u16
//!     account_indices       u8 * num_accounts
//!     data_len              compact-u16
//!     data                  u32 LE (2 = Transfer) || u64 LE lamports
//! ```

use crate::error::SolError;
use crate::keypair::SolKeypair;

/// The System Program public key: 32 zero bytes.
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// System Program `Transfer` instruction discriminant.
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;

/// Encode a `u16` in Solana's compact-u16 (7 bits per byte, LEB128-style).
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);
    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            return out;
        }
    }
}

/// An unsigned native SOL transfer, compiled to account indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMessage {
    /// Writable signer (sender) first, then the writable recipient (absent
    /// on a self-transfer), then the read-only System Program.
    pub account_keys: Vec<[u8; 32]>,
    pub recent_blockhash: [u8; 32],
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

impl TransferMessage {
    /// Compile a transfer of `lamports` from `from` to `to`.
    pub fn new(
        from: &[u8; 32],
        to: &[u8; 32],
        lamports: u64,
        recent_blockhash: &[u8; 32],
    ) -> Result<Self, SolError> {
        if lamports == 0 {
            return Err(SolError::TransactionBuildError("lamports must be > 0".into()));
        }
        if *from == SYSTEM_PROGRAM_ID || *to == SYSTEM_PROGRAM_ID {
            return Err(SolError::TransactionBuildError(
                "the system program cannot send or receive a transfer".into(),
            ));
        }

        let (account_keys, account_indices) = if from == to {
            (vec![*from, SYSTEM_PROGRAM_ID], vec![0, 0])
        } else {
            (vec![*from, *to, SYSTEM_PROGRAM_ID], vec![0, 1])
        };
        let program_id_index = (account_keys.len() - 1) as u8;

        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
        data.extend_from_slice(&lamports.to_le_bytes());

        Ok(Self {
            account_keys,
            recent_blockhash: *recent_blockhash,
            program_id_index,
            account_indices,
            data,
        })
    }

    /// Serialize the message (the bytes covered by the signature).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(160);

        // Header: one signer, no read-only signers, the program is read-only.
        buf.push(1);
        buf.push(0);
        buf.push(1);

        buf.extend_from_slice(&encode_compact_u16(self.account_keys.len() as u16));
        for key in &self.account_keys {
            buf.extend_from_slice(key);
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&encode_compact_u16(1));
        buf.push(self.program_id_index);
        buf.extend_from_slice(&encode_compact_u16(self.account_indices.len() as u16));
        buf.extend_from_slice(&self.account_indices);
        buf.extend_from_slice(&encode_compact_u16(self.data.len() as u16));
        buf.extend_from_slice(&self.data);

        buf
    }
}

/// A signed transfer ready for `sendTransaction`.
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    pub wire: Vec<u8>,
    pub signature: [u8; 64],
}

impl SignedTransfer {
    /// Base58 signature, which is also the transaction id on chain.
    pub fn signature_b58(&self) -> String {
        bs58::encode(self.signature).into_string()
    }
}

/// Build and sign a native SOL transfer from `sender` to `to`.
pub fn sign_transfer(
    sender: &SolKeypair,
    to: &[u8; 32],
    lamports: u64,
    recent_blockhash: &[u8; 32],
) -> Result<SignedTransfer, SolError> {
    let message = TransferMessage::new(sender.public_key(), to, lamports, recent_blockhash)?;
    let message_bytes = message.serialize();
    let signature = sender.sign(&message_bytes);

    let mut wire = Vec::with_capacity(1 + 64 + message_bytes.len());
    wire.extend_from_slice(&encode_compact_u16(1));
    wire.extend_from_slice(&signature);
    wire.extend_from_slice(&message_bytes);

    Ok(SignedTransfer { wire, signature })
}
