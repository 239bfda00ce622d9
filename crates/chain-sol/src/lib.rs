//! Solana chain support for the wallet.
//!
//! Address and keypair encoding, lamport units, the System Program transfer
//! wire format and a small JSON-RPC client. Transactions are serialized by
//! hand with `ed25519-dalek` for signing and `bs58` for Base58 encoding,
//! rather than through `solana-sdk`.

pub mod address;
pub mod error;
pub mod keypair;
pub mod rpc;
pub mod transaction;
pub mod units;

pub use address::{address_to_bytes, bytes_to_address, validate_address};
pub use error::SolError;
pub use keypair::SolKeypair;
pub use rpc::{
    Commitment, RpcClient, SignatureStatus, DEFAULT_REQUEST_TIMEOUT, DEVNET_URL, MAINNET_URL,
    TESTNET_URL,
};
pub use transaction::{
    encode_compact_u16, sign_transfer, SignedTransfer, TransferMessage, SYSTEM_PROGRAM_ID,
};
pub use units::{lamports_to_sol, sol_to_lamports, LAMPORTS_PER_SOL};
