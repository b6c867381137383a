pub mod client;
pub mod wallet;

// Re-exports for convenience
pub use client::{ClientError, DividendSource, SubtensorClient};
pub use wallet::{RpcWallet, TxReceipt, Wallet, WalletError};
