//! Core constants for the Sui DAO financing platform
//! These match the values used by the deployed Move package and the dashboard

/// SUI/MIST conversion factor (1 SUI = 1_000_000_000 MIST)
pub const MIST_PER_SUI: u128 = 1_000_000_000;

/// Compile-time assertion that MIST_PER_SUI is exactly 1e9
#[allow(dead_code)]
const _: () = assert!(
    MIST_PER_SUI == 10u128.pow(9),
    "MIST_PER_SUI must be exactly 1_000_000_000 (1e9)"
);

/// Number of decimal places between MIST and SUI
pub const SUI_DECIMALS: usize = 9;

/// Maximum number of fraction digits shown when formatting SUI amounts
pub const DISPLAY_FRACTION_DIGITS: u32 = 2;

/// Currency symbol
pub const SUI_SYMBOL: &str = "SUI";

/// Network names
pub const NETWORK_MAINNET: &str = "mainnet";
pub const NETWORK_TESTNET: &str = "testnet";
pub const NETWORK_DEVNET: &str = "devnet";

/// Fullnode JSON-RPC endpoints
pub const MAINNET_FULLNODE: &str = "https://fullnode.mainnet.sui.io:443";
pub const TESTNET_FULLNODE: &str = "https://fullnode.testnet.sui.io:443";
pub const DEVNET_FULLNODE: &str = "https://fullnode.devnet.sui.io:443";

/// Package id of the deployed DAO Move package
pub const DEFAULT_PACKAGE_ID: &str = "0x69eb64bc9c0c7696336e56";

/// Coin type used for balance queries
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Milliseconds in one day
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Default voting window for newly created proposals (14 days)
pub const DEFAULT_PROPOSAL_DEADLINE_MS: i64 = 14 * DAY_MS;

/// Voting window used by the on-chain `create_proposal` entry function (7 days)
pub const ONCHAIN_PROPOSAL_DEADLINE_MS: i64 = 7 * DAY_MS;

/// Placeholder proposer used when no wallet is connected
pub const ANONYMOUS_PROPOSER: &str = "0xuser";

/// Addresses shorter than this are displayed untruncated
pub const ADDRESS_TRUNCATE_MIN_LEN: usize = 12;

/// Local persistence keys, one per store
pub const WALLET_STORAGE_KEY: &str = "wallet-storage";
pub const PROPOSAL_STORAGE_KEY: &str = "proposal-storage";
pub const GOVERNANCE_STORAGE_KEY: &str = "governance-storage";
pub const DAO_STORAGE_KEY: &str = "dao-storage";
pub const LANGUAGE_STORAGE_KEY: &str = "language-storage";

/// Default directory for persisted client state
pub const DEFAULT_STORAGE_DIR: &str = "~/.suidao/state";

/// Default directory for log files
pub const DEFAULT_LOGGING_DIR: &str = "~/.suidao/logs";
