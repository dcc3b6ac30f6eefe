// Debt Ledger - Core Library
// Exposes all modules for use in the CLI, the web server, and tests

pub mod money;
pub mod roster;
pub mod store;
pub mod balance;
pub mod telemetry;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use balance::{balances, owed_totals, summarize, Summary};
pub use money::{Money, MoneyParseError};
pub use roster::{Party, PartyId, Roster};
pub use store::{migrate_legacy, DebtEntry, LedgerError, LedgerStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
