// Customer Ledger - Core Library
// Exposes all modules for use in the console binary and tests

pub mod activity;    // Activity log - audit events + tracing
pub mod config;      // Application settings
pub mod console;     // Line-based prompts
pub mod entities;    // Customer / Contract models
pub mod error;       // Core error kinds
pub mod matching;    // Fuzzy token matching
pub mod persistence; // JSON snapshots + merge
pub mod range_query; // Date / money range filters
pub mod repository;  // Customer repository
pub mod selection;   // Candidate resolution
pub mod ui;          // Text menus

// Re-export commonly used types
pub use activity::{ActivityEvent, ActivityLog};
pub use config::AppConfig;
pub use entities::{
    Contract, ContractDate, ContractId, ContractRecord,
    Customer, CustomerId, PersonName,
};
pub use error::{CrmError, CrmResult};
pub use matching::{FuzzyMatcher, Searchable};
pub use persistence::{
    load_and_merge, load_from_path, merge, save_to_path,
    MergeReport, Snapshot,
};
pub use range_query::{DateRange, MoneyRange, RangeQuery};
pub use repository::CustomerRepository;
pub use selection::{resolve, Choice, Disambiguation, Mode, Outcome, Resolution};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
