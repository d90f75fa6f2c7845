//! # edgar13f - SEC EDGAR filings and 13F holdings
//!
//! edgar13f splits EDGAR full submission text files into their header and documents, and
//! extracts the filer metadata and holdings table from Form 13F-HR reports. Both layouts of
//! the holdings table are supported:
//!
//! - the XML information table filed since 2013
//! - the fixed-width text table typed into older reports
//!
//! With the default `filings` and `index` features it also retrieves filings from the SEC
//! archives through a rate-limited client that respects SEC.gov fair access rules.
//!
//! ## Parsing a filing
//!
//! ```ignore
//! use edgar13f::Filing13F;
//!
//! let raw = std::fs::read_to_string("0000002230-00-000003.txt")?;
//! let mut filing = Filing13F::new(&raw);
//! filing.process();
//! println!("{:?}", filing.metadata().manager_name);
//! for holding in filing.holdings() {
//!     println!("{} {} {} {}", holding.cusip, holding.name_of_issuer, holding.value, holding.number);
//! }
//! ```
//!
//! ## Retrieving filings
//!
//! ```ignore
//! use edgar13f::{Edgar, EdgarDay, FilingOperations, FilingOptions, IndexOperations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let edgar = Edgar::new("YourAppName contact@example.com")?;
//!     let options = FilingOptions::new().with_form_type("13F-HR");
//!     let entries = edgar
//!         .get_daily_filings(EdgarDay::new(2019, 2, 13)?, Some(options))
//!         .await?;
//!     if let Some(entry) = entries.first() {
//!         let filing = edgar.get_13f_filing(entry.path()).await?;
//!         println!("{} holdings", filing.holdings().len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

mod config;
mod core;
mod error;
pub mod parsing;

#[cfg(feature = "index")]
mod options;

#[cfg(any(feature = "filings", feature = "index"))]
mod traits;

#[cfg(feature = "filings")]
mod filings;
#[cfg(feature = "index")]
mod index;

pub use config::{DEFAULT_RATE_LIMIT, EdgarConfig, EdgarUrls};
pub use self::core::Edgar;
pub use error::{EdgarError, Result};
pub use parsing::filing::Filing;
pub use parsing::index::IndexEntry;
pub use parsing::thirteenf::{
    Address, FORM_TYPES, FilerMetadata, Filing13F, Holding, HoldingsSource, TableConfig,
    extract_holdings, extract_metadata,
};

#[cfg(feature = "index")]
pub use index::{
    Directory, DirectoryItem, EdgarDay, EdgarPeriod, FIRST_INDEX_YEAR, IndexResponse, ItemType,
    Quarter,
};
#[cfg(feature = "index")]
pub use options::FilingOptions;

#[cfg(feature = "filings")]
pub use traits::FilingOperations;
#[cfg(feature = "index")]
pub use traits::IndexOperations;

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
