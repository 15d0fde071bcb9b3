pub mod catalog;
pub mod config;
pub mod correlation;
pub mod extractor;
pub mod places;
pub mod reporter;
pub mod scanner;
pub mod tax;

pub use catalog::{Catalog, ProductKind, ProductRecord, RiskTier};
pub use config::Config;
pub use correlation::{CorrelationEngine, DeathEvent, DEFAULT_WINDOW_DAYS};
pub use extractor::{Extraction, LocationPoint, TakeoutExtractor};
pub use reporter::Reporter;
pub use scanner::{FolderScanner, FolderStatus, ScanError, ScanResult};
pub use tax::{TaxCalculator, TaxReport, DEFAULT_HOURLY_RATE};

pub type Result<T> = anyhow::Result<T>;
