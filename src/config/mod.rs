pub mod settings;

pub use settings::{AppConfig, CatalogSettings, LedgerSettings};
