pub mod ckan;
pub mod models;
pub mod spatial;

pub use ckan::CkanClient;
pub use models::{Dataset, Extra, Extras};

use crate::errors::CatalogError;

/// Read/write access to dataset metadata documents held by the catalog
pub trait CatalogClient {
    fn fetch_dataset(&self, dataset_id: &str) -> Result<Dataset, CatalogError>;

    /// Full-document replace. Returns the catalog's resulting view of the dataset.
    fn update_dataset(&self, dataset: &Dataset) -> Result<Dataset, CatalogError>;
}
