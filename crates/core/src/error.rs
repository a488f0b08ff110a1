//! Error taxonomy for the storefront core.
//!
//! Every rejected operation returns a discriminated variant the caller can
//! render; nothing is logged-and-swallowed inside the core and no error is
//! fatal to the process. Load-time failures (`Dataset*`) reject the whole
//! batch so the in-memory lists stay consistent; submit-time failures
//! (`Order*`) leave cart and form state untouched so resubmission is
//! possible without re-entry.

use crate::catalog::ProductId;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    // -- user input ------------------------------------------------------
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("at least one symptom is required")]
    EmptySymptomQuery,
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    // -- business rules --------------------------------------------------
    #[error("product '{0}' is not in the catalog")]
    UnknownProduct(ProductId),
    #[error("product '{0}' is out of stock")]
    OutOfStock(ProductId),
    #[error("insufficient stock for product '{id}': requested {requested}, available {available}")]
    InsufficientStock {
        id: ProductId,
        requested: u32,
        available: u32,
    },
    #[error("cart is empty")]
    EmptyCart,
    #[error("operation requires state {expected}, session is {actual}")]
    WrongState {
        expected: &'static str,
        actual: &'static str,
    },

    // -- dataset loading -------------------------------------------------
    #[error("failed to read dataset {path}: {source}", path = path.display())]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("dataset {path} is missing required column '{column}'", path = path.display())]
    DatasetMissingColumn { path: PathBuf, column: &'static str },
    #[error("dataset {path} line {line}: {reason}", path = path.display())]
    DatasetRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("dataset {path} contains no rows", path = path.display())]
    DatasetEmpty { path: PathBuf },

    // -- order persistence ----------------------------------------------
    #[error("failed to create order directory: {0}")]
    OrderDirCreation(std::io::Error),
    #[error("failed to serialize order: {0}")]
    OrderSerialization(serde_json::Error),
    #[error("failed to write order document: {0}")]
    OrderWrite(std::io::Error),
    #[error("order sink rejected the order: {0}")]
    OrderSink(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// True for submit-time persistence failures, after which the session
    /// preserves cart and form state for resubmission.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            StoreError::OrderDirCreation(_)
                | StoreError::OrderSerialization(_)
                | StoreError::OrderWrite(_)
                | StoreError::OrderSink(_)
        )
    }

    /// True for load-time dataset failures, surfaced page-level and not
    /// recoverable without an external fix.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::DatasetRead { .. }
                | StoreError::DatasetMissingColumn { .. }
                | StoreError::DatasetRow { .. }
                | StoreError::DatasetEmpty { .. }
        )
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
