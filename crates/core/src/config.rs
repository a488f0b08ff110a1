//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services by `Arc`. The intent is to avoid reading process-wide
//! environment variables during request handling, which can lead to
//! inconsistent behaviour in multi-threaded runtimes and test harnesses.

use crate::error::{StoreError, StoreResult};
use std::path::{Path, PathBuf};

/// Default directory name holding the CSV datasets.
pub const DATASET_DIR: &str = "datasets";
/// Remedy dataset file name within the dataset directory.
pub const REMEDY_DATASET_FILE: &str = "diseases.csv";
/// Plants catalog file name within the dataset directory.
pub const PLANT_CATALOG_FILE: &str = "plants.csv";
/// Products catalog file name within the dataset directory.
pub const PRODUCT_CATALOG_FILE: &str = "products.csv";

/// Merchant identity used for UPI payment intents.
#[derive(Clone, Debug)]
pub struct MerchantConfig {
    payee_id: String,
    name: String,
    currency: String,
}

impl MerchantConfig {
    /// Create a new `MerchantConfig`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if the payee id is empty or has no
    /// `@` handle separator, or if the merchant name or currency code is
    /// empty.
    pub fn new(payee_id: String, name: String, currency: String) -> StoreResult<Self> {
        if payee_id.trim().is_empty() || !payee_id.contains('@') {
            return Err(StoreError::InvalidInput(
                "UPI payee id must be of the form name@bank".into(),
            ));
        }
        if name.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "merchant name cannot be empty".into(),
            ));
        }
        if currency.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "currency code cannot be empty".into(),
            ));
        }
        Ok(Self {
            payee_id,
            name,
            currency,
        })
    }

    pub fn payee_id(&self) -> &str {
        &self.payee_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    dataset_dir: PathBuf,
    order_data_dir: PathBuf,
    merchant: MerchantConfig,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if the dataset directory does not
    /// contain the expected dataset files.
    pub fn new(
        dataset_dir: PathBuf,
        order_data_dir: PathBuf,
        merchant: MerchantConfig,
    ) -> StoreResult<Self> {
        for file in [REMEDY_DATASET_FILE, PLANT_CATALOG_FILE, PRODUCT_CATALOG_FILE] {
            if !dataset_dir.join(file).is_file() {
                return Err(StoreError::InvalidInput(format!(
                    "dataset directory {} is missing {}",
                    dataset_dir.display(),
                    file
                )));
            }
        }

        Ok(Self {
            dataset_dir,
            order_data_dir,
            merchant,
        })
    }

    pub fn dataset_dir(&self) -> &Path {
        &self.dataset_dir
    }

    pub fn remedy_dataset_path(&self) -> PathBuf {
        self.dataset_dir.join(REMEDY_DATASET_FILE)
    }

    pub fn plant_catalog_path(&self) -> PathBuf {
        self.dataset_dir.join(PLANT_CATALOG_FILE)
    }

    pub fn product_catalog_path(&self) -> PathBuf {
        self.dataset_dir.join(PRODUCT_CATALOG_FILE)
    }

    /// Directory where the filesystem order sink writes order documents.
    pub fn order_data_dir(&self) -> &Path {
        &self.order_data_dir
    }

    pub fn merchant(&self) -> &MerchantConfig {
        &self.merchant
    }
}

/// Resolve the dataset directory without reading environment variables.
///
/// If `override_dir` is provided, it must be a directory containing the
/// expected dataset files. Otherwise this searches for `datasets/` relative
/// to the current working directory and then walks up from
/// `CARGO_MANIFEST_DIR`.
pub fn resolve_dataset_dir(override_dir: Option<PathBuf>) -> StoreResult<PathBuf> {
    fn looks_like_dataset_dir(path: &Path) -> bool {
        path.join(REMEDY_DATASET_FILE).is_file()
    }

    if let Some(dataset_dir) = override_dir {
        if dataset_dir.is_dir() && looks_like_dataset_dir(&dataset_dir) {
            return Ok(dataset_dir);
        }
        return Err(StoreError::InvalidInput(format!(
            "dataset directory override is not valid (must contain {REMEDY_DATASET_FILE})"
        )));
    }

    let cwd_relative = PathBuf::from(DATASET_DIR);
    if cwd_relative.is_dir() && looks_like_dataset_dir(&cwd_relative) {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DATASET_DIR);
        if candidate.is_dir() && looks_like_dataset_dir(&candidate) {
            return Ok(candidate);
        }
    }

    Err(StoreError::InvalidInput(format!(
        "could not locate {DATASET_DIR}/ directory with {REMEDY_DATASET_FILE}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn merchant() -> MerchantConfig {
        MerchantConfig::new(
            "shop@oksbi".to_owned(),
            "HerbalShop".to_owned(),
            "INR".to_owned(),
        )
        .unwrap()
    }

    #[test]
    fn test_merchant_rejects_bad_payee() {
        assert!(MerchantConfig::new(
            "no-handle".to_owned(),
            "Shop".to_owned(),
            "INR".to_owned()
        )
        .is_err());
        assert!(
            MerchantConfig::new("".to_owned(), "Shop".to_owned(), "INR".to_owned()).is_err()
        );
    }

    #[test]
    fn test_config_requires_dataset_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = CoreConfig::new(
            dir.path().to_path_buf(),
            dir.path().join("orders"),
            merchant(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_config_accepts_complete_dataset_dir() {
        let dir = tempfile::tempdir().unwrap();
        for file in [REMEDY_DATASET_FILE, PLANT_CATALOG_FILE, PRODUCT_CATALOG_FILE] {
            fs::write(dir.path().join(file), "header\n").unwrap();
        }
        let cfg = CoreConfig::new(
            dir.path().to_path_buf(),
            dir.path().join("orders"),
            merchant(),
        )
        .unwrap();
        assert_eq!(cfg.remedy_dataset_path(), dir.path().join("diseases.csv"));
    }

    #[test]
    fn test_resolve_rejects_invalid_override() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_dataset_dir(Some(dir.path().to_path_buf())).is_err());
    }
}
