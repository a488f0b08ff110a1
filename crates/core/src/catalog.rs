//! Product catalog types and strict CSV loading.
//!
//! The catalog is loaded once at startup from static CSV datasets and held
//! in memory; products are immutable from the cart's perspective except that
//! `stock` caps quantities at add/update time.
//!
//! Loading is all-or-nothing: a malformed row fails the whole batch with its
//! line number instead of being patched up with defaults. This keeps the
//! in-memory list consistent with the source file.

use crate::error::{StoreError, StoreResult};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Identity of a product, unique within the combined catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which catalog dataset to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Medicinal plants sold as live stock.
    Plants,
    /// Prepared herbal products.
    Products,
}

impl FromStr for CatalogKind {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plants" => Ok(CatalogKind::Plants),
            "products" => Ok(CatalogKind::Products),
            other => Err(StoreError::InvalidInput(format!(
                "unknown catalog kind '{other}' (expected 'plants' or 'products')"
            ))),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKind::Plants => write!(f, "plants"),
            CatalogKind::Products => write!(f, "products"),
        }
    }
}

/// A purchasable item from one of the catalog datasets.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price; non-negative, currency-safe.
    pub price: Decimal,
    /// Available stock; caps cart quantities.
    pub stock: u32,
    pub description: String,
    pub benefits: Vec<String>,
    pub image_url: String,
    /// Only present for the plants dataset.
    pub category: Option<String>,
    /// Only present for the plants dataset.
    pub scientific_name: Option<String>,
}

/// An in-memory product list with id lookup.
///
/// Keeps dataset order for listing; `find` is O(1) via a side index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Builds a catalog from already-validated products.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if two products share an id.
    pub fn new(products: Vec<Product>) -> StoreResult<Self> {
        let mut index = HashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), pos).is_some() {
                return Err(StoreError::InvalidInput(format!(
                    "duplicate product id '{}' in catalog",
                    product.id
                )));
            }
        }
        Ok(Self { products, index })
    }

    /// Merges several catalogs into one lookup set, e.g. plants + products.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if an id appears in more than one
    /// source catalog.
    pub fn merge(catalogs: impl IntoIterator<Item = Catalog>) -> StoreResult<Self> {
        let mut all = Vec::new();
        for catalog in catalogs {
            all.extend(catalog.products);
        }
        Self::new(all)
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).map(|&pos| &self.products[pos])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Column layout of a catalog CSV file.
///
/// The two datasets carry the same product shape under different headers;
/// the plants dataset additionally has category and scientific-name columns.
struct CatalogColumns {
    id: &'static str,
    name: &'static str,
    price: &'static str,
    stock: &'static str,
    description: &'static str,
    benefits: &'static str,
    image_url: &'static str,
    category: Option<&'static str>,
    scientific_name: Option<&'static str>,
}

impl CatalogColumns {
    fn for_kind(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::Plants => CatalogColumns {
                id: "Product ID",
                name: "Product Name",
                price: "Price (USD)",
                stock: "Stock Quantity",
                description: "Description",
                benefits: "Usage",
                image_url: "Image URL",
                category: Some("Category"),
                scientific_name: Some("Scientific Name"),
            },
            CatalogKind::Products => CatalogColumns {
                id: "Id",
                name: "Name",
                price: "Price",
                stock: "Available Stock",
                description: "Description",
                benefits: "Benefits",
                image_url: "Image",
                category: None,
                scientific_name: None,
            },
        }
    }
}

/// Loads one catalog dataset from a CSV file.
///
/// # Arguments
///
/// * `path` - The CSV file to read.
/// * `kind` - Which column layout to expect.
///
/// # Errors
///
/// Returns a dataset `StoreError` if the file cannot be read, a required
/// column is missing, any row is malformed (reported with its line number),
/// or the file contains no data rows. No partial catalog is ever returned.
pub fn load_catalog(path: &Path, kind: CatalogKind) -> StoreResult<Catalog> {
    let columns = CatalogColumns::for_kind(kind);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| StoreError::DatasetRead {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| StoreError::DatasetRead {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let fields = HeaderIndex::new(path, &headers);

    let mut products = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| StoreError::DatasetRead {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = Row {
            path,
            line,
            record: &record,
            fields: &fields,
        };

        let price_text = row.required(columns.price)?;
        let price = Decimal::from_str(price_text).map_err(|_| row.malformed(columns.price))?;
        if price.is_sign_negative() {
            return Err(StoreError::DatasetRow {
                path: path.to_path_buf(),
                line,
                reason: format!("column '{}' must be non-negative", columns.price),
            });
        }
        let stock: u32 = row
            .required(columns.stock)?
            .parse()
            .map_err(|_| row.malformed(columns.stock))?;

        products.push(Product {
            id: ProductId::new(row.required(columns.id)?),
            name: row.required(columns.name)?.to_owned(),
            price,
            stock,
            description: row.required(columns.description)?.to_owned(),
            benefits: split_benefits(row.optional(columns.benefits)),
            image_url: row.optional(columns.image_url).unwrap_or_default().to_owned(),
            category: columns
                .category
                .and_then(|c| row.optional(c))
                .map(str::to_owned),
            scientific_name: columns
                .scientific_name
                .and_then(|c| row.optional(c))
                .map(str::to_owned),
        });
    }

    if products.is_empty() {
        return Err(StoreError::DatasetEmpty {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(kind = %kind, count = products.len(), "loaded catalog dataset");
    Catalog::new(products)
}

fn split_benefits(raw: Option<&str>) -> Vec<String> {
    raw.map(|text| {
        text.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

/// Maps header names to column positions for a dataset file.
pub(crate) struct HeaderIndex {
    path: PathBuf,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(path: &Path, headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.trim().to_owned(), pos))
            .collect();
        Self {
            path: path.to_path_buf(),
            positions,
        }
    }

    pub(crate) fn position(&self, column: &'static str) -> StoreResult<usize> {
        self.positions
            .get(column)
            .copied()
            .ok_or(StoreError::DatasetMissingColumn {
                path: self.path.clone(),
                column,
            })
    }
}

/// One data row under validation, with enough context for precise errors.
pub(crate) struct Row<'a> {
    pub(crate) path: &'a Path,
    pub(crate) line: u64,
    pub(crate) record: &'a csv::StringRecord,
    pub(crate) fields: &'a HeaderIndex,
}

impl Row<'_> {
    /// Returns the trimmed cell for `column`, rejecting absent or empty values.
    pub(crate) fn required(&self, column: &'static str) -> StoreResult<&str> {
        let pos = self.fields.position(column)?;
        match self.record.get(pos).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(StoreError::DatasetRow {
                path: self.path.to_path_buf(),
                line: self.line,
                reason: format!("column '{column}' is empty"),
            }),
        }
    }

    /// Returns the trimmed cell for `column` if the column exists and the
    /// cell is non-empty.
    pub(crate) fn optional(&self, column: &'static str) -> Option<&str> {
        let pos = *self.fields.positions.get(column)?;
        self.record
            .get(pos)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn malformed(&self, column: &'static str) -> StoreError {
        StoreError::DatasetRow {
            path: self.path.to_path_buf(),
            line: self.line,
            reason: format!("column '{column}' is malformed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const PRODUCTS_CSV: &str = "\
Id,Name,Description,Price,Image,Benefits,Available Stock
P1,Tulsi Drops,Concentrated tulsi extract,120.50,https://img/p1,Immunity booster; ,12
P2,Ashwagandha Powder,Root powder,240,https://img/p2,\"Stress relief, Sleep aid\",3
";

    #[test]
    fn test_load_products_dataset() {
        let file = write_csv(PRODUCTS_CSV);
        let catalog = load_catalog(file.path(), CatalogKind::Products).unwrap();

        assert_eq!(catalog.len(), 2);
        let p2 = catalog.find(&ProductId::new("P2")).unwrap();
        assert_eq!(p2.name, "Ashwagandha Powder");
        assert_eq!(p2.price, Decimal::new(240, 0));
        assert_eq!(p2.stock, 3);
        assert_eq!(p2.benefits, vec!["Stress relief", "Sleep aid"]);
        assert!(p2.category.is_none());
    }

    #[test]
    fn test_load_plants_dataset_keeps_extra_columns() {
        let csv = "\
Product ID,Product Name,Scientific Name,Category,Description,Price (USD),Image URL,Usage,Region,Stock Quantity
H1,Neem Sapling,Azadirachta indica,Tree,Young neem plant,5.00,https://img/h1,Skin care,Asia,40
";
        let file = write_csv(csv);
        let catalog = load_catalog(file.path(), CatalogKind::Plants).unwrap();

        let plant = catalog.find(&ProductId::new("H1")).unwrap();
        assert_eq!(plant.scientific_name.as_deref(), Some("Azadirachta indica"));
        assert_eq!(plant.category.as_deref(), Some("Tree"));
        assert_eq!(plant.benefits, vec!["Skin care"]);
    }

    #[test]
    fn test_malformed_price_rejects_whole_batch() {
        let csv = "\
Id,Name,Description,Price,Image,Benefits,Available Stock
P1,Good,ok,10.00,,x,1
P2,Bad,broken,ten rupees,,x,1
";
        let file = write_csv(csv);
        let err = load_catalog(file.path(), CatalogKind::Products).unwrap_err();
        match err {
            StoreError::DatasetRow { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("Price"));
            }
            other => panic!("expected DatasetRow, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let csv = "\
Id,Name,Description,Price,Image,Benefits,Available Stock
P1,Bad,broken,-1.00,,x,1
";
        let file = write_csv(csv);
        assert!(matches!(
            load_catalog(file.path(), CatalogKind::Products),
            Err(StoreError::DatasetRow { .. })
        ));
    }

    #[test]
    fn test_missing_column_reported_by_name() {
        let csv = "Id,Name,Description,Image,Benefits,Available Stock\nP1,A,d,,x,1\n";
        let file = write_csv(csv);
        match load_catalog(file.path(), CatalogKind::Products).unwrap_err() {
            StoreError::DatasetMissingColumn { column, .. } => assert_eq!(column, "Price"),
            other => panic!("expected DatasetMissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let csv = "Id,Name,Description,Price,Image,Benefits,Available Stock\n";
        let file = write_csv(csv);
        assert!(matches!(
            load_catalog(file.path(), CatalogKind::Products),
            Err(StoreError::DatasetEmpty { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let csv = "\
Id,Name,Description,Price,Image,Benefits,Available Stock
P1,A,d,1.00,,x,1
P1,B,d,2.00,,x,1
";
        let file = write_csv(csv);
        assert!(matches!(
            load_catalog(file.path(), CatalogKind::Products),
            Err(StoreError::InvalidInput(_))
        ));
    }
}
