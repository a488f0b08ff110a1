//! Order persistence boundary.
//!
//! The core hands finalized orders to an [`OrderSink`] and never retries on
//! its own; retry is a caller decision. [`FsOrderSink`] is the bundled
//! implementation, writing one immutable JSON document per order into a
//! sharded directory tree:
//!
//! ```text
//! <order_data_dir>/<s1>/<s2>/<32hex-order-id>/order.json
//! ```
//!
//! where `s1`/`s2` are the first 4 hex characters of the order id. Sharding
//! keeps fan-out per directory bounded as order volume grows.

use crate::error::{StoreError, StoreResult};
use crate::order::{Order, OrderId};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the order document inside its sharded directory.
pub const ORDER_FILE_NAME: &str = "order.json";

/// External persistence target for finalized orders.
///
/// Implementations must treat `persist` as create-only: the same order id is
/// never written twice by the core, and a sink must not partially persist.
#[async_trait::async_trait]
pub trait OrderSink: Send + Sync {
    /// Persists one order and returns its id on success.
    ///
    /// # Errors
    ///
    /// Returns a persistence-class `StoreError`; the caller keeps cart and
    /// form state so the user can resubmit.
    async fn persist(&self, order: &Order) -> StoreResult<OrderId>;
}

/// Filesystem-backed order sink.
#[derive(Debug, Clone)]
pub struct FsOrderSink {
    orders_dir: PathBuf,
}

impl FsOrderSink {
    pub fn new(orders_dir: PathBuf) -> Self {
        Self { orders_dir }
    }

    /// Sharded directory for one order id.
    fn order_dir(&self, id: OrderId) -> PathBuf {
        let hex = id.to_string();
        self.orders_dir
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(&hex)
    }

    /// Path of the document that `persist` writes for `id`.
    pub fn order_path(&self, id: OrderId) -> PathBuf {
        self.order_dir(id).join(ORDER_FILE_NAME)
    }

    /// Reads a persisted order back, mainly for receipts and tests.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OrderWrite`/`OrderSerialization` style variants
    /// mapped from the underlying read/parse failures.
    pub fn read_order(&self, id: OrderId) -> StoreResult<Order> {
        let contents =
            fs::read_to_string(self.order_path(id)).map_err(StoreError::OrderWrite)?;
        serde_json::from_str(&contents).map_err(StoreError::OrderSerialization)
    }
}

#[async_trait::async_trait]
impl OrderSink for FsOrderSink {
    async fn persist(&self, order: &Order) -> StoreResult<OrderId> {
        let dir = self.order_dir(order.id);
        let document =
            serde_json::to_string_pretty(order).map_err(StoreError::OrderSerialization)?;

        // Filesystem I/O runs on the blocking pool, not the async workers.
        tokio::task::spawn_blocking(move || {
            fs::create_dir_all(&dir).map_err(StoreError::OrderDirCreation)?;
            write_new(&dir.join(ORDER_FILE_NAME), &document)
        })
        .await
        .map_err(|e| StoreError::OrderSink(Box::new(e)))??;

        tracing::info!(order_id = %order.id, total = %order.total, "persisted order");
        Ok(order.id)
    }
}

/// Writes `contents` to a path that must not already exist, preserving the
/// at-most-once-per-submission contract.
fn write_new(path: &Path, contents: &str) -> StoreResult<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(StoreError::OrderWrite)?;
    file.write_all(contents.as_bytes())
        .map_err(StoreError::OrderWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::catalog::{Product, ProductId};
    use crate::checkout::{assemble_order, CheckoutForm, PaymentDetails};
    use crate::user::UserId;
    use rust_decimal::Decimal;

    fn sample_order() -> Order {
        let mut cart = Cart::new();
        cart.add(&Product {
            id: ProductId::new("A"),
            name: "Tulsi Drops".to_owned(),
            price: Decimal::new(12050, 2),
            stock: 4,
            description: "extract".to_owned(),
            benefits: vec![],
            image_url: String::new(),
            category: None,
            scientific_name: None,
        })
        .unwrap();

        let form = CheckoutForm {
            name: "Asha Rao".to_owned(),
            email: "asha@example.com".to_owned(),
            phone: "9876543210".to_owned(),
            delivery_address: "12 Herb Lane".to_owned(),
            pin_code: "560001".to_owned(),
            payment: Some(PaymentDetails::CashOnDelivery),
        };
        let checkout = form.validate().unwrap();
        assemble_order(OrderId::new(), &cart, &checkout, &UserId::guest()).unwrap()
    }

    #[tokio::test]
    async fn test_persist_writes_one_document_in_sharded_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsOrderSink::new(dir.path().to_path_buf());
        let order = sample_order();

        let id = sink.persist(&order).await.unwrap();
        assert_eq!(id, order.id);

        let path = sink.order_path(id);
        assert!(path.is_file());
        let hex = id.to_string();
        assert!(path.starts_with(dir.path().join(&hex[0..2]).join(&hex[2..4])));

        let read_back = sink.read_order(id).unwrap();
        assert_eq!(read_back, order);
    }

    #[tokio::test]
    async fn test_persist_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsOrderSink::new(dir.path().to_path_buf());
        let order = sample_order();

        sink.persist(&order).await.unwrap();
        let err = sink.persist(&order).await.unwrap_err();
        assert!(err.is_persistence());
    }
}
