//! In-memory shopping cart keyed by product identity.
//!
//! The cart lives for one browsing session and is discarded on success or
//! abandonment; it is never shared or persisted mid-session. Stock
//! invariants are enforced here, in the data layer, so the cart is
//! independently testable without a UI harness: adding an out-of-stock
//! product and exceeding available stock are typed rejections, not silent
//! clamps or disabled buttons.

use crate::catalog::{Product, ProductId};
use crate::error::{StoreError, StoreResult};
use rust_decimal::Decimal;

/// One product entry in the cart, with values snapshotted at add time so
/// totals stay pure over the cart alone.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    /// Always >= 1; a zero quantity removes the line instead.
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A mapping from product id to cart line, unique keys, insertion-ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product` to the cart.
    ///
    /// If the product is already present its quantity is incremented.
    ///
    /// # Errors
    ///
    /// - `StoreError::OutOfStock` if the product has zero stock; the add is
    ///   rejected here rather than merely disabled at the UI.
    /// - `StoreError::InsufficientStock` if the line is already at the
    ///   product's stock cap, so the increment cannot bypass the invariant.
    pub fn add(&mut self, product: &Product) -> StoreResult<()> {
        if product.stock == 0 {
            return Err(StoreError::OutOfStock(product.id.clone()));
        }

        if let Some(line) = self.line_mut(&product.id) {
            // Compare before incrementing so a line at u32::MAX cannot wrap.
            if line.quantity >= product.stock {
                return Err(StoreError::InsufficientStock {
                    id: product.id.clone(),
                    requested: line.quantity.saturating_add(1),
                    available: product.stock,
                });
            }
            line.quantity += 1;
            return Ok(());
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        });
        Ok(())
    }

    /// Sets the quantity of an existing line.
    ///
    /// A quantity of zero is equivalent to [`Cart::remove`].
    ///
    /// # Errors
    ///
    /// - `StoreError::UnknownProduct` if the product has no cart line (and
    ///   the quantity is non-zero).
    /// - `StoreError::InsufficientStock` if `quantity` exceeds the product's
    ///   current stock; the line is left unchanged.
    pub fn update_quantity(&mut self, product: &Product, quantity: u32) -> StoreResult<()> {
        if quantity == 0 {
            self.remove(&product.id);
            return Ok(());
        }

        if quantity > product.stock {
            return Err(StoreError::InsufficientStock {
                id: product.id.clone(),
                requested: quantity,
                available: product.stock,
            });
        }

        match self.line_mut(&product.id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(StoreError::UnknownProduct(product.id.clone())),
        }
    }

    /// Removes a line if present. Removing an absent id is a no-op, not an
    /// error.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
    }

    /// Sum of `unit_price * quantity` over all lines.
    ///
    /// Intermediate sums are exact decimals; rounding to 2 decimal places
    /// happens only at display/persistence time.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: Decimal, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price,
            stock,
            description: "test".to_owned(),
            benefits: vec![],
            image_url: String::new(),
            category: None,
            scientific_name: None,
        }
    }

    #[test]
    fn test_add_inserts_then_increments() {
        let mut cart = Cart::new();
        let p = product("A", Decimal::new(1000, 2), 5);

        cart.add(&p).unwrap();
        cart.add(&p).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_out_of_stock_rejected() {
        let mut cart = Cart::new();
        let p = product("A", Decimal::new(1000, 2), 0);

        assert!(matches!(cart.add(&p), Err(StoreError::OutOfStock(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_cannot_increment_past_stock() {
        let mut cart = Cart::new();
        let p = product("A", Decimal::new(1000, 2), 1);

        cart.add(&p).unwrap();
        let err = cart.add(&p).unwrap_err();
        match err {
            StoreError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_add_at_maximum_quantity_rejected_without_wrapping() {
        let mut cart = Cart::new();
        let p = product("A", Decimal::ONE, u32::MAX);
        cart.add(&p).unwrap();
        cart.update_quantity(&p, u32::MAX).unwrap();

        assert!(matches!(
            cart.add(&p),
            Err(StoreError::InsufficientStock { .. })
        ));
        assert_eq!(cart.lines()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let p = product("A", Decimal::new(1000, 2), 5);

        let mut via_update = Cart::new();
        via_update.add(&p).unwrap();
        via_update.update_quantity(&p, 0).unwrap();

        let mut via_remove = Cart::new();
        via_remove.add(&p).unwrap();
        via_remove.remove(&p.id);

        assert_eq!(via_update, via_remove);
        assert!(via_update.is_empty());
    }

    #[test]
    fn test_update_quantity_over_stock_rejected_line_unchanged() {
        let mut cart = Cart::new();
        let p = product("A", Decimal::new(1000, 2), 3);
        cart.add(&p).unwrap();
        cart.add(&p).unwrap();

        let err = cart.update_quantity(&p, 10).unwrap_err();
        match err {
            StoreError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 10);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        // The line for A keeps its previous quantity.
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_update_unknown_product_rejected() {
        let mut cart = Cart::new();
        let p = product("A", Decimal::new(1000, 2), 3);
        assert!(matches!(
            cart.update_quantity(&p, 2),
            Err(StoreError::UnknownProduct(_))
        ));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.remove(&ProductId::new("missing"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_of_mixed_lines() {
        // cart = {A: qty 2 @ price 10, B: qty 1 @ price 5} -> 25.00
        let mut cart = Cart::new();
        let a = product("A", Decimal::new(10, 0), 10);
        let b = product("B", Decimal::new(5, 0), 10);
        cart.add(&a).unwrap();
        cart.add(&a).unwrap();
        cart.add(&b).unwrap();

        assert_eq!(cart.total(), Decimal::new(25, 0));
    }

    #[test]
    fn test_total_is_additive() {
        let mut cart = Cart::new();
        let a = product("A", Decimal::new(1999, 2), 10);
        cart.add(&a).unwrap();
        cart.add(&a).unwrap();
        let before = cart.total();

        let b = product("B", Decimal::new(550, 2), 10);
        cart.add(&b).unwrap();

        assert_eq!(cart.total(), before + b.price);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        for id in ["C", "A", "B"] {
            cart.add(&product(id, Decimal::ONE, 5)).unwrap();
        }
        let order: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(order, ["C", "A", "B"]);
    }
}
