//! Cart/checkout state machine for one shopping session.
//!
//! A session owns exactly one cart and walks the states
//! `Browsing -> Reviewing -> CheckingOut -> Submitting`, returning to
//! `Browsing` on a successful submission or back to `CheckingOut` with the
//! failure reason retained otherwise. Sessions are single-user and
//! single-threaded from the core's perspective; the only suspension point is
//! the order sink call.

use crate::cart::{Cart, CartLine};
use crate::catalog::{Catalog, ProductId};
use crate::checkout::{assemble_order, CheckoutForm};
use crate::config::MerchantConfig;
use crate::error::{StoreError, StoreResult};
use crate::order::OrderId;
use crate::sink::OrderSink;
use crate::upi::{payment_uri, PaymentIntent};
use crate::user::UserId;
use rust_decimal::Decimal;

/// Where a session currently is in the cart/checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Browsing the catalog; the cart drawer is closed.
    Browsing,
    /// Cart open, reviewing lines.
    Reviewing,
    /// Checkout form open.
    CheckingOut,
    /// Order handed to the sink; no other operation is legal.
    Submitting,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Browsing => "browsing",
            SessionState::Reviewing => "reviewing",
            SessionState::CheckingOut => "checkingOut",
            SessionState::Submitting => "submitting",
        }
    }
}

/// Receipt returned to the caller after a successful submission. The order
/// itself is owned by the sink from this point on; the id is retained for
/// display only.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub total: Decimal,
}

/// One user's shopping session: cart, flow state, and submission bookkeeping.
#[derive(Debug, Default)]
pub struct ShoppingSession {
    cart: Cart,
    state: SessionState,
    /// Reason the last submission failed; cleared on success.
    last_failure: Option<String>,
    /// Order id allocated by a UPI payment intent, reused by the submit so
    /// the transaction reference on the QR matches the persisted order.
    pending_order_id: Option<OrderId>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Browsing
    }
}

impl ShoppingSession {
    pub fn new() -> Self {
        Self::default()
    }

    // -- read-only projections ------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cart(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    // -- cart editing (Browsing / Reviewing) ----------------------------

    /// Adds one unit of a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// - `StoreError::WrongState` outside Browsing/Reviewing.
    /// - `StoreError::UnknownProduct` if the id is not in the catalog.
    /// - `StoreError::OutOfStock` / `StoreError::InsufficientStock` from the
    ///   cart's stock invariant.
    pub fn add_to_cart(&mut self, product_id: &ProductId, catalog: &Catalog) -> StoreResult<()> {
        self.require_editable()?;
        let product = catalog
            .find(product_id)
            .ok_or_else(|| StoreError::UnknownProduct(product_id.clone()))?;
        self.cart.add(product)
    }

    /// Sets the quantity of a cart line; zero removes it, exactly like
    /// [`ShoppingSession::remove_from_cart`], without consulting the catalog.
    ///
    /// # Errors
    ///
    /// Same state requirement as [`ShoppingSession::add_to_cart`], plus the
    /// cart's `UnknownProduct`/`InsufficientStock` rejections. On rejection
    /// the line is unchanged.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        catalog: &Catalog,
    ) -> StoreResult<()> {
        self.require_editable()?;
        if quantity == 0 {
            self.cart.remove(product_id);
            return Ok(());
        }
        let product = catalog
            .find(product_id)
            .ok_or_else(|| StoreError::UnknownProduct(product_id.clone()))?;
        self.cart.update_quantity(product, quantity)
    }

    /// Removes a cart line; removing an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// `StoreError::WrongState` outside Browsing/Reviewing.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> StoreResult<()> {
        self.require_editable()?;
        self.cart.remove(product_id);
        Ok(())
    }

    // -- flow transitions -----------------------------------------------

    /// Opens the cart for review. No-op when already reviewing.
    ///
    /// # Errors
    ///
    /// `StoreError::WrongState` when a checkout or submission is in flight.
    pub fn open_cart(&mut self) -> StoreResult<()> {
        match self.state {
            SessionState::Browsing | SessionState::Reviewing => {
                self.state = SessionState::Reviewing;
                Ok(())
            }
            other => Err(StoreError::WrongState {
                expected: "browsing",
                actual: other.as_str(),
            }),
        }
    }

    /// Closes the cart drawer, returning to browsing. Cart contents are
    /// kept; only the flow position resets.
    ///
    /// # Errors
    ///
    /// `StoreError::WrongState` while a submission is in flight.
    pub fn close_cart(&mut self) -> StoreResult<()> {
        match self.state {
            SessionState::Browsing | SessionState::Reviewing | SessionState::CheckingOut => {
                self.state = SessionState::Browsing;
                Ok(())
            }
            other => Err(StoreError::WrongState {
                expected: "reviewing",
                actual: other.as_str(),
            }),
        }
    }

    /// Moves from reviewing to the checkout form.
    ///
    /// # Errors
    ///
    /// - `StoreError::EmptyCart` if there is nothing to check out.
    /// - `StoreError::WrongState` unless the session is reviewing.
    pub fn advance_to_checkout(&mut self) -> StoreResult<()> {
        if self.state != SessionState::Reviewing {
            return Err(StoreError::WrongState {
                expected: "reviewing",
                actual: self.state.as_str(),
            });
        }
        if self.cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        self.state = SessionState::CheckingOut;
        Ok(())
    }

    /// Returns from the checkout form to cart review.
    ///
    /// # Errors
    ///
    /// `StoreError::WrongState` unless the session is checking out.
    pub fn back_to_cart(&mut self) -> StoreResult<()> {
        if self.state != SessionState::CheckingOut {
            return Err(StoreError::WrongState {
                expected: "checkingOut",
                actual: self.state.as_str(),
            });
        }
        self.state = SessionState::Reviewing;
        Ok(())
    }

    // -- payment intent and submission ----------------------------------

    /// Builds a UPI payment intent for the current cart total.
    ///
    /// Allocates the order id early and retains it, so the transaction
    /// reference embedded in the QR deep link matches the order persisted by
    /// the subsequent [`ShoppingSession::submit_order`]. Display artifact
    /// only; nothing verifies that payment happened.
    ///
    /// # Errors
    ///
    /// - `StoreError::WrongState` unless the session is checking out.
    /// - `StoreError::EmptyCart` if the cart has emptied since checkout.
    pub fn payment_intent(&mut self, merchant: &MerchantConfig) -> StoreResult<PaymentIntent> {
        if self.state != SessionState::CheckingOut {
            return Err(StoreError::WrongState {
                expected: "checkingOut",
                actual: self.state.as_str(),
            });
        }
        if self.cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let order_id = self.pending_order_id.unwrap_or_else(OrderId::new);
        self.pending_order_id = Some(order_id);

        let amount = self.cart.total().round_dp(2);
        Ok(PaymentIntent {
            order_id,
            amount,
            uri: payment_uri(merchant, amount, order_id),
        })
    }

    /// Validates the form, assembles the order snapshot and hands it to the
    /// sink, calling it at most once.
    ///
    /// On success the cart is cleared, the session returns to browsing, and
    /// the receipt keeps the id for display. On a sink failure the session
    /// returns to the checkout form with the reason retained and the cart
    /// untouched, so resubmission needs no re-entry. Validation failures
    /// leave the state machine where it was.
    ///
    /// # Errors
    ///
    /// - `StoreError::WrongState` unless the session is checking out.
    /// - `StoreError::MissingFields` / `StoreError::InvalidInput` from form
    ///   validation.
    /// - `StoreError::EmptyCart` if there is nothing to submit.
    /// - Persistence-class errors propagated from the sink.
    pub async fn submit_order(
        &mut self,
        form: &CheckoutForm,
        user_id: &UserId,
        sink: &dyn OrderSink,
    ) -> StoreResult<OrderReceipt> {
        if self.state != SessionState::CheckingOut {
            return Err(StoreError::WrongState {
                expected: "checkingOut",
                actual: self.state.as_str(),
            });
        }

        let checkout = form.validate()?;

        let order_id = self.pending_order_id.unwrap_or_else(OrderId::new);
        let order = assemble_order(order_id, &self.cart, &checkout, user_id)?;
        let total = order.total;

        self.state = SessionState::Submitting;
        match sink.persist(&order).await {
            Ok(persisted_id) => {
                self.cart.clear();
                self.state = SessionState::Browsing;
                self.last_failure = None;
                self.pending_order_id = None;
                Ok(OrderReceipt {
                    order_id: persisted_id,
                    total,
                })
            }
            Err(e) => {
                // Cart and pending id survive so the user can retry as-is.
                self.state = SessionState::CheckingOut;
                self.last_failure = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn require_editable(&self) -> StoreResult<()> {
        match self.state {
            SessionState::Browsing | SessionState::Reviewing => Ok(()),
            other => Err(StoreError::WrongState {
                expected: "browsing or reviewing",
                actual: other.as_str(),
            }),
        }
    }
}
