//! Checkout form validation and order assembly.
//!
//! The raw form mirrors what the user typed; validation turns it into
//! guaranteed-populated types in one pass, reporting every missing field by
//! name in a single rejection so the user can correct the form once rather
//! than field by field.

use crate::cart::Cart;
use crate::error::{StoreError, StoreResult};
use crate::order::{Order, OrderId, OrderLine, OrderStatus};
use crate::user::UserId;
use chrono::Utc;
use herb_types::{EmailAddress, NonEmptyText};

/// Payment selection with its mode-specific inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDetails {
    CashOnDelivery,
    Upi {
        upi_id: String,
    },
    Card {
        number: String,
        expiry: String,
        cvv: String,
    },
}

/// Payment mode as persisted on the order. Card numbers and UPI ids are
/// deliberately not part of this type, so they can never be written to the
/// order sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMode {
    CashOnDelivery,
    UpiPayment,
    CardPayment,
}

/// Raw checkout form as entered by the user; nothing validated yet.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub delivery_address: String,
    pub pin_code: String,
    pub payment: Option<PaymentDetails>,
}

impl Default for PaymentDetails {
    fn default() -> Self {
        PaymentDetails::CashOnDelivery
    }
}

/// Customer contact fields after validation; every field is guaranteed
/// non-empty and the email is plausible.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CustomerDetails {
    pub name: NonEmptyText,
    pub email: EmailAddress,
    pub phone: NonEmptyText,
    pub delivery_address: NonEmptyText,
    pub pin_code: NonEmptyText,
}

/// A checkout form that passed validation and can assemble an order.
#[derive(Debug, Clone)]
pub struct ValidatedCheckout {
    pub customer: CustomerDetails,
    pub payment_mode: PaymentMode,
}

impl CheckoutForm {
    /// Validates all required fields at once.
    ///
    /// Field names in the error use the wire spelling (`deliveryAddress`,
    /// `pinCode`, ...) so the presentation layer can highlight inputs
    /// directly.
    ///
    /// # Errors
    ///
    /// - `StoreError::MissingFields` naming every absent required field,
    ///   including the payment-mode-specific ones (UPI id for UPI, the full
    ///   card triplet for card payment).
    /// - `StoreError::InvalidInput` if the email has no plausible shape.
    pub fn validate(&self) -> StoreResult<ValidatedCheckout> {
        let mut missing: Vec<String> = Vec::new();
        let mut require = |value: &str, field: &str| {
            if value.trim().is_empty() {
                missing.push(field.to_owned());
            }
        };

        require(&self.name, "name");
        require(&self.email, "email");
        require(&self.phone, "phone");
        require(&self.delivery_address, "deliveryAddress");
        require(&self.pin_code, "pinCode");

        let payment = self.payment.clone().unwrap_or_default();
        match &payment {
            PaymentDetails::CashOnDelivery => {}
            PaymentDetails::Upi { upi_id } => require(upi_id, "upiId"),
            PaymentDetails::Card {
                number,
                expiry,
                cvv,
            } => {
                require(number, "cardNumber");
                require(expiry, "cardExpiry");
                require(cvv, "cardCvv");
            }
        }

        if !missing.is_empty() {
            return Err(StoreError::MissingFields { fields: missing });
        }

        let email = EmailAddress::new(&self.email)
            .map_err(|e| StoreError::InvalidInput(format!("email: {e}")))?;

        // The require() pass guarantees non-emptiness; NonEmptyText cannot
        // fail here, but the error is still propagated rather than unwrapped.
        let text = |value: &str, field: &str| {
            NonEmptyText::new(value).map_err(|e| StoreError::InvalidInput(format!("{field}: {e}")))
        };

        Ok(ValidatedCheckout {
            customer: CustomerDetails {
                name: text(&self.name, "name")?,
                email,
                phone: text(&self.phone, "phone")?,
                delivery_address: text(&self.delivery_address, "deliveryAddress")?,
                pin_code: text(&self.pin_code, "pinCode")?,
            },
            payment_mode: payment.mode(),
        })
    }
}

impl PaymentDetails {
    pub fn mode(&self) -> PaymentMode {
        match self {
            PaymentDetails::CashOnDelivery => PaymentMode::CashOnDelivery,
            PaymentDetails::Upi { .. } => PaymentMode::UpiPayment,
            PaymentDetails::Card { .. } => PaymentMode::CardPayment,
        }
    }
}

impl PaymentMode {
    /// Initial order status for this payment mode. Anything other than cash
    /// on delivery is marked paid on the user's say-so; this system performs
    /// no payment verification.
    pub fn initial_status(&self) -> OrderStatus {
        match self {
            PaymentMode::CashOnDelivery => OrderStatus::Pending,
            PaymentMode::UpiPayment | PaymentMode::CardPayment => OrderStatus::Paid,
        }
    }
}

/// Assembles an immutable order from a validated checkout and the current
/// cart.
///
/// Line items are copied by value so later cart mutation cannot alter the
/// order. The total is rounded to 2 decimal places here, at the persistence
/// boundary, not in intermediate sums.
///
/// # Errors
///
/// Returns `StoreError::EmptyCart` if the cart has no lines.
pub fn assemble_order(
    id: OrderId,
    cart: &Cart,
    checkout: &ValidatedCheckout,
    user_id: &UserId,
) -> StoreResult<Order> {
    if cart.is_empty() {
        return Err(StoreError::EmptyCart);
    }

    Ok(Order {
        id,
        lines: cart.lines().iter().map(OrderLine::from).collect(),
        total: cart.total().round_dp(2),
        customer: checkout.customer.clone(),
        payment_mode: checkout.payment_mode,
        status: checkout.payment_mode.initial_status(),
        user_id: user_id.clone(),
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, ProductId};
    use rust_decimal::Decimal;

    fn filled_form() -> CheckoutForm {
        CheckoutForm {
            name: "Asha Rao".to_owned(),
            email: "asha@example.com".to_owned(),
            phone: "9876543210".to_owned(),
            delivery_address: "12 Herb Lane".to_owned(),
            pin_code: "560001".to_owned(),
            payment: Some(PaymentDetails::CashOnDelivery),
        }
    }

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
    fn test_valid_form_passes() {
        let checkout = filled_form().validate().unwrap();
        assert_eq!(checkout.payment_mode, PaymentMode::CashOnDelivery);
        assert_eq!(checkout.customer.pin_code.as_str(), "560001");
    }

    #[test]
    fn test_all_missing_fields_reported_at_once() {
        let form = CheckoutForm {
            payment: Some(PaymentDetails::CashOnDelivery),
            ..CheckoutForm::default()
        };
        match form.validate().unwrap_err() {
            StoreError::MissingFields { fields } => {
                assert_eq!(
                    fields,
                    vec!["name", "email", "phone", "deliveryAddress", "pinCode"]
                );
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_upi_requires_upi_id() {
        let mut form = filled_form();
        form.payment = Some(PaymentDetails::Upi {
            upi_id: "  ".to_owned(),
        });
        match form.validate().unwrap_err() {
            StoreError::MissingFields { fields } => assert_eq!(fields, vec!["upiId"]),
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_card_requires_full_triplet() {
        let mut form = filled_form();
        form.payment = Some(PaymentDetails::Card {
            number: "4111111111111111".to_owned(),
            expiry: String::new(),
            cvv: String::new(),
        });
        match form.validate().unwrap_err() {
            StoreError::MissingFields { fields } => {
                assert_eq!(fields, vec!["cardExpiry", "cardCvv"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_implausible_email_rejected() {
        let mut form = filled_form();
        form.email = "not-an-email".to_owned();
        assert!(matches!(
            form.validate(),
            Err(StoreError::InvalidInput(msg)) if msg.starts_with("email")
        ));
    }

    #[test]
    fn test_assemble_order_snapshots_lines_and_rounds_total() {
        let mut cart = Cart::new();
        let a = product("A", Decimal::new(3333, 3), 10); // 3.333
        cart.add(&a).unwrap();
        cart.add(&a).unwrap();
        cart.add(&a).unwrap(); // exact total 9.999

        let checkout = filled_form().validate().unwrap();
        let order =
            assemble_order(OrderId::new(), &cart, &checkout, &UserId::guest()).unwrap();

        assert_eq!(order.total, Decimal::new(1000, 2)); // rounded at assembly
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 3);

        // Later cart mutation cannot alter the submitted order.
        cart.clear();
        assert_eq!(order.lines[0].quantity, 3);
    }

    #[test]
    fn test_assemble_order_rejects_empty_cart() {
        let cart = Cart::new();
        let checkout = filled_form().validate().unwrap();
        assert!(matches!(
            assemble_order(OrderId::new(), &cart, &checkout, &UserId::guest()),
            Err(StoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_upi_and_card_orders_marked_paid() {
        assert_eq!(
            PaymentMode::UpiPayment.initial_status(),
            OrderStatus::Paid
        );
        assert_eq!(
            PaymentMode::CardPayment.initial_status(),
            OrderStatus::Paid
        );
        assert_eq!(
            PaymentMode::CashOnDelivery.initial_status(),
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_payment_mode_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&PaymentMode::CashOnDelivery).unwrap(),
            "\"cashOnDelivery\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMode::UpiPayment).unwrap(),
            "\"upiPayment\""
        );
    }
}
