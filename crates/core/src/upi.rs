//! UPI payment-intent deep links.
//!
//! Builds the `upi://pay?...` URI a UPI app consumes, embedding the payee,
//! merchant name, amount and the order id as the transaction reference.
//!
//! This is a display artifact only: the system has no mechanism to verify
//! that payment actually occurred, and "payment confirmed" is a user-asserted
//! action. Anyone reusing this module in a real deployment must add payment
//! verification; it is an explicit trust gap here.

use crate::config::MerchantConfig;
use crate::order::OrderId;
use rust_decimal::Decimal;

/// A generated payment intent for the user to scan or open.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PaymentIntent {
    /// Order identifier embedded as the transaction reference; the
    /// subsequent submission reuses it.
    pub order_id: OrderId,
    /// Amount fixed to 2 decimal places.
    pub amount: Decimal,
    /// The `upi://pay` deep link.
    pub uri: String,
}

/// Builds a UPI deep link for `amount` against the configured merchant.
///
/// Amount is rendered with exactly two decimal places; the remaining query
/// parameters are percent-encoded so merchant names with spaces survive.
pub fn payment_uri(merchant: &MerchantConfig, amount: Decimal, reference: OrderId) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("pa", merchant.payee_id())
        .append_pair("pn", merchant.name())
        .append_pair("am", &format!("{:.2}", amount.round_dp(2)))
        .append_pair("tr", &reference.to_string())
        .append_pair("cu", merchant.currency());
    format!("upi://pay?{}", query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MerchantConfig;

    fn merchant() -> MerchantConfig {
        MerchantConfig::new(
            "shop@oksbi".to_owned(),
            "Herbal Shop".to_owned(),
            "INR".to_owned(),
        )
        .unwrap()
    }

    #[test]
    fn test_uri_has_all_parameters() {
        let id = OrderId::new();
        let uri = payment_uri(&merchant(), Decimal::new(2550, 2), id);

        assert!(uri.starts_with("upi://pay?"));
        assert!(uri.contains("pa=shop%40oksbi"));
        assert!(uri.contains("pn=Herbal+Shop"));
        assert!(uri.contains("am=25.50"));
        assert!(uri.contains(&format!("tr={id}")));
        assert!(uri.contains("cu=INR"));
    }

    #[test]
    fn test_amount_fixed_to_two_decimals() {
        let uri = payment_uri(&merchant(), Decimal::new(25, 0), OrderId::new());
        assert!(uri.contains("am=25.00"));
    }
}
