//! # Herb Core
//!
//! Core business logic for the herbal remedy and storefront system:
//! - Static dataset loading (remedy records and product catalogs) from CSV
//!   with strict, all-or-nothing row validation
//! - The symptom-to-remedy matcher
//! - The cart/checkout state machine and immutable order assembly
//! - The order-sink persistence boundary and UPI payment intents
//!
//! **No API concerns**: HTTP servers, session registries and request DTOs
//! belong in `api-rest`; terminal front-ends in `herb-cli`. All collaborator
//! identities (user id, catalog, order sink) are passed into operations
//! explicitly rather than read from process-wide state.

#![warn(rust_2018_idioms)]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod matcher;
pub mod order;
pub mod remedies;
pub mod session;
pub mod sink;
pub mod upi;
pub mod user;

pub use cart::{Cart, CartLine};
pub use catalog::{load_catalog, Catalog, CatalogKind, Product, ProductId};
pub use checkout::{CheckoutForm, CustomerDetails, PaymentDetails, PaymentMode};
pub use config::{resolve_dataset_dir, CoreConfig, MerchantConfig};
pub use error::{StoreError, StoreResult};
pub use matcher::{match_remedies, MatchResult, SymptomQuery};
pub use order::{Order, OrderId, OrderLine, OrderStatus};
pub use remedies::{load_remedy_records, RemedyRecord};
pub use session::{OrderReceipt, SessionState, ShoppingSession};
pub use sink::{FsOrderSink, OrderSink};
pub use upi::PaymentIntent;
pub use user::UserId;
