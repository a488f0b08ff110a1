//! # API REST
//!
//! REST API implementation for the herbal storefront.
//!
//! Handles:
//! - HTTP endpoints with axum (symptom matching, catalogs, cart sessions,
//!   checkout and order submission)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status-code mapping)
//!
//! The core stays HTTP-free: this crate owns the session registry and maps
//! every typed `StoreError` to a status code plus a rendered message so the
//! presentation layer can always show the reason.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use herb_core::{
    load_catalog, load_remedy_records, match_remedies, Catalog, CatalogKind, CoreConfig,
    FsOrderSink, MatchResult, OrderSink, Product, ProductId, RemedyRecord, ShoppingSession,
    StoreError, SymptomQuery, UserId,
};

/// Header carrying the opaque user id from the auth provider; absent means
/// guest.
const USER_ID_HEADER: &str = "x-user-id";

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request
/// handlers: resolved configuration, the loaded datasets, the session
/// registry and the order sink.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    remedies: Arc<Vec<RemedyRecord>>,
    plants: Arc<Catalog>,
    products: Arc<Catalog>,
    /// Plants and products merged for cart lookups.
    combined: Arc<Catalog>,
    /// Each session carries its own lock, so a submission awaiting the order
    /// sink blocks only that session.
    sessions: Arc<Mutex<HashMap<Uuid, SessionHandle>>>,
    sink: Arc<FsOrderSink>,
}

type SessionHandle = Arc<Mutex<ShoppingSession>>;

impl AppState {
    /// Loads all datasets and builds the shared state.
    ///
    /// # Errors
    ///
    /// Returns a dataset `StoreError` if any CSV file is missing or
    /// malformed; the server refuses to start with a partial catalog.
    pub fn initialise(cfg: Arc<CoreConfig>) -> Result<Self, StoreError> {
        let remedies = load_remedy_records(&cfg.remedy_dataset_path())?;
        let plants = load_catalog(&cfg.plant_catalog_path(), CatalogKind::Plants)?;
        let products = load_catalog(&cfg.product_catalog_path(), CatalogKind::Products)?;
        let combined = Catalog::merge([plants.clone(), products.clone()])?;
        let sink = FsOrderSink::new(cfg.order_data_dir().to_path_buf());

        Ok(Self {
            cfg,
            remedies: Arc::new(remedies),
            plants: Arc::new(plants),
            products: Arc::new(products),
            combined: Arc::new(combined),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            sink: Arc::new(sink),
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_remedies,
        match_symptoms,
        get_catalog,
        create_session,
        get_cart,
        add_cart_item,
        update_cart_item,
        remove_cart_item,
        advance_to_checkout,
        back_to_cart,
        payment_intent,
        submit_order,
    ),
    components(schemas(
        HealthRes,
        RemedyDto,
        MatchReq,
        MatchRes,
        MatchResultDto,
        ProductDto,
        CatalogRes,
        SessionRes,
        CartRes,
        CartLineDto,
        AddItemReq,
        UpdateQuantityReq,
        PaymentIntentRes,
        SubmitOrderReq,
        OrderReceiptRes,
        ErrorRes,
    ))
)]
struct ApiDoc;

/// Builds the full application router with CORS and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/remedies", get(list_remedies))
        .route("/remedies/match", post(match_symptoms))
        .route("/catalog/:kind", get(get_catalog))
        .route("/sessions", post(create_session))
        .route("/sessions/:id/cart", get(get_cart))
        .route("/sessions/:id/cart/items", post(add_cart_item))
        .route("/sessions/:id/cart/items/:product_id", put(update_cart_item))
        .route(
            "/sessions/:id/cart/items/:product_id",
            delete(remove_cart_item),
        )
        .route("/sessions/:id/checkout", post(advance_to_checkout))
        .route("/sessions/:id/checkout/back", post(back_to_cart))
        .route("/sessions/:id/payment-intent", post(payment_intent))
        .route("/sessions/:id/orders", post(submit_order))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// -- wire types ----------------------------------------------------------

#[derive(serde::Serialize, utoipa::ToSchema)]
struct HealthRes {
    ok: bool,
    message: String,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
struct ErrorRes {
    error: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct RemedyDto {
    id: String,
    disease_label: String,
    herbal_plant: String,
    preparation_method: String,
    dosage: String,
    possible_reactions: String,
}

impl From<&RemedyRecord> for RemedyDto {
    fn from(record: &RemedyRecord) -> Self {
        Self {
            id: record.id.clone(),
            disease_label: record.disease_label.clone(),
            herbal_plant: record.herbal_plant.clone(),
            preparation_method: record.preparation_method.clone(),
            dosage: record.dosage.clone(),
            possible_reactions: record.possible_reactions.clone(),
        }
    }
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
struct MatchReq {
    /// Free-text symptom phrases; at least one required.
    symptoms: Vec<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct MatchResultDto {
    remedy: RemedyDto,
    match_count: usize,
    total_queried: usize,
    match_percentage: u8,
}

impl From<&MatchResult> for MatchResultDto {
    fn from(result: &MatchResult) -> Self {
        Self {
            remedy: RemedyDto::from(&result.record),
            match_count: result.match_count,
            total_queried: result.total_queried,
            match_percentage: result.match_percentage,
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct MatchRes {
    results: Vec<MatchResultDto>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct ProductDto {
    id: String,
    name: String,
    /// Decimal rendered as a string, e.g. "120.50".
    price: String,
    stock: u32,
    description: String,
    benefits: Vec<String>,
    image_url: String,
    category: Option<String>,
    scientific_name: Option<String>,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.round_dp(2).to_string(),
            stock: product.stock,
            description: product.description.clone(),
            benefits: product.benefits.clone(),
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            scientific_name: product.scientific_name.clone(),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct CatalogRes {
    kind: String,
    products: Vec<ProductDto>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct SessionRes {
    session_id: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct CartLineDto {
    product_id: String,
    name: String,
    unit_price: String,
    quantity: u32,
    line_total: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct CartRes {
    state: String,
    lines: Vec<CartLineDto>,
    /// Cart total rounded to 2 decimal places for display.
    total: String,
    last_failure: Option<String>,
}

fn cart_projection(session: &ShoppingSession) -> CartRes {
    CartRes {
        state: session.state().as_str().to_owned(),
        lines: session
            .cart()
            .iter()
            .map(|line| CartLineDto {
                product_id: line.product_id.to_string(),
                name: line.name.clone(),
                unit_price: line.unit_price.round_dp(2).to_string(),
                quantity: line.quantity,
                line_total: line.line_total().round_dp(2).to_string(),
            })
            .collect(),
        total: session.total().round_dp(2).to_string(),
        last_failure: session.last_failure().map(str::to_owned),
    }
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
struct AddItemReq {
    product_id: String,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
struct UpdateQuantityReq {
    /// New quantity; zero removes the line.
    quantity: u32,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct PaymentIntentRes {
    order_id: String,
    amount: String,
    uri: String,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
struct SubmitOrderReq {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    delivery_address: String,
    #[serde(default)]
    pin_code: String,
    /// One of `cashOnDelivery`, `upiPayment`, `cardPayment`.
    #[schema(value_type = String)]
    payment_mode: herb_core::PaymentMode,
    #[serde(default)]
    upi_id: String,
    #[serde(default)]
    card_number: String,
    #[serde(default)]
    card_expiry: String,
    #[serde(default)]
    card_cvv: String,
}

impl SubmitOrderReq {
    fn into_form(self) -> herb_core::CheckoutForm {
        use herb_core::{PaymentDetails, PaymentMode};

        let payment = match self.payment_mode {
            PaymentMode::CashOnDelivery => PaymentDetails::CashOnDelivery,
            PaymentMode::UpiPayment => PaymentDetails::Upi {
                upi_id: self.upi_id,
            },
            PaymentMode::CardPayment => PaymentDetails::Card {
                number: self.card_number,
                expiry: self.card_expiry,
                cvv: self.card_cvv,
            },
        };

        herb_core::CheckoutForm {
            name: self.name,
            email: self.email,
            phone: self.phone,
            delivery_address: self.delivery_address,
            pin_code: self.pin_code,
            payment: Some(payment),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct OrderReceiptRes {
    order_id: String,
    total: String,
}

// -- error mapping -------------------------------------------------------

type ApiError = (StatusCode, Json<ErrorRes>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Maps a typed core failure to a status code, rendering the message so the
/// caller can display the reason.
fn store_error_response(e: &StoreError) -> ApiError {
    let status = match e {
        StoreError::InvalidInput(_)
        | StoreError::EmptySymptomQuery
        | StoreError::MissingFields { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::UnknownProduct(_) => StatusCode::NOT_FOUND,
        StoreError::OutOfStock(_)
        | StoreError::InsufficientStock { .. }
        | StoreError::EmptyCart
        | StoreError::WrongState { .. } => StatusCode::CONFLICT,
        _ if e.is_data_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
        _ if e.is_persistence() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorRes {
            error: e.to_string(),
        }),
    )
}

fn unknown_session(id: Uuid) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorRes {
            error: format!("unknown session '{id}'"),
        }),
    )
}

fn bad_session_id(raw: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorRes {
            error: format!("invalid session id '{raw}'"),
        }),
    )
}

fn user_from_headers(headers: &HeaderMap) -> UserId {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(UserId::new)
        .unwrap_or_else(UserId::guest)
}

// -- handlers ------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "herbal storefront API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/remedies",
    responses(
        (status = 200, description = "Loaded remedy dataset", body = [RemedyDto])
    )
)]
#[axum::debug_handler]
async fn list_remedies(State(state): State<AppState>) -> Json<Vec<RemedyDto>> {
    Json(state.remedies.iter().map(RemedyDto::from).collect())
}

#[utoipa::path(
    post,
    path = "/remedies/match",
    request_body = MatchReq,
    responses(
        (status = 200, description = "Ranked remedy candidates", body = MatchRes),
        (status = 422, description = "Empty symptom query", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn match_symptoms(
    State(state): State<AppState>,
    Json(req): Json<MatchReq>,
) -> ApiResult<MatchRes> {
    let query = SymptomQuery::new(&req.symptoms).map_err(|e| store_error_response(&e))?;
    let results = match_remedies(&state.remedies, &query);
    Ok(Json(MatchRes {
        results: results.iter().map(MatchResultDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/catalog/{kind}",
    params(("kind" = String, Path, description = "Catalog kind: plants or products")),
    responses(
        (status = 200, description = "Catalog listing", body = CatalogRes),
        (status = 422, description = "Unknown catalog kind", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_catalog(
    State(state): State<AppState>,
    AxumPath(kind): AxumPath<String>,
) -> ApiResult<CatalogRes> {
    let kind = CatalogKind::from_str(&kind).map_err(|e| store_error_response(&e))?;
    let catalog = match kind {
        CatalogKind::Plants => &state.plants,
        CatalogKind::Products => &state.products,
    };
    Ok(Json(CatalogRes {
        kind: kind.to_string(),
        products: catalog.products().iter().map(ProductDto::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "New shopping session", body = SessionRes)
    )
)]
#[axum::debug_handler]
async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionRes>) {
    let id = Uuid::new_v4();
    state
        .sessions
        .lock()
        .await
        .insert(id, Arc::new(Mutex::new(ShoppingSession::new())));
    tracing::debug!(session_id = %id, "created shopping session");
    (
        StatusCode::CREATED,
        Json(SessionRes {
            session_id: id.to_string(),
        }),
    )
}

/// Looks up a session's handle, holding the registry lock only for the
/// lookup itself.
async fn session_handle(
    state: &AppState,
    raw_id: &str,
) -> Result<(Uuid, SessionHandle), ApiError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| bad_session_id(raw_id))?;
    let sessions = state.sessions.lock().await;
    let handle = sessions
        .get(&id)
        .cloned()
        .ok_or_else(|| unknown_session(id))?;
    Ok((id, handle))
}

/// Runs `op` against the named session under that session's own lock; other
/// sessions stay available while it runs.
async fn with_session<T>(
    state: &AppState,
    raw_id: &str,
    op: impl FnOnce(&mut ShoppingSession) -> Result<T, StoreError>,
) -> Result<T, ApiError> {
    let (id, handle) = session_handle(state, raw_id).await?;
    let mut session = handle.lock().await;
    op(&mut session).map_err(|e| {
        tracing::error!(session_id = %id, error = %e, "session operation rejected");
        store_error_response(&e)
    })
}

#[utoipa::path(
    get,
    path = "/sessions/{id}/cart",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Cart projection", body = CartRes),
        (status = 404, description = "Unknown session", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_cart(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<CartRes> {
    let projection = with_session(&state, &id, |session| Ok(cart_projection(session))).await?;
    Ok(Json(projection))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/cart/items",
    params(("id" = String, Path, description = "Session id")),
    request_body = AddItemReq,
    responses(
        (status = 200, description = "Updated cart", body = CartRes),
        (status = 404, description = "Unknown session or product", body = ErrorRes),
        (status = 409, description = "Out of stock or wrong state", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn add_cart_item(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<AddItemReq>,
) -> ApiResult<CartRes> {
    let catalog = state.combined.clone();
    let projection = with_session(&state, &id, move |session| {
        session.add_to_cart(&ProductId::new(req.product_id), &catalog)?;
        Ok(cart_projection(session))
    })
    .await?;
    Ok(Json(projection))
}

#[utoipa::path(
    put,
    path = "/sessions/{id}/cart/items/{product_id}",
    params(
        ("id" = String, Path, description = "Session id"),
        ("product_id" = String, Path, description = "Product id")
    ),
    request_body = UpdateQuantityReq,
    responses(
        (status = 200, description = "Updated cart", body = CartRes),
        (status = 404, description = "Unknown session or product", body = ErrorRes),
        (status = 409, description = "Insufficient stock or wrong state", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn update_cart_item(
    State(state): State<AppState>,
    AxumPath((id, product_id)): AxumPath<(String, String)>,
    Json(req): Json<UpdateQuantityReq>,
) -> ApiResult<CartRes> {
    let catalog = state.combined.clone();
    let projection = with_session(&state, &id, move |session| {
        session.update_quantity(&ProductId::new(product_id), req.quantity, &catalog)?;
        Ok(cart_projection(session))
    })
    .await?;
    Ok(Json(projection))
}

#[utoipa::path(
    delete,
    path = "/sessions/{id}/cart/items/{product_id}",
    params(
        ("id" = String, Path, description = "Session id"),
        ("product_id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartRes),
        (status = 404, description = "Unknown session", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn remove_cart_item(
    State(state): State<AppState>,
    AxumPath((id, product_id)): AxumPath<(String, String)>,
) -> ApiResult<CartRes> {
    let projection = with_session(&state, &id, move |session| {
        session.remove_from_cart(&ProductId::new(product_id))?;
        Ok(cart_projection(session))
    })
    .await?;
    Ok(Json(projection))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/checkout",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Now checking out", body = CartRes),
        (status = 409, description = "Empty cart or wrong state", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn advance_to_checkout(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<CartRes> {
    let projection = with_session(&state, &id, |session| {
        session.open_cart()?;
        session.advance_to_checkout()?;
        Ok(cart_projection(session))
    })
    .await?;
    Ok(Json(projection))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/checkout/back",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Back to cart review", body = CartRes),
        (status = 409, description = "Wrong state", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn back_to_cart(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<CartRes> {
    let projection = with_session(&state, &id, |session| {
        session.back_to_cart()?;
        Ok(cart_projection(session))
    })
    .await?;
    Ok(Json(projection))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/payment-intent",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "UPI payment intent", body = PaymentIntentRes),
        (status = 409, description = "Wrong state or empty cart", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn payment_intent(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<PaymentIntentRes> {
    let merchant = state.cfg.merchant().clone();
    let intent = with_session(&state, &id, move |session| {
        session.payment_intent(&merchant)
    })
    .await?;
    Ok(Json(PaymentIntentRes {
        order_id: intent.order_id.to_string(),
        amount: format!("{:.2}", intent.amount),
        uri: intent.uri,
    }))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/orders",
    params(("id" = String, Path, description = "Session id")),
    request_body = SubmitOrderReq,
    responses(
        (status = 201, description = "Order persisted", body = OrderReceiptRes),
        (status = 422, description = "Missing or invalid fields", body = ErrorRes),
        (status = 409, description = "Empty cart or wrong state", body = ErrorRes),
        (status = 502, description = "Order sink failure; cart preserved", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn submit_order(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    headers: HeaderMap,
    Json(req): Json<SubmitOrderReq>,
) -> Result<(StatusCode, Json<OrderReceiptRes>), ApiError> {
    let user_id = user_from_headers(&headers);
    let form = req.into_form();

    // Only this session is locked while the sink call is in flight.
    let (session_id, handle) = session_handle(&state, &id).await?;
    let mut session = handle.lock().await;

    let sink: &dyn OrderSink = state.sink.as_ref();
    match session.submit_order(&form, &user_id, sink).await {
        Ok(receipt) => Ok((
            StatusCode::CREATED,
            Json(OrderReceiptRes {
                order_id: receipt.order_id.to_string(),
                total: format!("{:.2}", receipt.total),
            }),
        )),
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "order submission failed");
            Err(store_error_response(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herb_core::MerchantConfig;
    use std::fs;

    const REMEDIES_CSV: &str = "\
Plant ID,Disease/Symptomes,Herbal plant,Preparation method,Dosage,Possible Reactions
R1,cough and cold,Tulsi,Boil leaves in water,Twice daily,None known
";
    const PLANTS_CSV: &str = "\
Product ID,Product Name,Scientific Name,Category,Description,Price (USD),Image URL,Usage,Region,Stock Quantity
H1,Neem Sapling,Azadirachta indica,Tree,Young neem plant,5.00,,Skin care,Asia,40
";
    const PRODUCTS_CSV: &str = "\
Id,Name,Description,Price,Image,Benefits,Available Stock
P1,Tulsi Drops,Concentrated extract,120.50,,Immunity,12
";

    fn test_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("diseases.csv"), REMEDIES_CSV).unwrap();
        fs::write(dir.path().join("plants.csv"), PLANTS_CSV).unwrap();
        fs::write(dir.path().join("products.csv"), PRODUCTS_CSV).unwrap();

        let merchant = MerchantConfig::new(
            "shop@oksbi".to_owned(),
            "HerbalShop".to_owned(),
            "INR".to_owned(),
        )
        .unwrap();
        let cfg = CoreConfig::new(
            dir.path().to_path_buf(),
            dir.path().join("orders"),
            merchant,
        )
        .unwrap();
        let state = AppState::initialise(Arc::new(cfg)).unwrap();
        (dir, state)
    }

    #[test]
    fn test_initialise_loads_all_datasets() {
        let (_dir, state) = test_state();
        assert_eq!(state.remedies.len(), 1);
        assert_eq!(state.plants.len(), 1);
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.combined.len(), 2);
    }

    #[test]
    fn test_initialise_rejects_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("diseases.csv"), REMEDIES_CSV).unwrap();
        fs::write(dir.path().join("plants.csv"), PLANTS_CSV).unwrap();
        fs::write(dir.path().join("products.csv"), PRODUCTS_CSV).unwrap();

        let merchant = MerchantConfig::new(
            "shop@oksbi".to_owned(),
            "HerbalShop".to_owned(),
            "INR".to_owned(),
        )
        .unwrap();
        let cfg = Arc::new(
            CoreConfig::new(
                dir.path().to_path_buf(),
                dir.path().join("orders"),
                merchant,
            )
            .unwrap(),
        );
        fs::write(dir.path().join("products.csv"), "Id,Name\n").unwrap();
        assert!(AppState::initialise(cfg).is_err());
    }

    #[test]
    fn test_error_mapping_status_codes() {
        let (status, _) = store_error_response(&StoreError::EmptySymptomQuery);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) =
            store_error_response(&StoreError::OutOfStock(ProductId::new("A")));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) =
            store_error_response(&StoreError::UnknownProduct(ProductId::new("A")));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = store_error_response(&StoreError::OrderSink("down".into()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_user_header_parsing() {
        let mut headers = HeaderMap::new();
        assert!(user_from_headers(&headers).is_guest());

        headers.insert(USER_ID_HEADER, "uid-42".parse().unwrap());
        assert_eq!(user_from_headers(&headers).as_str(), "uid-42");
    }

    #[tokio::test]
    async fn test_cart_flow_over_session_registry() {
        let (_dir, state) = test_state();
        let id = Uuid::new_v4();
        state
            .sessions
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(ShoppingSession::new())));
        let raw = id.to_string();

        let cart = with_session(&state, &raw, |session| {
            session.add_to_cart(&ProductId::new("P1"), &state.combined)?;
            Ok(cart_projection(session))
        })
        .await
        .unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total, "120.50");
        assert_eq!(cart.state, "browsing");

        let err = with_session(&state, &Uuid::new_v4().to_string(), |_| Ok(()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_locked_session_does_not_block_others() {
        let (_dir, state) = test_state();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        {
            let mut sessions = state.sessions.lock().await;
            sessions.insert(a, Arc::new(Mutex::new(ShoppingSession::new())));
            sessions.insert(b, Arc::new(Mutex::new(ShoppingSession::new())));
        }

        // Hold session A's lock the way an in-flight submission would.
        let (_, handle_a) = session_handle(&state, &a.to_string()).await.unwrap();
        let _guard = handle_a.lock().await;

        // Session B stays fully operable meanwhile.
        let cart = with_session(&state, &b.to_string(), |session| {
            session.add_to_cart(&ProductId::new("P1"), &state.combined)?;
            Ok(cart_projection(session))
        })
        .await
        .unwrap();
        assert_eq!(cart.lines.len(), 1);
    }
}
