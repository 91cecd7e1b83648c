// Currency Registry - Web Server
// Read-only REST API over one shared registry instance

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use currency_registry::{heuristics, Currency, CurrencyRegistry, Heuristics};

/// Shared application state
#[derive(Clone)]
struct AppState {
    registry: CurrencyRegistry,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn err(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            error: Some(message.into()),
        }
    }
}

/// Currency response (flattened for API)
#[derive(Serialize)]
struct CurrencyResponse {
    id: String,
    code: String,
    name: Option<String>,
    iso_code: Option<String>,
    iso_numeric: Option<u32>,
    symbol: Option<String>,
    subunit: Option<String>,
    subunit_to_unit: u64,
    exponent: u32,
    symbol_first: bool,
    decimal_mark: Option<String>,
    thousands_separator: Option<String>,
    smallest_denomination: Option<u64>,
    is_iso: bool,
}

impl From<&Currency> for CurrencyResponse {
    fn from(currency: &Currency) -> Self {
        Self {
            id: currency.id().to_string(),
            code: currency.code(),
            name: currency.name(),
            iso_code: currency.iso_code().ok(),
            iso_numeric: currency.iso_numeric().ok(),
            symbol: currency.symbol(),
            subunit: currency.subunit(),
            subunit_to_unit: currency.subunit_to_unit(),
            exponent: currency.exponent(),
            symbol_first: currency.symbol_first(),
            decimal_mark: currency.decimal_mark(),
            thousands_separator: currency.thousands_separator(),
            smallest_denomination: currency.smallest_denomination().ok(),
            is_iso: currency.is_iso(),
        }
    }
}

/// Stats response
#[derive(Serialize)]
struct StatsResponse {
    total: usize,
    iso: usize,
    custom: usize,
    groups: Vec<GroupStat>,
}

#[derive(Serialize)]
struct GroupStat {
    group: String,
    count: usize,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/currencies - Every registered currency, in registration order
async fn list_currencies(State(state): State<AppState>) -> impl IntoResponse {
    let response: Vec<CurrencyResponse> = state
        .registry
        .all()
        .iter()
        .map(CurrencyResponse::from)
        .collect();

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

/// GET /api/currencies/:code - Look up one currency by identifier
async fn show_currency(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded identifier
    let decoded = urlencoding::decode(&code)
        .unwrap_or_else(|_| code.clone().into())
        .into_owned();

    match state.registry.find(&decoded) {
        Some(currency) => (
            StatusCode::OK,
            Json(ApiResponse::ok(Some(CurrencyResponse::from(&currency)))),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(
                None::<CurrencyResponse>,
                format!("unknown currency: {}", decoded),
            )),
        )
            .into_response(),
    }
}

/// GET /api/numeric/:num - Look up one currency by ISO numeric code
async fn show_by_numeric(
    State(state): State<AppState>,
    Path(num): Path<String>,
) -> impl IntoResponse {
    match state.registry.find_by_iso_numeric(&num) {
        Some(currency) => (
            StatusCode::OK,
            Json(ApiResponse::ok(Some(CurrencyResponse::from(&currency)))),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(
                None::<CurrencyResponse>,
                format!("no currency assigned to numeric code: {}", num),
            )),
        )
            .into_response(),
    }
}

/// GET /api/stats - ISO/custom partition and heuristic grouping
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let handles = state.registry.all();
    let total = handles.len();

    let (iso, custom) = heuristics::partition_iso(handles);

    let engine = Heuristics::with_default_rules();
    let groups: Vec<GroupStat> = engine
        .group(&state.registry.all())
        .into_iter()
        .map(|(group, members)| GroupStat {
            group,
            count: members.len(),
        })
        .collect();

    let stats = StatsResponse {
        total,
        iso: iso.len(),
        custom: custom.len(),
        groups,
    };

    (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Currency Registry - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Seed the shared registry
    let registry = CurrencyRegistry::new();
    println!("✓ Seeded {} currencies", registry.count());

    let state = AppState { registry };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/currencies", get(list_currencies))
        .route("/currencies/:code", get(show_currency))
        .route("/numeric/:num", get(show_by_numeric))
        .route("/stats", get(get_stats))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/currencies");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
