// 🌐 Web Layer - HTTP API and HTML summary view

use axum::{
    extract::{Form, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::services::ServeDir;

use crate::balance;
use crate::money::Money;
use crate::store::{DebtEntry, LedgerError, LedgerStore};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<LedgerStore>>,
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
}

impl<T: Default> ApiResponse<T> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: T::default(),
            error: Some(message.into()),
        }
    }
}

/// Summary response: who owes whom overall
#[derive(Serialize)]
struct SummaryResponse {
    debtor: String,
    creditor: String,
    amount_cents: i64,
    amount: String,
    balances: Vec<BalanceResponse>,
    entry_count: usize,
}

/// One party's net position
#[derive(Serialize)]
struct BalanceResponse {
    name: String,
    balance_cents: i64,
    balance: String,
}

/// Entry response (one ledger row)
#[derive(Serialize)]
struct EntryResponse {
    debtor: String,
    creditor: String,
    amount_cents: i64,
    amount: String,
    note: String,
    created_at: String,
}

/// Party detail response
#[derive(Serialize)]
struct PartyResponse {
    name: String,
    balance_cents: i64,
    balance: String,
    total_owed_cents: i64,
    total_owed: String,
    entry_count: usize,
}

/// Add-entry form posted by the summary page
#[derive(Deserialize)]
struct AddEntryForm {
    debtor: String,
    creditor: String,
    amount: String,
    #[serde(default)]
    notes: String,
}

fn entry_response(store: &LedgerStore, entry: &DebtEntry) -> EntryResponse {
    EntryResponse {
        debtor: store.roster().name(entry.debtor).to_string(),
        creditor: store.roster().name(entry.creditor).to_string(),
        amount_cents: entry.amount.cents,
        amount: entry.amount.to_string(),
        note: entry.note.clone(),
        created_at: entry.created_at.to_rfc3339(),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/summary - Who owes whom overall, plus every net position
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().unwrap();
    let summary = balance::summarize(store.roster(), store.entries());
    let net = balance::balances(store.roster(), store.entries());

    let balances: Vec<BalanceResponse> = store
        .roster()
        .parties()
        .iter()
        .zip(&net)
        .map(|(party, amount)| BalanceResponse {
            name: party.name.clone(),
            balance_cents: amount.cents,
            balance: amount.to_string(),
        })
        .collect();

    Json(ApiResponse::ok(SummaryResponse {
        debtor: store.roster().name(summary.debtor).to_string(),
        creditor: store.roster().name(summary.creditor).to_string(),
        amount_cents: summary.amount.cents,
        amount: summary.amount.to_string(),
        balances,
        entry_count: store.entries().len(),
    }))
}

/// GET /api/entries - Full ledger history, oldest first
async fn get_entries(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().unwrap();

    let response: Vec<EntryResponse> = store
        .entries()
        .iter()
        .map(|entry| entry_response(&store, entry))
        .collect();

    Json(ApiResponse::ok(response))
}

/// GET /api/parties/:name - Balance detail for one party
async fn get_party(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let store = state.store.lock().unwrap();

    // Decode URL-encoded name
    let decoded_name = urlencoding::decode(&name)
        .unwrap_or_else(|_| name.clone().into())
        .into_owned();

    match store.roster().resolve(&decoded_name) {
        Some(id) => {
            let net = balance::balances(store.roster(), store.entries());
            let owed = balance::owed_totals(store.roster(), store.entries());
            let entry_count = store
                .entries()
                .iter()
                .filter(|e| e.debtor == id || e.creditor == id)
                .count();

            let response = PartyResponse {
                name: decoded_name,
                balance_cents: net[id.0].cents,
                balance: net[id.0].to_string(),
                total_owed_cents: owed[id.0].cents,
                total_owed: owed[id.0].to_string(),
                entry_count,
            };
            (StatusCode::OK, Json(ApiResponse::ok(Some(response)))).into_response()
        }
        None => {
            let error = LedgerError::UnknownParty { name: decoded_name };
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Option<PartyResponse>>::err(error.to_string())),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Form Handler
// ============================================================================

/// POST / - Record a new debt entry, then redirect back to the summary page
async fn add_entry(
    State(state): State<AppState>,
    Form(form): Form<AddEntryForm>,
) -> impl IntoResponse {
    let mut store = state.store.lock().unwrap();

    let debtor = match store.roster().resolve(&form.debtor) {
        Some(id) => id,
        None => {
            let error = LedgerError::UnknownParty { name: form.debtor };
            return (StatusCode::BAD_REQUEST, error.to_string()).into_response();
        }
    };
    let creditor = match store.roster().resolve(&form.creditor) {
        Some(id) => id,
        None => {
            let error = LedgerError::UnknownParty { name: form.creditor };
            return (StatusCode::BAD_REQUEST, error.to_string()).into_response();
        }
    };
    let amount = match Money::parse(&form.amount) {
        Ok(amount) => amount,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let entry = match DebtEntry::new(debtor, creditor, amount, form.notes) {
        Ok(entry) => entry,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match store.append(entry) {
        // 301 with a bare Location header; axum's Redirect helpers send
        // 303/307/308 and this endpoint answers 301.
        Ok(()) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/")]).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to save entry: {:#}", e),
        )
            .into_response(),
    }
}

// ============================================================================
// Pages
// ============================================================================

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

/// Assemble the full application router around a shared ledger store.
pub fn build_app(store: Arc<Mutex<LedgerStore>>) -> Router {
    let state = AppState { store };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/summary", get(get_summary))
        .route("/entries", get(get_entries))
        .route("/parties/:name", get(get_party));

    Router::new()
        .route("/", get(serve_index).post(add_entry))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .fallback(serve_index)
        .with_state(state)
}
