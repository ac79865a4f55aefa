//! # Quiz Funnel Webhook
//!
//! HTTP endpoint receiving Hotmart payment notifications for the funnel's
//! offer page.
//!
//! | request                                      | response |
//! |----------------------------------------------|----------|
//! | `POST` valid `PURCHASE_COMPLETE`             | `200`    |
//! | `POST` `PURCHASE_COMPLETE`, bad purchase data| `400`    |
//! | `POST` any other event                       | `200`, `processed: false` |
//! | any other method                             | `405`    |
//! | unreadable body                              | `500`    |

pub mod hotmart;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use hotmart::{process_purchase, Purchase, WebhookEvent, PURCHASE_COMPLETE};
use serde_json::json;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const HOTMART_PATH: &str = "/api/webhook/hotmart";

/// Purchases kept in memory, and the window for duplicate detection
pub const DEFAULT_RECENT_PURCHASES: usize = 10_000;

#[derive(Debug, Default)]
struct Ledger {
    recent: VecDeque<Purchase>,
    transactions: HashSet<String>,
}

/// Most recent purchases received since the service started
#[derive(Clone)]
pub struct WebhookState {
    ledger: Arc<RwLock<Ledger>>,
    capacity: usize,
}

impl Default for WebhookState {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECENT_PURCHASES)
    }
}

impl WebhookState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(Ledger::default())),
            capacity: capacity.max(1),
        }
    }

    /// Oldest first
    pub async fn purchases(&self) -> Vec<Purchase> {
        self.ledger.read().await.recent.iter().cloned().collect()
    }

    /// Record a purchase unless its transaction was already seen
    async fn record(&self, purchase: Purchase) -> bool {
        let mut ledger = self.ledger.write().await;
        if !ledger.transactions.insert(purchase.transaction.clone()) {
            return false;
        }

        ledger.recent.push_back(purchase);
        while ledger.recent.len() > self.capacity {
            if let Some(evicted) = ledger.recent.pop_front() {
                ledger.transactions.remove(&evicted.transaction);
            }
        }
        true
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route(HOTMART_PATH, post(hotmart_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn hotmart_webhook(State(state): State<WebhookState>, body: Bytes) -> Response {
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Unreadable webhook body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Internal server error" })),
            )
                .into_response();
        }
    };

    if event.event != PURCHASE_COMPLETE {
        info!(event = %event.event, "Ignoring webhook event");
        return Json(json!({
            "success": true,
            "processed": false,
            "event": event.event,
        }))
        .into_response();
    }

    match process_purchase(&event.data) {
        Ok(purchase) => {
            info!(
                transaction = %purchase.transaction,
                product = %purchase.product_id,
                "Purchase completed"
            );
            let transaction = purchase.transaction.clone();
            let recorded = state.record(purchase).await;
            Json(json!({
                "success": true,
                "processed": true,
                "duplicate": !recorded,
                "transaction": transaction,
            }))
            .into_response()
        }
        Err(e) => {
            warn!(error = %e, delivery = ?event.id, "Purchase could not be processed");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
