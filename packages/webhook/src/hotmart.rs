//! Hotmart purchase notifications
//!
//! Hotmart posts `{ "event": "...", "data": { ... } }`. Only
//! `PURCHASE_COMPLETE` is acted upon; its `data` must name the buyer's
//! email, the product and the transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const PURCHASE_COMPLETE: &str = "PURCHASE_COMPLETE";

/// Envelope of every webhook call
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,

    #[serde(default)]
    pub data: Value,

    /// Hotmart's delivery id, when sent
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Error, Debug)]
pub enum PurchaseError {
    #[error("Purchase data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Purchase data is missing {0}")]
    MissingField(&'static str),

    #[error("Invalid buyer email: {0}")]
    InvalidEmail(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PurchaseData {
    buyer: Option<Buyer>,
    product: Option<Product>,
    purchase: Option<PurchaseInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Buyer {
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Product {
    id: Option<Value>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PurchaseInfo {
    transaction: Option<String>,
    price: Option<Price>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Price {
    value: Option<f64>,
    currency_value: Option<String>,
}

/// A completed purchase, as recorded by the service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub transaction: String,
    pub buyer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Validate the `data` of a `PURCHASE_COMPLETE` event
pub fn process_purchase(data: &Value) -> Result<Purchase, PurchaseError> {
    let data: PurchaseData = serde_json::from_value(data.clone())?;

    let buyer = data.buyer.unwrap_or_default();
    let buyer_email = non_empty(buyer.email).ok_or(PurchaseError::MissingField("buyer.email"))?;
    if !is_plausible_email(&buyer_email) {
        return Err(PurchaseError::InvalidEmail(buyer_email));
    }

    let product = data.product.unwrap_or_default();
    let product_id = match product.id {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(PurchaseError::MissingField("product.id")),
    };

    let purchase = data.purchase.unwrap_or_default();
    let transaction =
        non_empty(purchase.transaction).ok_or(PurchaseError::MissingField("purchase.transaction"))?;
    let price = purchase.price.unwrap_or_default();

    Ok(Purchase {
        transaction,
        buyer_email,
        buyer_name: non_empty(buyer.name),
        product_id,
        product_name: non_empty(product.name),
        amount: price.value,
        currency: non_empty(price.currency_value),
        received_at: Utc::now(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
