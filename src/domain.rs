use std::{collections::HashMap, fmt};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An access token and the moment it stops being accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub user_id: String,
    pub expiry_time: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: String, token_type: String, user_id: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type,
            user_id,
            expiry_time: future_datetime_from_seconds(expires_in),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiry_time
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("user_id", &self.user_id)
            .field("expiry_time", &self.expiry_time)
            .finish()
    }
}

fn future_datetime_from_seconds(duration_in_seconds: u64) -> DateTime<Utc> {
    i64::try_from(duration_in_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|duration| Utc::now().checked_add_signed(duration))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub sort_code: String,
    #[serde(default)]
    pub description: String,
    pub created: DateTime<Utc>,
}

/// A single card payment, top-up or transfer. Amounts are in minor units.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub account_id: String,
    pub amount: i64,
    /// Account balance immediately after this transaction, not a running total.
    #[serde(default)]
    pub account_balance: i64,
    pub currency: String,
    #[serde(default)]
    pub category: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    // Has been both a bool and a timestamp string across API versions.
    #[serde(default)]
    pub settled: Option<Value>,
    #[serde(default)]
    pub is_load: bool,
    #[serde(default)]
    pub merchant: Option<Merchant>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub attachments: Vec<Value>,
}

impl Transaction {
    pub fn is_settled(&self) -> bool {
        match &self.settled {
            None | Some(Value::Null) => false,
            Some(Value::Bool(settled)) => *settled,
            Some(Value::String(settled)) => !settled.is_empty(),
            Some(_) => true,
        }
    }

    pub fn merchant_name(&self) -> Option<&str> {
        self.merchant.as_ref().map(|merchant| merchant.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Merchant {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub category: String,
    pub created: String,
    pub emoji: String,
    pub logo: String,
    pub online: bool,
    pub address: MerchantAddress,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MerchantAddress {
    pub address: String,
    pub approximate: bool,
    pub city: String,
    pub country: String,
    pub formatted: String,
    pub latitude: f64,
    pub longitude: f64,
    pub postcode: String,
    pub region: String,
    pub short_formatted: String,
    pub zoom_level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Balance {
    pub balance: i64,
    pub currency: String,
    #[serde(default)]
    pub spend_today: i64,
}

/// Payload for a basic feed item. Colors fall back to the API defaults when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub image_url: String,
    pub body: String,
    pub background_color: Option<String>,
    pub body_color: Option<String>,
    pub title_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Webhook {
    pub id: String,
    pub account_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub external_id: String,
    pub file_url: String,
    pub file_type: String,
    pub created: DateTime<Utc>,
}

/// Body of the POST the API sends to a registered webhook URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Transaction,
}

impl WebhookEvent {
    pub fn is_transaction(&self) -> bool {
        matches!(
            self.event_type.as_str(),
            "transaction.created" | "transaction.updated"
        )
    }
}
