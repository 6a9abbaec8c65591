#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Form, Json, Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use mondo::{AuthenticatedClient, Authenticator, ClientConfig, Credentials};
use serde_json::{Value, json};

pub const ACCESS_TOKEN: &str = "access_token";
pub const EXPIRES_IN: i64 = 21600;

/// Counts requests and keeps the parameters of the most recent one.
#[derive(Clone, Default)]
pub struct Recorder {
    hits: Arc<AtomicUsize>,
    params: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Recorder {
    pub fn record(&self, params: HashMap<String, String>) -> usize {
        self.params.lock().unwrap().push(params);
        self.hits.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.params.lock().unwrap().clone()
    }

    pub fn last(&self) -> HashMap<String, String> {
        self.requests().pop().expect("no request recorded")
    }
}

pub fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", ACCESS_TOKEN))
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("client_secret").map(String::as_str) != Some("valid")
        || form.get("grant_type").map(String::as_str) != Some("password")
    {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "client_id": form.get("client_id"),
        "expires_in": EXPIRES_IN,
        "refresh_token": "refresh_token",
        "token_type": "Bearer",
        "user_id": "user_id"
    }))
    .into_response()
}

/// Serves `routes` plus a token endpoint that only accepts the client secret "valid".
pub async fn spawn(routes: Router) -> ClientConfig {
    serve(Router::new().route("/oauth2/token", post(token)).merge(routes)).await
}

/// Serves `app` as is, for tests that provide their own token endpoint.
pub async fn serve(app: Router) -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock server");
    let addr = listener.local_addr().expect("mock server has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server failed");
    });

    ClientConfig::new(&format!("http://{}", addr)).expect("invalid mock server url")
}

pub fn valid_credentials() -> Credentials {
    Credentials::new("some", "valid", "credentials", "here")
}

pub async fn login(config: &ClientConfig) -> AuthenticatedClient {
    Authenticator::new(config.clone())
        .login(&valid_credentials())
        .await
        .expect("login against mock server failed")
}

pub fn transaction_json(id: &str) -> Value {
    json!({
        "account_balance": 13013,
        "amount": -510,
        "created": "2015-08-22T12:20:18Z",
        "currency": "GBP",
        "description": "THE DE BEAUVOIR DELI C LONDON        GBR",
        "id": id,
        "merchant": {
            "address": {
                "address": "98 Southgate Road",
                "city": "London",
                "country": "GB",
                "latitude": 51.54151,
                "longitude": -0.08482400000002599,
                "postcode": "N1 3JD",
                "region": "Greater London"
            },
            "created": "2015-08-22T12:20:18Z",
            "group_id": "grp_00008zIcpbBOaAr7TTP3sv",
            "id": "merch_00008zIcpbAKe8shBxXUtl",
            "logo": "https://example.com/logo.jpeg",
            "emoji": "🍞",
            "name": "The De Beauvoir Deli Co.",
            "category": "eating_out"
        },
        "metadata": {},
        "notes": "Salmon sandwich 🍞",
        "is_load": false,
        "settled": true,
        "category": "eating_out"
    })
}
