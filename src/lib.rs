//! Client for the Mondo banking API.
//!
//! [`Authenticator`] trades user credentials for a [`Session`], and
//! [`AuthenticatedClient`] uses it to call the account, balance, transaction,
//! feed, webhook and attachment endpoints.
//!
//! ```no_run
//! # async fn run() -> mondo::Result<()> {
//! use mondo::{Authenticator, ClientConfig, Credentials, list_all_transactions};
//!
//! let authenticator = Authenticator::new(ClientConfig::default());
//! let client = authenticator
//!     .login(&Credentials::new("client_id", "client_secret", "me@example.com", "password"))
//!     .await?;
//!
//! let accounts = client.list_accounts().await?;
//! let transactions = list_all_transactions(&client, &accounts[0].id).await?;
//! # Ok(())
//! # }
//! ```

mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pagination;

pub use auth::{Authenticator, Credentials};
pub use client::AuthenticatedClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use domain::{
    Account, Attachment, Balance, FeedItem, Merchant, MerchantAddress, Session, Transaction,
    Webhook, WebhookEvent,
};
pub use error::{MondoError, Result};
pub use pagination::{PAGE_SIZE, list_all_transactions, transaction_pages};
