use reqwest::{Method, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::{
    client::{AuthenticatedClient, decode_body, decode_json},
    domain::{Account, Attachment, Balance, FeedItem, Transaction, Webhook},
    error::{MondoError, Result, require},
};

const DEFAULT_BACKGROUND_COLOR: &str = "#FCF1EE";
const DEFAULT_BODY_COLOR: &str = "#FCF1EE";
const DEFAULT_TITLE_COLOR: &str = "#333";

#[derive(Debug, Deserialize)]
struct ListAccountsResponse {
    accounts: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct ListTransactionsResponse {
    transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    transaction: Transaction,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeedItemResponse {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WebhookResponse {
    webhook: Webhook,
}

#[derive(Debug, Deserialize)]
struct ListWebhooksResponse {
    webhooks: Vec<Webhook>,
}

#[derive(Debug, Deserialize)]
struct AttachmentResponse {
    attachment: Attachment,
}

impl AuthenticatedClient {
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        tracing::info!("Listing accounts...");

        self.get_json::<ListAccountsResponse>("accounts", &[])
            .await
            .map(|res| res.accounts)
    }

    pub async fn get_balance(&self, account_id: &str) -> Result<Balance> {
        require("account_id", account_id)?;

        tracing::info!("Reading balance for account_id={}", account_id);

        self.get_json::<Balance>("balance", &[("account_id", account_id)])
            .await
    }

    /// Lists up to `limit` transactions with the merchant expanded.
    ///
    /// `since` accepts a timestamp or a transaction id, which is how pages are
    /// chained together.
    pub async fn list_transactions(
        &self,
        account_id: &str,
        since: Option<&str>,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Transaction>> {
        require("account_id", account_id)?;
        if limit == 0 {
            return Err(MondoError::InvalidInput(String::from(
                "limit must be greater than zero",
            )));
        }

        tracing::info!("Listing transactions for account_id={}", account_id);

        let limit_param = limit.to_string();
        let mut params = vec![
            ("account_id", account_id),
            ("expand[]", "merchant"),
            ("limit", limit_param.as_str()),
        ];
        if let Some(since) = since.filter(|since| !since.is_empty()) {
            params.push(("since", since));
        }
        if let Some(before) = before.filter(|before| !before.is_empty()) {
            params.push(("before", before));
        }

        let mut transactions = self
            .get_json::<ListTransactionsResponse>("transactions", &params)
            .await
            .map(|res| res.transactions)?;

        transactions.truncate(limit);
        Ok(transactions)
    }

    pub async fn get_transaction(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Transaction> {
        require("account_id", account_id)?;
        require("transaction_id", transaction_id)?;

        tracing::info!(
            "Reading transaction id={} for account_id={}",
            transaction_id,
            account_id
        );

        let res = self
            .call_resource(
                Method::GET,
                "transactions",
                transaction_id,
                &[("account_id", account_id), ("expand[]", "merchant")],
            )
            .await?;

        decode_json::<TransactionResponse>(res)
            .await
            .map(|res| res.transaction)
    }

    /// Creates a basic feed item. Feed items cannot be deleted afterwards.
    pub async fn create_feed_item(&self, account_id: &str, item: &FeedItem) -> Result<()> {
        require("account_id", account_id)?;
        require("title", &item.title)?;
        require("image_url", &item.image_url)?;
        require("body", &item.body)?;

        let background_color = color_or(&item.background_color, DEFAULT_BACKGROUND_COLOR);
        let body_color = color_or(&item.body_color, DEFAULT_BODY_COLOR);
        let title_color = color_or(&item.title_color, DEFAULT_TITLE_COLOR);

        tracing::info!("Creating feed item for account_id={}", account_id);

        let params = [
            ("account_id", account_id),
            ("type", "basic"),
            ("params[title]", item.title.as_str()),
            ("params[image_url]", item.image_url.as_str()),
            ("params[background_color]", background_color),
            ("params[body_color]", body_color),
            ("params[title_color]", title_color),
            ("params[body]", item.body.as_str()),
        ];

        let res = self.call(Method::POST, "feed", &params).await?;
        let status = res.status();
        let body = res.text().await?;

        // Errors come back as {code, message}, sometimes with a 2xx status.
        let feed_response = if body.trim().is_empty() {
            FeedItemResponse::default()
        } else {
            match decode_body::<FeedItemResponse>(&body) {
                Ok(feed_response) => feed_response,
                Err(_) if !status.is_success() => {
                    return Err(MondoError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => return Err(err),
            }
        };

        if !feed_response.code.is_empty() {
            tracing::error!(
                "Feed item rejected code={} message={}",
                feed_response.code,
                feed_response.message
            );
            return Err(MondoError::Feed {
                code: feed_response.code,
                message: feed_response.message,
            });
        }

        if !status.is_success() {
            return Err(MondoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Registers `url` to receive a POST for every new transaction on the account.
    /// Failed deliveries are retried by the API, not by this client.
    pub async fn register_webhook(&self, account_id: &str, url: &str) -> Result<Webhook> {
        require("account_id", account_id)?;
        require("url", url)?;
        Url::parse(url).map_err(|err| {
            MondoError::InvalidInput(format!("invalid webhook url '{}': {}", url, err))
        })?;

        tracing::info!(
            "Registering webhook for account_id={} url={}",
            account_id,
            url
        );

        self.post_json::<WebhookResponse>("webhooks", &[("account_id", account_id), ("url", url)])
            .await
            .map(|res| res.webhook)
    }

    pub async fn list_webhooks(&self, account_id: &str) -> Result<Vec<Webhook>> {
        require("account_id", account_id)?;

        tracing::info!("Listing webhooks for account_id={}", account_id);

        self.get_json::<ListWebhooksResponse>("webhooks", &[("account_id", account_id)])
            .await
            .map(|res| res.webhooks)
    }

    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<()> {
        require("webhook_id", webhook_id)?;

        tracing::info!("Deleting webhook id={}", webhook_id);

        let res = self
            .call_resource(Method::DELETE, "webhooks", webhook_id, &[])
            .await?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(MondoError::NotFound),
            status if status.is_success() => Ok(()),
            status => Err(MondoError::Api {
                status: status.as_u16(),
                body: res.text().await?,
            }),
        }
    }

    /// Registers a hosted file so it can be shown against a transaction.
    pub async fn register_attachment(
        &self,
        external_id: &str,
        file_url: &str,
        file_type: &str,
    ) -> Result<Attachment> {
        require("external_id", external_id)?;
        require("file_url", file_url)?;
        require("file_type", file_type)?;

        tracing::info!("Registering attachment for external_id={}", external_id);

        let res = self
            .call(
                Method::POST,
                "attachment/register",
                &[
                    ("external_id", external_id),
                    ("file_type", file_type),
                    ("file_url", file_url),
                ],
            )
            .await?;

        decode_json::<AttachmentResponse>(res)
            .await
            .map(|res| res.attachment)
    }
}

fn color_or<'a>(color: &'a Option<String>, default: &'a str) -> &'a str {
    color
        .as_deref()
        .filter(|color| !color.is_empty())
        .unwrap_or(default)
}
