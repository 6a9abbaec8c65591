use std::fmt;

use serde::Deserialize;

use crate::{
    client::AuthenticatedClient,
    config::ClientConfig,
    domain::Session,
    error::{MondoError, Result, require},
};

const GRANT_TYPE_PASSWORD: &str = "password";

#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        require("client_id", &self.client_id)?;
        require("client_secret", &self.client_secret)?;
        require("username", &self.username)?;
        require("password", &self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// Every field is optional so a partial body can be reported as malformed
// instead of failing inside serde.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    refresh_token: Option<String>,
    user_id: Option<String>,
    error: Option<String>,
}

/// Exchanges user credentials for a [`Session`] using the OAuth password grant.
#[derive(Debug, Clone)]
pub struct Authenticator {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Authenticator {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: config.http_client(),
            config,
        }
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        credentials.validate()?;

        let params = [
            ("grant_type", GRANT_TYPE_PASSWORD),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let res = self
            .http
            .post(self.config.url("oauth2/token"))
            .form(&params)
            .send()
            .await
            .inspect_err(|err| {
                tracing::error!("Error occurred in request to Mondo token API: {:#?}", err);
            })?;

        let status = res.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(
                "Token request rejected for client_id={}",
                credentials.client_id
            );
            return Err(MondoError::Unauthenticated);
        }

        let body = res.text().await?;
        let token_response = serde_json::from_str::<TokenResponse>(&body).map_err(|err| {
            tracing::error!("Error occurred while deserialising token response: {}", err);
            MondoError::MalformedResponse(format!("token response: {}", err))
        })?;

        if let Some(error) = token_response.error.as_deref().filter(|e| !e.is_empty()) {
            tracing::warn!("Token request returned error={}", error);
            return Err(MondoError::Unauthenticated);
        }

        if !status.is_success() {
            return Err(MondoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let session = session_from_token_response(token_response)?;

        tracing::info!(
            "Authenticated user_id={} until {}",
            session.user_id,
            session.expiry_time
        );

        Ok(session)
    }

    /// Authenticates and wraps the resulting session in a client sharing this configuration.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedClient> {
        let session = self.authenticate(credentials).await?;
        Ok(AuthenticatedClient::with_http_client(
            session,
            self.config.clone(),
            self.http.clone(),
        ))
    }
}

fn session_from_token_response(token_response: TokenResponse) -> Result<Session> {
    let TokenResponse {
        access_token,
        token_type,
        expires_in,
        refresh_token,
        user_id,
        ..
    } = token_response;

    let access_token = access_token.filter(|token| !token.is_empty());
    let token_type = token_type.filter(|token_type| !token_type.is_empty());
    let expires_in = expires_in.filter(|seconds| *seconds > 0);

    match (access_token, token_type, expires_in) {
        (Some(access_token), Some(token_type), Some(expires_in)) => {
            if refresh_token.is_some() {
                tracing::debug!("Ignoring refresh token, sessions are not refreshed");
            }
            Ok(Session::new(
                access_token,
                token_type,
                user_id.unwrap_or_default(),
                expires_in,
            ))
        }
        _ => Err(MondoError::MalformedResponse(String::from(
            "token response is missing access_token, token_type or expires_in",
        ))),
    }
}
