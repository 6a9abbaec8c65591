use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    config::ClientConfig,
    domain::Session,
    error::{MondoError, Result},
};

/// Issues bearer-authenticated requests on behalf of one [`Session`].
///
/// The session is never refreshed. Once the token expires or the API answers
/// with a 401 the client stays unauthenticated and a new one has to be built
/// from a fresh session.
#[derive(Debug)]
pub struct AuthenticatedClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: Session,
    authenticated: AtomicBool,
}

impl AuthenticatedClient {
    pub fn new(session: Session, config: ClientConfig) -> Self {
        let http = config.http_client();
        Self::with_http_client(session, config, http)
    }

    pub(crate) fn with_http_client(
        session: Session,
        config: ClientConfig,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            config,
            session,
            authenticated: AtomicBool::new(true),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// True while the token has not reached its expiry time.
    pub fn is_valid(&self) -> bool {
        if Utc::now() < self.session.expiry_time {
            return true;
        }
        self.authenticated.store(false, Ordering::SeqCst);
        false
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Sends `params` as a query string for GET and DELETE, and as a form body for POST.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Response> {
        self.send(method, self.config.url(path), params).await
    }

    /// Like [`call`](Self::call) for `{collection}/{id}`, encoding `id` so it
    /// cannot change the rest of the URL.
    pub async fn call_resource(
        &self,
        method: Method,
        collection: &str,
        id: &str,
        params: &[(&str, &str)],
    ) -> Result<Response> {
        let url = self.config.resource_url(collection, id)?;
        self.send(method, url, params).await
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        params: &[(&str, &str)],
    ) -> Result<Response> {
        tracing::debug!("{} {}", method, url);

        let request = if method == Method::POST {
            self.http.request(method, &url).form(params)
        } else {
            let request = self.http.request(method, &url);
            if params.is_empty() {
                request
            } else {
                request.query(params)
            }
        };

        let res = request
            .bearer_auth(&self.session.access_token)
            .send()
            .await
            .inspect_err(|err| {
                tracing::error!("Error occurred in request to Mondo API {}: {:#?}", url, err)
            })?;

        tracing::debug!("Returned code: {}", res.status());

        if res.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Request to {} was rejected, session is no longer valid", url);
            self.authenticated.store(false, Ordering::SeqCst);
            return Err(MondoError::Unauthenticated);
        }

        Ok(res)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let res = self.call(Method::GET, path, params).await?;
        decode_json(res).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let res = self.call(Method::POST, path, params).await?;
        decode_json(res).await
    }
}

/// Maps 404 and other failed statuses to errors, then decodes the body as `T`.
pub async fn decode_json<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    if status == StatusCode::NOT_FOUND {
        return Err(MondoError::NotFound);
    }

    let body = res.text().await?;

    if !status.is_success() {
        tracing::error!("Mondo API returned status={} body={}", status, body);
        return Err(MondoError::Api {
            status: status.as_u16(),
            body,
        });
    }

    decode_body(&body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str::<T>(body).map_err(|err| {
        tracing::error!("Error occurred while deserialising response: {}", err);
        MondoError::MalformedResponse(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde::Deserialize;

    use super::*;

    fn client_expiring_in(seconds: i64) -> AuthenticatedClient {
        let mut session = Session::new("token".into(), "Bearer".into(), "user".into(), 60);
        session.expiry_time = Utc::now() + Duration::seconds(seconds);
        AuthenticatedClient::new(session, ClientConfig::default())
    }

    #[test]
    fn fresh_session_is_valid() {
        let client = client_expiring_in(3600);
        assert!(client.is_valid());
        assert!(client.is_authenticated());
    }

    #[test]
    fn expired_session_flips_authenticated_flag_once() {
        let client = client_expiring_in(-1);

        assert!(!client.is_valid());
        assert!(!client.is_authenticated());
        assert!(!client.is_valid());
        assert!(!client.is_authenticated());
    }

    #[derive(Debug, Deserialize)]
    struct Envelope {
        #[allow(dead_code)]
        accounts: Vec<String>,
    }

    #[test]
    fn mismatched_body_is_malformed() {
        assert!(matches!(
            decode_body::<Envelope>(r#"{"wrong": []}"#),
            Err(MondoError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_body::<Envelope>("<html>"),
            Err(MondoError::MalformedResponse(_))
        ));
        assert!(decode_body::<Envelope>(r#"{"accounts": ["acc_1"]}"#).is_ok());
    }
}
