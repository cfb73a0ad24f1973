//! Azure SignalR Service REST client.
//!
//! Mints the signed access tokens the service expects and pushes named
//! events to groups or users over its REST surface. Tokens are short-lived
//! HS256 JWTs whose audience is the exact URL they authorize; the service
//! validates them against the shared access key.

pub mod error;
pub mod models;

pub use error::{Result, SignalRError};
pub use models::{Claims, ConnectionInfo};

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;

use crate::models::SendMessage;

/// Default access token lifetime in seconds.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Upper bound on a single REST send.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SignalROptions {
    /// Service endpoint, e.g. `https://contoso.service.signalr.net`
    pub endpoint: String,
    /// Shared access key used to sign tokens
    pub access_key: String,
    /// Hub name, one logical broadcast channel
    pub hub: String,
}

#[derive(Clone)]
pub struct SignalRService {
    options: SignalROptions,
    client: Client,
    token_ttl_secs: i64,
}

impl SignalRService {
    pub fn new(options: SignalROptions) -> Self {
        Self {
            options,
            client: Client::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    /// Override the token lifetime (seconds).
    pub fn with_token_ttl(mut self, secs: i64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Mint an access token scoped to `audience`, optionally bound to a
    /// user identity. Tokens are stateless and unrevocable before expiry;
    /// their blast radius is read/subscribe access on one channel.
    pub fn issue_token(&self, audience: &str, subject: Option<&str>) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            aud: audience.to_string(),
            sub: subject.map(|s| s.to_string()),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_ttl_secs)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.options.access_key.as_bytes()),
        )
        .map_err(Into::into)
    }

    /// Connection credentials for a client that wants to subscribe to the
    /// hub. Binding `user_id` lets user-targeted sends reach this
    /// connection.
    pub fn negotiate(&self, user_id: Option<&str>) -> Result<ConnectionInfo> {
        let url = format!("{}/client/?hub={}", self.options.endpoint, self.options.hub);
        let access_token = self.issue_token(&url, user_id)?;
        Ok(ConnectionInfo { url, access_token })
    }

    /// Invoke `target(payload)` on every connection in a group.
    pub async fn send_to_group(
        &self,
        group: &str,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        let url = format!(
            "{}/hubs/{}/groups/{}/send",
            self.options.endpoint, self.options.hub, group
        );
        self.send(&url, target, payload).await
    }

    /// Invoke `target(payload)` on every connection bound to a user.
    pub async fn send_to_user(
        &self,
        user_id: &str,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        let url = format!(
            "{}/hubs/{}/users/{}/send",
            self.options.endpoint, self.options.hub, user_id
        );
        self.send(&url, target, payload).await
    }

    async fn send(&self, url: &str, target: &str, payload: serde_json::Value) -> Result<()> {
        // Each send authorizes itself with a freshly minted token whose
        // audience is the request URL.
        let token = self.issue_token(url, None)?;
        let message = SendMessage {
            target: target.to_string(),
            arguments: vec![payload],
        };

        tracing::debug!(url, target, "Sending SignalR event");

        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(token)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SignalRError::Api { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn test_service() -> SignalRService {
        SignalRService::new(SignalROptions {
            endpoint: "https://unit.service.signalr.net".to_string(),
            access_key: "test_access_key".to_string(),
            hub: "askai".to_string(),
        })
    }

    fn decode_claims(token: &str, key: &str, audience: &str) -> Claims {
        let mut validation = Validation::default();
        validation.set_audience(&[audience]);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(key.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn test_issue_and_verify_token() {
        let service = test_service();
        let token = service.issue_token("https://aud.example", None).unwrap();

        let claims = decode_claims(&token, "test_access_key", "https://aud.example");
        assert_eq!(claims.aud, "https://aud.example");
        assert!(claims.sub.is_none());

        // Default lifetime is ~3600 seconds
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 3600);
    }

    #[test]
    fn test_token_carries_subject() {
        let service = test_service();
        let token = service
            .issue_token("https://aud.example", Some("author-123"))
            .unwrap();

        let claims = decode_claims(&token, "test_access_key", "https://aud.example");
        assert_eq!(claims.sub.as_deref(), Some("author-123"));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let service = test_service();
        let token = service.issue_token("https://aud.example", None).unwrap();

        let mut validation = Validation::default();
        validation.set_audience(&["https://aud.example"]);
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"some_other_key"),
            &validation,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_negotiate_binds_hub_and_user() {
        let service = test_service().with_token_ttl(60);
        let info = service.negotiate(Some("author-123")).unwrap();

        assert_eq!(
            info.url,
            "https://unit.service.signalr.net/client/?hub=askai"
        );

        let claims = decode_claims(&info.access_token, "test_access_key", &info.url);
        assert_eq!(claims.sub.as_deref(), Some("author-123"));
        assert_eq!(claims.exp - claims.iat, 60);
    }
}
