use serde::{Deserialize, Serialize};

/// Claims carried by a SignalR access token.
///
/// `aud` is the exact URL the token authorizes (a client connection URL or
/// one REST send URL). `sub`, when present, binds the connection to a user
/// identity so user-targeted sends can reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Connection credentials handed to a client that wants to subscribe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub url: String,
    pub access_token: String,
}

/// Body of a hub send: invokes `target` on subscribers with `arguments`.
#[derive(Debug, Serialize)]
pub struct SendMessage {
    pub target: String,
    pub arguments: Vec<serde_json::Value>,
}
