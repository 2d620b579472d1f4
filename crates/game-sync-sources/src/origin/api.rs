use crate::error::SourceError;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

const CONNECT_AUTH_URL: &str = "https://accounts.ea.com/connect/auth?client_id=ORIGIN_JS_SDK&response_type=token&redirect_uri=nucleus:rest&prompt=none&release_type=prod";
const IDENTITY_URL: &str = "https://gateway.ea.com/proxy/identity/pids/me";
const API_BASE: &str = "https://api1.origin.com";

#[derive(Debug, Deserialize)]
struct ConnectAuthResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PidResponse {
    pid: Pid,
}

#[derive(Debug, Deserialize)]
struct Pid {
    #[serde(rename = "pidId")]
    pid_id: u64,
}

#[derive(Debug, Deserialize)]
struct AtomUsersResponse {
    #[serde(default)]
    users: Vec<AtomUser>,
}

#[derive(Debug, Deserialize)]
struct AtomUser {
    #[serde(rename = "personaId")]
    persona_id: String,
    #[serde(rename = "eaId")]
    ea_id: String,
}

#[derive(Debug, Deserialize)]
struct EntitlementsResponse {
    #[serde(default)]
    entitlements: Vec<Entitlement>,
}

/// One entry of the consolidated entitlement list.
#[derive(Debug, Clone, Deserialize)]
pub struct Entitlement {
    #[serde(rename = "offerId")]
    pub offer_id: String,
    #[serde(rename = "offerType")]
    pub offer_type: String,
}

#[derive(Debug, Deserialize)]
pub struct Offer {
    #[serde(rename = "masterTitleId")]
    pub master_title_id: String,
    #[serde(default)]
    pub platforms: Vec<OfferPlatform>,
    pub i18n: OfferI18n,
}

#[derive(Debug, Deserialize)]
pub struct OfferPlatform {
    #[serde(rename = "multiPlayerId")]
    pub multi_player_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OfferI18n {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    #[serde(default)]
    total: u64,
    #[serde(rename = "lastSessionEndTimeStamp")]
    last_session_end: Option<String>,
}

/// Playtime detail assembled for one entitlement.
#[derive(Debug, Clone)]
pub struct OfferUsage {
    pub display_name: String,
    pub total_minutes: u64,
    pub last_played: u64,
}

/// Exchange the caller's session cookies for a bearer token via the connect
/// prompt=none grant.
pub async fn authenticate(
    client: &Client,
    cookies: &HashMap<String, String>,
) -> Result<String, SourceError> {
    let cookie_header = cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ");

    let response = client
        .get(CONNECT_AUTH_URL)
        .header("Cookie", cookie_header)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::Auth(format!(
            "connect auth rejected: {}",
            response.status()
        )));
    }

    let auth: ConnectAuthResponse = response.json().await?;
    match auth.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(SourceError::Auth(
            auth.error
                .unwrap_or_else(|| "no access token in connect auth response".to_string()),
        )),
    }
}

/// Resolve `(user_id, persona_id, display_name)` for the token's account.
pub async fn get_identity(
    client: &Client,
    access_token: &str,
) -> Result<(String, String, String), SourceError> {
    let response = client
        .get(IDENTITY_URL)
        .header("AuthToken", access_token)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::from_response(response).await);
    }

    let pid: PidResponse = response.json().await?;
    let user_id = pid.pid.pid_id.to_string();

    let url = format!("{}/atom/users?userIds={}", API_BASE, user_id);
    let response = client
        .get(&url)
        .header("AuthToken", access_token)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::from_response(response).await);
    }

    let users: AtomUsersResponse = response.json().await?;
    let user = users
        .users
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::Malformed("atom users response was empty".to_string()))?;

    Ok((user_id, user.persona_id, user.ea_id))
}

/// Fetch the full consolidated entitlement list for the user.
pub async fn get_entitlements(
    client: &Client,
    access_token: &str,
    user_id: &str,
) -> Result<Vec<Entitlement>, SourceError> {
    let url = format!(
        "{}/ecommerce2/consolidatedentitlements/{}?machine_hash=1",
        API_BASE, user_id
    );

    let response = client
        .get(&url)
        .header("AuthToken", access_token)
        .header("Accept", "application/vnd.origin.v3+json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::from_response(response).await);
    }

    let entitlements: EntitlementsResponse = response.json().await?;
    Ok(entitlements.entitlements)
}

/// Fetch the public offer record for one offer id.
pub async fn get_offer(client: &Client, offer_id: &str) -> Result<Offer, SourceError> {
    let url = format!("{}/ecommerce2/public/supercat/{}/en_US", API_BASE, offer_id);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::from_response(response).await);
    }

    Ok(response.json().await?)
}

/// Fetch `(total_minutes, last_played_epoch)` for one master title.
pub async fn get_game_time(
    client: &Client,
    access_token: &str,
    user_id: &str,
    master_title_id: &str,
    multiplayer_id: Option<&str>,
) -> Result<(u64, u64), SourceError> {
    let url = format!(
        "{}/atom/users/{}/games/{}/usage",
        API_BASE, user_id, master_title_id
    );

    let mut request = client
        .get(&url)
        .header("AuthToken", access_token)
        .header("Accept", "application/json");
    if let Some(multiplayer_id) = multiplayer_id {
        request = request.query(&[("multiPlayerId", multiplayer_id)]);
    }

    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(SourceError::from_response(response).await);
    }

    let usage: UsageResponse = response.json().await?;
    let last_played = parse_last_session(usage.last_session_end.as_deref());
    Ok((usage.total, last_played))
}

/// Only real, purchasable base titles reach the detail lookups; expansions,
/// DLC, and currency offers are filtered out here.
pub fn base_game_entitlements(entitlements: Vec<Entitlement>) -> Vec<Entitlement> {
    entitlements
        .into_iter()
        .filter(|entitlement| entitlement.offer_type == "basegame")
        .collect()
}

/// First platform entry carrying a usable multiplayer id, in list order.
/// Absence is legal; plenty of offers are single-player only.
pub fn select_multiplayer_id(platforms: &[OfferPlatform]) -> Option<&str> {
    platforms
        .iter()
        .find_map(|platform| platform.multi_player_id.as_deref().filter(|id| !id.is_empty()))
}

fn parse_last_session(raw: Option<&str>) -> u64 {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|stamp| stamp.timestamp().max(0) as u64)
        .unwrap_or(0)
}
