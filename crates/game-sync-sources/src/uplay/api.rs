use crate::error::SourceError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const UBI_APP_ID: &str = "685a3038-2b04-47ee-9c5a-6403381a46aa";
const SESSIONS_URL: &str = "https://public-ubiservices.ubi.com/v3/profiles/sessions";
const GRAPHQL_URL: &str = "https://public-ubiservices.ubi.com/v1/profiles/me/graphql";
const STATS_BASE: &str = "https://public-ubiservices.ubi.com/v1/profiles";

const OWNED_GAMES_QUERY: &str = "query { viewer { ownedGames { nodes { spaceId name } } } }";

/// The three local-storage blobs the Connect web client leaves behind, in
/// the order the caller hands them over.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pub login_data: String,
    pub remember_me: String,
    pub last_profile: String,
}

impl From<[String; 3]> for LocalStorage {
    fn from([login_data, remember_me, last_profile]: [String; 3]) -> Self {
        Self {
            login_data,
            remember_me,
            last_profile,
        }
    }
}

/// Live Connect session state. Held in memory for one sync, then torn down.
#[derive(Debug, Clone)]
pub struct UbiSession {
    pub session_id: String,
    pub ticket: String,
    pub user_id: String,
    pub profile_id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    ticket: String,
    #[serde(rename = "sessionId")]
    session_id: String,
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "profileId")]
    profile_id: String,
    #[serde(rename = "nameOnPlatform")]
    name_on_platform: String,
}

#[derive(Debug, Deserialize)]
struct ClubTitlesResponse {
    data: ClubData,
}

#[derive(Debug, Deserialize)]
struct ClubData {
    viewer: ClubViewer,
}

#[derive(Debug, Deserialize)]
struct ClubViewer {
    #[serde(rename = "ownedGames")]
    owned_games: OwnedGames,
}

#[derive(Debug, Deserialize)]
struct OwnedGames {
    #[serde(default)]
    nodes: Vec<OwnedGameNode>,
}

/// One owned title from the club graph.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedGameNode {
    #[serde(rename = "spaceId")]
    pub space_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "Statscards")]
    pub statscards: Option<Vec<StatCard>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatCard {
    #[serde(rename = "statName")]
    pub stat_name: String,
    pub value: Option<serde_json::Value>,
}

/// The two time stats extracted from a stat-card collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatTimes {
    pub playtime_secs: u64,
    pub last_played: u64,
}

/// Connect keeps its web session values JSON-encoded in local storage, so a
/// blob is usually a quoted string; raw tickets show up too.
pub fn remember_me_ticket(blob: &str) -> String {
    serde_json::from_str::<String>(blob).unwrap_or_else(|_| blob.trim().to_string())
}

/// Redeem the remember-me ticket for a fresh session.
pub async fn create_session(
    client: &Client,
    storage: &LocalStorage,
) -> Result<UbiSession, SourceError> {
    let ticket = remember_me_ticket(&storage.remember_me);
    if ticket.is_empty() {
        return Err(SourceError::Auth("remember-me ticket is empty".to_string()));
    }

    let response = client
        .post(SESSIONS_URL)
        .header("Ubi-AppId", UBI_APP_ID)
        .header("Authorization", format!("rm_v1 t={}", ticket))
        .json(&json!({ "rememberMe": true }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::Auth(format!(
            "session request rejected: {}",
            response.status()
        )));
    }

    let session: SessionResponse = response.json().await?;
    Ok(UbiSession {
        session_id: session.session_id,
        ticket: session.ticket,
        user_id: session.user_id,
        profile_id: session.profile_id,
        username: session.name_on_platform,
    })
}

/// Fetch the owned-games node list from the club graph. An absent `nodes`
/// list means the account owns nothing the club knows about, not an error.
pub async fn get_club_titles(
    client: &Client,
    session: &UbiSession,
) -> Result<Vec<OwnedGameNode>, SourceError> {
    let response = client
        .post(GRAPHQL_URL)
        .header("Ubi-AppId", UBI_APP_ID)
        .header("Ubi-SessionId", &session.session_id)
        .header("Authorization", format!("Ubi_v1 t={}", session.ticket))
        .json(&json!({ "query": OWNED_GAMES_QUERY }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::from_response(response).await);
    }

    let titles: ClubTitlesResponse = response.json().await?;
    Ok(titles.data.viewer.owned_games.nodes)
}

/// Fetch the stat-card collection for one space id.
pub async fn get_game_stats(
    client: &Client,
    session: &UbiSession,
    space_id: &str,
) -> Result<StatsResponse, SourceError> {
    let url = format!(
        "{}/{}/statscard?spaceId={}",
        STATS_BASE, session.profile_id, space_id
    );

    let response = client
        .get(&url)
        .header("Ubi-AppId", UBI_APP_ID)
        .header("Ubi-SessionId", &session.session_id)
        .header("Authorization", format!("Ubi_v1 t={}", session.ticket))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::from_response(response).await);
    }

    Ok(response.json().await?)
}

/// Tear the session down. Best effort: close has to succeed locally even
/// when the backend does not cooperate.
pub async fn close_session(client: &Client, session: &UbiSession) {
    let result = client
        .delete(SESSIONS_URL)
        .header("Ubi-AppId", UBI_APP_ID)
        .header("Ubi-SessionId", &session.session_id)
        .header("Authorization", format!("Ubi_v1 t={}", session.ticket))
        .send()
        .await;

    if let Err(err) = result {
        debug!(error = %err, "session teardown request failed");
    }
}

/// Scan all cards for the two time stats. A later card wins when names
/// repeat; cards with other names are ignored.
pub fn find_times(cards: &[StatCard]) -> Result<StatTimes, SourceError> {
    let mut times = StatTimes {
        playtime_secs: 0,
        last_played: 0,
    };

    for card in cards {
        match card.stat_name.as_str() {
            "time_played" => times.playtime_secs = stat_value(card)?,
            "last_played" => times.last_played = stat_value(card)?,
            _ => {}
        }
    }

    Ok(times)
}

fn stat_value(card: &StatCard) -> Result<u64, SourceError> {
    let Some(value) = &card.value else {
        return Ok(0);
    };

    let parsed = match value {
        serde_json::Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        serde_json::Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        SourceError::Malformed(format!(
            "stat card {} has non-numeric value {}",
            card.stat_name, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, value: serde_json::Value) -> StatCard {
        StatCard {
            stat_name: name.to_string(),
            value: Some(value),
        }
    }

    #[test]
    fn extracts_both_time_stats() {
        let cards = vec![
            card("wins", json!(14)),
            card("time_played", json!(125)),
            card("last_played", json!(1714564800u64)),
        ];

        let times = find_times(&cards).unwrap();
        assert_eq!(times.playtime_secs, 125);
        assert_eq!(times.last_played, 1714564800);
    }

    #[test]
    fn later_duplicate_card_wins() {
        let cards = vec![
            card("time_played", json!(100)),
            card("time_played", json!(250)),
        ];

        let times = find_times(&cards).unwrap();
        assert_eq!(times.playtime_secs, 250);
    }

    #[test]
    fn string_values_parse_like_numbers() {
        let cards = vec![card("time_played", json!("3600"))];
        assert_eq!(find_times(&cards).unwrap().playtime_secs, 3600);
    }

    #[test]
    fn missing_value_counts_as_zero() {
        let cards = vec![StatCard {
            stat_name: "time_played".to_string(),
            value: None,
        }];
        assert_eq!(find_times(&cards).unwrap().playtime_secs, 0);
    }

    #[test]
    fn non_numeric_value_is_an_error() {
        let cards = vec![card("time_played", json!("forever"))];
        assert!(find_times(&cards).is_err());
    }

    #[test]
    fn remember_me_blob_decodes_from_json_string() {
        assert_eq!(remember_me_ticket("\"ticket-abc\""), "ticket-abc");
        assert_eq!(remember_me_ticket("raw-ticket "), "raw-ticket");
    }

    #[test]
    fn graph_response_without_nodes_is_an_empty_catalog() {
        let titles: ClubTitlesResponse =
            serde_json::from_str(r#"{"data": {"viewer": {"ownedGames": {}}}}"#).unwrap();
        assert!(titles.data.viewer.owned_games.nodes.is_empty());
    }

    #[test]
    fn stats_response_without_cards_deserializes_to_none() {
        let stats: StatsResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(stats.statscards.is_none());
    }

    #[test]
    fn owned_game_nodes_deserialize() {
        let titles: ClubTitlesResponse = serde_json::from_str(
            r#"{
                "data": {"viewer": {"ownedGames": {"nodes": [
                    {"spaceId": "space-1", "name": "Game One"},
                    {"spaceId": "space-2", "name": "Game Two"}
                ]}}}
            }"#,
        )
        .unwrap();

        let nodes = titles.data.viewer.owned_games.nodes;
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].space_id, "space-1");
        assert_eq!(nodes[1].name, "Game Two");
    }
}
