use crate::error::SourceError;
use crate::traits::PlaytimeSource;
use crate::uplay::api::{self, LocalStorage, OwnedGameNode, StatTimes, UbiSession};
use async_trait::async_trait;
use game_sync_models::{Identity, PlaytimeEntry};
use reqwest::Client;
use tracing::{debug, info};

/// Ubisoft Connect club client. Constructed from the three local-storage
/// blobs the caller recovered from the Connect web client; nothing from the
/// payload outlives the client.
pub struct UplayClient {
    http: Client,
    storage: LocalStorage,
    session: Option<UbiSession>,
}

impl UplayClient {
    pub fn new(storage_blobs: [String; 3]) -> Self {
        Self {
            http: Client::new(),
            storage: storage_blobs.into(),
            session: None,
        }
    }

    fn session(&self) -> Result<&UbiSession, SourceError> {
        self.session.as_ref().ok_or(SourceError::NotAuthenticated)
    }
}

#[async_trait]
impl PlaytimeSource for UplayClient {
    type Entry = OwnedGameNode;
    /// `None` when the stats response carried no cards at all.
    type Detail = Option<StatTimes>;

    fn source_name(&self) -> &str {
        "uplay"
    }

    async fn authenticate(&mut self) -> Result<(), SourceError> {
        let session = api::create_session(&self.http, &self.storage).await?;
        info!(user = %session.username, "Authenticated to Ubisoft Connect");
        self.session = Some(session);
        Ok(())
    }

    async fn resolve_identity(&self) -> Result<Identity, SourceError> {
        let session = self.session()?;
        Ok(Identity {
            user_id: session.user_id.clone(),
            persona_id: None,
            display_name: session.username.clone(),
        })
    }

    async fn fetch_catalog(&self, _identity: &Identity) -> Result<Vec<OwnedGameNode>, SourceError> {
        api::get_club_titles(&self.http, self.session()?).await
    }

    async fn enrich(
        &self,
        _identity: &Identity,
        entry: &OwnedGameNode,
    ) -> Result<Option<StatTimes>, SourceError> {
        let stats = api::get_game_stats(&self.http, self.session()?, &entry.space_id).await?;
        match stats.statscards {
            Some(cards) if !cards.is_empty() => api::find_times(&cards).map(Some),
            _ => Ok(None),
        }
    }

    fn normalize(&self, entry: &OwnedGameNode, detail: Option<StatTimes>) -> Option<PlaytimeEntry> {
        // Titles the club has never recorded a session for stay out of the
        // report, and so do owned-but-unplayed ones.
        let times = detail?;
        if times.playtime_secs == 0 {
            return None;
        }

        Some(PlaytimeEntry {
            id: entry.space_id.clone(),
            name: entry.name.clone(),
            playtime_mins: times.playtime_secs / 60,
            // Reported verbatim; the stats service does not document the unit.
            last_played: times.last_played,
        })
    }

    async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            api::close_session(&self.http, &session).await;
            debug!("released Ubisoft Connect session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UplayClient {
        UplayClient::new([
            "login-data".to_string(),
            "\"ticket\"".to_string(),
            "profile".to_string(),
        ])
    }

    fn node(space_id: &str, name: &str) -> OwnedGameNode {
        OwnedGameNode {
            space_id: space_id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn seconds_floor_to_minutes() {
        let record = client()
            .normalize(
                &node("space-1", "Game One"),
                Some(StatTimes {
                    playtime_secs: 125,
                    last_played: 777,
                }),
            )
            .unwrap();

        assert_eq!(record.playtime_mins, 2);
        assert_eq!(record.last_played, 777);
        assert_eq!(record.id, "space-1");
    }

    #[test]
    fn zero_playtime_is_dropped() {
        let record = client().normalize(
            &node("space-1", "Game One"),
            Some(StatTimes {
                playtime_secs: 0,
                last_played: 777,
            }),
        );
        assert!(record.is_none());
    }

    #[test]
    fn missing_statscards_is_dropped() {
        assert!(client().normalize(&node("space-1", "Game One"), None).is_none());
    }

    #[test]
    fn sub_minute_playtime_floors_to_zero_minutes() {
        // 59 seconds is still above the zero-playtime cut, so the record
        // survives with zero whole minutes.
        let record = client()
            .normalize(
                &node("space-2", "Short Game"),
                Some(StatTimes {
                    playtime_secs: 59,
                    last_played: 0,
                }),
            )
            .unwrap();
        assert_eq!(record.playtime_mins, 0);
    }
}
