use crate::error::SourceError;
use crate::origin::api::{self, Entitlement, OfferUsage};
use crate::traits::PlaytimeSource;
use async_trait::async_trait;
use game_sync_models::{Identity, PlaytimeEntry};
use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, info};

/// EA Origin storefront client. Constructed from the caller's session cookie
/// map; the cookies and the token derived from them live only as long as the
/// client itself.
pub struct OriginClient {
    http: Client,
    cookies: HashMap<String, String>,
    access_token: Option<String>,
}

impl OriginClient {
    pub fn new(cookies: HashMap<String, String>) -> Self {
        Self {
            http: Client::new(),
            cookies,
            access_token: None,
        }
    }

    fn access_token(&self) -> Result<&str, SourceError> {
        self.access_token
            .as_deref()
            .ok_or(SourceError::NotAuthenticated)
    }
}

#[async_trait]
impl PlaytimeSource for OriginClient {
    type Entry = Entitlement;
    type Detail = OfferUsage;

    fn source_name(&self) -> &str {
        "origin"
    }

    async fn authenticate(&mut self) -> Result<(), SourceError> {
        let token = api::authenticate(&self.http, &self.cookies).await?;
        self.access_token = Some(token);
        info!("Authenticated to Origin");
        Ok(())
    }

    async fn resolve_identity(&self) -> Result<Identity, SourceError> {
        let token = self.access_token()?;
        let (user_id, persona_id, display_name) = api::get_identity(&self.http, token).await?;
        Ok(Identity {
            user_id,
            persona_id: Some(persona_id),
            display_name,
        })
    }

    async fn fetch_catalog(&self, identity: &Identity) -> Result<Vec<Entitlement>, SourceError> {
        let token = self.access_token()?;
        let entitlements = api::get_entitlements(&self.http, token, &identity.user_id).await?;
        let total = entitlements.len();
        let base_games = api::base_game_entitlements(entitlements);
        debug!(
            total,
            base_games = base_games.len(),
            "filtered entitlements to base games"
        );
        Ok(base_games)
    }

    async fn enrich(
        &self,
        identity: &Identity,
        entry: &Entitlement,
    ) -> Result<OfferUsage, SourceError> {
        let token = self.access_token()?;
        let offer = api::get_offer(&self.http, &entry.offer_id).await?;
        let multiplayer_id = api::select_multiplayer_id(&offer.platforms).map(str::to_string);
        let (total_minutes, last_played) = api::get_game_time(
            &self.http,
            token,
            &identity.user_id,
            &offer.master_title_id,
            multiplayer_id.as_deref(),
        )
        .await?;

        Ok(OfferUsage {
            display_name: offer.i18n.display_name,
            total_minutes,
            last_played,
        })
    }

    fn normalize(&self, entry: &Entitlement, detail: OfferUsage) -> Option<PlaytimeEntry> {
        // The entitlement is confirmed by the time we get here, so a game the
        // user never launched still belongs in the report.
        Some(PlaytimeEntry {
            id: entry.offer_id.clone(),
            name: detail.display_name,
            playtime_mins: detail.total_minutes,
            last_played: detail.last_played,
        })
    }

    async fn close(&mut self) {
        if self.access_token.take().is_some() {
            debug!("dropped Origin session token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_playtime_titles_are_kept() {
        let client = OriginClient::new(HashMap::new());
        let entry = Entitlement {
            offer_id: "Origin.OFR.50.0001".to_string(),
            offer_type: "basegame".to_string(),
        };
        let detail = OfferUsage {
            display_name: "Unplayed Game".to_string(),
            total_minutes: 0,
            last_played: 0,
        };

        let record = client.normalize(&entry, detail).unwrap();
        assert_eq!(record.id, "Origin.OFR.50.0001");
        assert_eq!(record.name, "Unplayed Game");
        assert_eq!(record.playtime_mins, 0);
        assert_eq!(record.last_played, 0);
    }

    #[test]
    fn minutes_pass_through_without_conversion() {
        let client = OriginClient::new(HashMap::new());
        let entry = Entitlement {
            offer_id: "Origin.OFR.50.0002".to_string(),
            offer_type: "basegame".to_string(),
        };
        let detail = OfferUsage {
            display_name: "Played Game".to_string(),
            total_minutes: 125,
            last_played: 1714564800,
        };

        let record = client.normalize(&entry, detail).unwrap();
        assert_eq!(record.playtime_mins, 125);
        assert_eq!(record.last_played, 1714564800);
    }
}
