use crate::envelope::Envelope;
use clap::ValueEnum;
use color_eyre::Result;
use game_sync_core::sync_playtime;
use game_sync_sources::{OriginClient, PlaytimeSource, UplayClient};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    /// EA's Origin storefront (cookie-map credential payload)
    Ea,
    /// Ubisoft Connect club service (three local-storage blobs)
    Ubi,
}

pub async fn run_sync(platform: Platform, data: &str) -> Result<()> {
    tracing::debug!(?platform, "sync command started");

    // The payload is validated before any client exists, so malformed input
    // never touches the network.
    let envelope = match platform {
        Platform::Ea => match parse_cookie_map(data) {
            Ok(cookies) => run_platform(&mut OriginClient::new(cookies)).await,
            Err(err) => reject_payload(err),
        },
        Platform::Ubi => match parse_storage_blobs(data) {
            Ok(blobs) => run_platform(&mut UplayClient::new(blobs)).await,
            Err(err) => reject_payload(err),
        },
    };

    envelope.emit();
    Ok(())
}

async fn run_platform<S: PlaytimeSource>(source: &mut S) -> Envelope {
    match sync_playtime(source).await {
        Ok(report) => Envelope::success(&report),
        Err(err) => {
            tracing::error!(source = source.source_name(), error = %err, "sync failed");
            Envelope::failure(err.to_string())
        }
    }
}

fn reject_payload(err: serde_json::Error) -> Envelope {
    tracing::error!(error = %err, "rejecting credential payload");
    Envelope::failure("Invalid input data")
}

/// Origin wants the caller's session cookies as a name to value map.
fn parse_cookie_map(data: &str) -> Result<HashMap<String, String>, serde_json::Error> {
    serde_json::from_str(data)
}

/// Connect wants exactly three opaque blobs: login data, remember-me token,
/// last active profile.
fn parse_storage_blobs(data: &str) -> Result<[String; 3], serde_json::Error> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_payload_parses_to_a_map() {
        let cookies = parse_cookie_map(r#"{"sid": "abc", "remid": "def"}"#).unwrap();
        assert_eq!(cookies.get("sid").map(String::as_str), Some("abc"));
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn cookie_payload_rejects_non_objects() {
        assert!(parse_cookie_map(r#"["sid", "abc"]"#).is_err());
        assert!(parse_cookie_map("not json").is_err());
        assert!(parse_cookie_map(r#"{"sid": 5}"#).is_err());
    }

    #[test]
    fn storage_payload_requires_exactly_three_blobs() {
        let blobs = parse_storage_blobs(r#"["login", "remember", "profile"]"#).unwrap();
        assert_eq!(blobs[1], "remember");

        assert!(parse_storage_blobs(r#"["login", "remember"]"#).is_err());
        assert!(parse_storage_blobs(r#"["a", "b", "c", "d"]"#).is_err());
        assert!(parse_storage_blobs(r#"{"login": "x"}"#).is_err());
    }
}
