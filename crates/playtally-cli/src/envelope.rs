use game_sync_models::SyncReport;
use serde::Serialize;
use serde_json::Value;

/// The one line the process prints on stdout: the sync report or an error
/// message, tagged with the outcome.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub data: Value,
}

impl Envelope {
    pub fn success(report: &SyncReport) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(report).unwrap_or(Value::Null),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::String(message.into()),
        }
    }

    pub fn emit(&self) {
        println!("{}", serde_json::to_string(self).unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_sync_models::PlaytimeEntry;

    #[test]
    fn failure_envelope_carries_the_message_as_data() {
        let envelope = Envelope::failure("Invalid input data");
        let line = serde_json::to_string(&envelope).unwrap();
        assert_eq!(line, r#"{"success":false,"data":"Invalid input data"}"#);
    }

    #[test]
    fn success_envelope_embeds_the_report() {
        let report = SyncReport {
            user_name: "player-one".to_string(),
            games: vec![PlaytimeEntry {
                id: "Origin.OFR.50.0001".to_string(),
                name: "Example Game".to_string(),
                playtime_mins: 42,
                last_played: 1714564800,
            }],
        };

        let envelope = Envelope::success(&report);
        let line = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            line,
            r#"{"success":true,"data":{"user_name":"player-one","games":[{"id":"Origin.OFR.50.0001","name":"Example Game","playtime_mins":42,"last_played":1714564800}]}}"#
        );
    }
}
