//! The analysis result as it is handed to the downstream consumer.

/// Open key/value bag kept only so downstream consumers that expect the
/// `stats`/`roundData` objects keep working. Always empty.
pub type Extensions = std::collections::BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDemo {
    pub demo_id: String,
    pub players: Vec<Player>,
    pub rounds: Vec<Round>,
    pub events: Vec<GameEvent>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub steam_id: String,
    pub name: String,
    pub team: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub adr: f64,
    pub hsp: f64,
    pub kast: f64,
    pub rating: f64,
    #[serde(default)]
    pub stats: Extensions,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_number: u32,
    pub winner_side: String,
    pub win_reason: String,
    pub ct_score: u32,
    pub t_score: u32,
    pub duration_seconds: i64,
    #[serde(default)]
    pub round_data: Extensions,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub event_type: EventType,
    pub tick: i32,
    pub round_number: u32,
    pub event_data: EventData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Kill,
}

/// Payload of a [`GameEvent`], one variant per [`EventType`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum EventData {
    Kill(KillData),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillData {
    pub killer: String,
    pub victim: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assister: Option<String>,
    pub weapon: String,
    pub is_headshot: bool,
    pub penetrated: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub map_name: String,
    pub duration: u64,
    pub tick_rate: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kill_event_wire_shape() {
        let event = GameEvent {
            event_type: EventType::Kill,
            tick: 640,
            round_number: 1,
            event_data: EventData::Kill(KillData {
                killer: "K".to_owned(),
                victim: "V".to_owned(),
                assister: None,
                weapon: "ak47".to_owned(),
                is_headshot: true,
                penetrated: 0,
            }),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "eventType": "kill",
                "tick": 640,
                "roundNumber": 1,
                "eventData": {
                    "killer": "K",
                    "victim": "V",
                    "weapon": "ak47",
                    "isHeadshot": true,
                    "penetrated": 0,
                }
            })
        );
    }

    #[test]
    fn round_keeps_empty_round_data() {
        let round = Round {
            round_number: 3,
            winner_side: "T".to_owned(),
            win_reason: "bomb_exploded".to_owned(),
            ct_score: 1,
            t_score: 2,
            duration_seconds: 95,
            round_data: Extensions::new(),
        };

        let value = serde_json::to_value(&round).unwrap();
        assert_eq!(value["roundData"], serde_json::json!({}));
        assert_eq!(value["ctScore"], 1);
        assert_eq!(value["tScore"], 2);
        assert_eq!(value["durationSeconds"], 95);
    }
}
