use analysis::eventlog::EventLogDecoder;
use common::demo_analysis::{
    EventData, EventType, Extensions, GameEvent, KillData, Metadata, Player, Round,
};
use pretty_assertions::assert_eq;

fn player(steam_id: &str, name: &str, team: &str, kills: u32, deaths: u32, assists: u32) -> Player {
    Player {
        steam_id: steam_id.to_owned(),
        name: name.to_owned(),
        team: team.to_owned(),
        kills,
        deaths,
        assists,
        adr: 0.0,
        hsp: 0.0,
        kast: 0.0,
        rating: 0.0,
        stats: Extensions::new(),
    }
}

fn kill(
    tick: i32,
    round_number: u32,
    killer: &str,
    victim: &str,
    assister: Option<&str>,
    weapon: &str,
    is_headshot: bool,
    penetrated: u32,
) -> GameEvent {
    GameEvent {
        event_type: EventType::Kill,
        tick,
        round_number,
        event_data: EventData::Kill(KillData {
            killer: killer.to_owned(),
            victim: victim.to_owned(),
            assister: assister.map(|a| a.to_owned()),
            weapon: weapon.to_owned(),
            is_headshot,
            penetrated,
        }),
    }
}

#[test]
fn nuke_short() {
    let input_bytes = include_bytes!("../../testfiles/nuke_short.jsonl");

    let mut result = analysis::parse("demo-1", &EventLogDecoder, input_bytes).unwrap();
    result.players.sort_unstable_by(|a, b| a.steam_id.cmp(&b.steam_id));

    assert_eq!("demo-1", result.demo_id);
    assert_eq!(
        Metadata {
            map_name: "de_nuke".to_owned(),
            duration: 95,
            tick_rate: 64,
        },
        result.metadata
    );

    assert_eq!(
        vec![
            player("76561198000000001", "alice", "T", 2, 1, 0),
            player("76561198000000002", "bob", "CT", 1, 2, 0),
            player("76561198000000003", "carol", "T", 1, 1, 0),
            player("76561198000000004", "dave", "CT", 0, 1, 1),
        ],
        result.players
    );

    assert_eq!(
        vec![
            Round {
                round_number: 1,
                winner_side: "CT".to_owned(),
                win_reason: "t_killed".to_owned(),
                ct_score: 1,
                t_score: 0,
                duration_seconds: 21,
                round_data: Extensions::new(),
            },
            Round {
                round_number: 2,
                winner_side: "T".to_owned(),
                win_reason: "bomb_exploded".to_owned(),
                ct_score: 1,
                t_score: 1,
                duration_seconds: 42,
                round_data: Extensions::new(),
            },
        ],
        result.rounds
    );

    assert_eq!(
        vec![
            kill(50, 0, "alice", "bob", None, "knife", false, 0),
            kill(1480, 1, "bob", "alice", Some("dave"), "m4a1", true, 1),
            kill(2000, 1, "carol", "dave", None, "ak47", true, 0),
            kill(2500, 1, "unknown", "carol", None, "world", false, 0),
            kill(4000, 2, "alice", "bob", None, "awp", false, 2),
        ],
        result.events
    );
}

#[test]
fn nuke_short_is_deterministic() {
    let input_bytes = include_bytes!("../../testfiles/nuke_short.jsonl");

    let mut first = analysis::parse("demo-1", &EventLogDecoder, input_bytes).unwrap();
    let mut second = analysis::parse("demo-1", &EventLogDecoder, input_bytes).unwrap();

    assert_eq!(first.rounds, second.rounds);
    assert_eq!(first.events, second.events);

    first.players.sort_unstable_by(|a, b| a.steam_id.cmp(&b.steam_id));
    second.players.sort_unstable_by(|a, b| a.steam_id.cmp(&b.steam_id));
    assert_eq!(first.players, second.players);
}

#[test]
fn truncated_log_yields_nothing() {
    let input_bytes = include_bytes!("../../testfiles/nuke_short.jsonl");
    let content = std::str::from_utf8(input_bytes).unwrap();
    let cut = content.find("{\"type\":\"stop\"}").unwrap();

    let result = analysis::parse("demo-1", &EventLogDecoder, &input_bytes[..cut]);
    assert_eq!(Err(analysis::replay::DecodeError::Truncated), result);
}

#[test]
fn garbage_is_rejected() {
    let result = analysis::parse("demo-1", &EventLogDecoder, b"HL2DEMO\0\x04\x00");
    assert!(matches!(
        result,
        Err(analysis::replay::DecodeError::Malformed { line: 1, .. })
    ));
}

#[test]
fn single_round_elimination() {
    let input = [
        r#"{"type":"header","mapName":"de_mirage","playbackTime":10.0,"frameRate":128.0}"#,
        r#"{"type":"signal","tick":0,"event":{"kind":"round_start"}}"#,
        r#"{"type":"signal","tick":640,"event":{"kind":"kill","killer":{"steamId":1,"name":"K","side":"t"},"victim":{"steamId":2,"name":"V","side":"ct"},"weapon":"ak47","headshot":true,"penetrated":0}}"#,
        r#"{"type":"signal","tick":1280,"event":{"kind":"round_end","winner":"ct","reason":"elimination","ctScore":1,"tScore":0}}"#,
        r#"{"type":"stop"}"#,
    ]
    .join("\n");

    let mut result = analysis::parse("d", &EventLogDecoder, input.as_bytes()).unwrap();
    result.players.sort_unstable_by(|a, b| a.steam_id.cmp(&b.steam_id));

    assert_eq!(
        vec![
            player("1", "K", "T", 1, 0, 0),
            player("2", "V", "CT", 0, 1, 0),
        ],
        result.players
    );
    assert_eq!(
        vec![Round {
            round_number: 1,
            winner_side: "CT".to_owned(),
            win_reason: "elimination".to_owned(),
            ct_score: 1,
            t_score: 0,
            duration_seconds: 10,
            round_data: Extensions::new(),
        }],
        result.rounds
    );
    assert_eq!(
        vec![kill(640, 1, "K", "V", None, "ak47", true, 0)],
        result.events
    );
}

#[test]
fn unknown_reason_code_is_kept() {
    let input = [
        r#"{"type":"header","mapName":"de_mirage","playbackTime":10.0,"frameRate":128.0}"#,
        r#"{"type":"signal","tick":0,"event":{"kind":"round_start"}}"#,
        r#"{"type":"signal","tick":256,"event":{"kind":"round_end","winner":"t","reason":21,"ctScore":0,"tScore":1}}"#,
        r#"{"type":"stop"}"#,
    ]
    .join("\n");

    let result = analysis::parse("d", &EventLogDecoder, input.as_bytes()).unwrap();

    assert_eq!(1, result.rounds.len());
    assert_eq!("21", result.rounds[0].win_reason);
    assert_eq!(2, result.rounds[0].duration_seconds);
}
