use common::demo_analysis::{
    EventData, EventType, Extensions, GameEvent, KillData, ParsedDemo, Player, Round,
};

use crate::aggregate::{
    aggregate, AggregationState, EventPayload, EventRecord, PlayerAccumulator, RoundRecord,
};
use crate::metrics::{metadata, team_label};
use crate::replay::{DecodeError, Header, ReplayDecoder};

/// Packages a finished aggregation into the output shape.
///
/// Players come out in no particular order, rounds and events keep the
/// order they were recorded in.
pub fn assemble(demo_id: &str, header: &Header, state: AggregationState) -> ParsedDemo {
    let AggregationState {
        players,
        rounds,
        events,
        ..
    } = state;

    ParsedDemo {
        demo_id: demo_id.to_owned(),
        players: players.into_values().map(player).collect(),
        rounds: rounds.into_iter().map(round).collect(),
        events: events.into_iter().map(event).collect(),
        metadata: metadata(header),
    }
}

/// Decodes `buf`, aggregates it and assembles the result.
#[tracing::instrument(skip(decoder, buf), fields(bytes = buf.len()))]
pub fn parse(
    demo_id: &str,
    decoder: &dyn ReplayDecoder,
    buf: &[u8],
) -> Result<ParsedDemo, DecodeError> {
    let mut source = decoder.open(buf)?;
    let (header, state) = aggregate(source.as_mut())?;

    Ok(assemble(demo_id, &header, state))
}

fn player(acc: PlayerAccumulator) -> Player {
    Player {
        steam_id: acc.steam_id.to_string(),
        name: acc.name,
        team: team_label(acc.side).to_owned(),
        kills: acc.kills,
        deaths: acc.deaths,
        assists: acc.assists,
        adr: acc.metrics.adr,
        hsp: acc.metrics.hsp,
        kast: acc.metrics.kast,
        rating: acc.metrics.rating,
        stats: Extensions::new(),
    }
}

fn round(record: RoundRecord) -> Round {
    Round {
        round_number: record.number,
        winner_side: team_label(record.winner).to_owned(),
        win_reason: record.reason.as_str().to_owned(),
        ct_score: record.ct_score,
        t_score: record.t_score,
        duration_seconds: record.duration_secs,
        round_data: Extensions::new(),
    }
}

fn event(record: EventRecord) -> GameEvent {
    let (event_type, event_data) = match record.payload {
        EventPayload::Kill(kill) => (
            EventType::Kill,
            EventData::Kill(KillData {
                killer: kill.killer,
                victim: kill.victim,
                assister: kill.assister,
                weapon: kill.weapon,
                is_headshot: kill.headshot,
                penetrated: kill.penetrated,
            }),
        ),
    };

    GameEvent {
        event_type,
        tick: record.tick,
        round_number: record.round,
        event_data,
    }
}
