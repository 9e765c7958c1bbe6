//! Single pass fold of a replay's signals into players, rounds and events.

use std::collections::HashMap;

use crate::metrics::{round_duration_secs, PerformanceMetrics};
use crate::replay::{
    DecodeError, Header, Kill, PlayerRef, ReplayEvent, ReplaySource, RoundEnd, Side, Signal,
    WinReason,
};

/// Name used in event payloads when a player is not known.
pub const UNKNOWN_PLAYER: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAccumulator {
    pub steam_id: u64,
    pub name: String,
    pub side: Side,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub metrics: PerformanceMetrics,
}

impl PlayerAccumulator {
    fn new(player: &PlayerRef) -> Self {
        Self {
            steam_id: player.steam_id,
            name: player.name.clone(),
            side: player.side,
            kills: 0,
            deaths: 0,
            assists: 0,
            metrics: PerformanceMetrics::placeholder(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    pub number: u32,
    pub winner: Side,
    pub reason: WinReason,
    pub ct_score: u32,
    pub t_score: u32,
    pub duration_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillPayload {
    pub killer: String,
    pub victim: String,
    pub assister: Option<String>,
    pub weapon: String,
    pub headshot: bool,
    pub penetrated: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Kill(KillPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub tick: i32,
    /// The round counter at the time of the event, 0 before the first round.
    pub round: u32,
    pub payload: EventPayload,
}

/// The running state of one aggregation.
#[derive(Debug, Default)]
pub struct AggregationState {
    pub(crate) current_round: u32,
    pub(crate) round_start_tick: i32,
    pub(crate) players: HashMap<u64, PlayerAccumulator>,
    pub(crate) rounds: Vec<RoundRecord>,
    pub(crate) events: Vec<EventRecord>,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn round_start_tick(&self) -> i32 {
        self.round_start_tick
    }

    pub fn players(&self) -> &HashMap<u64, PlayerAccumulator> {
        &self.players
    }

    pub fn player(&self, steam_id: u64) -> Option<&PlayerAccumulator> {
        self.players.get(&steam_id)
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn apply(&mut self, signal: &Signal) {
        match &signal.event {
            ReplayEvent::RoundStart => self.round_start(signal.tick),
            ReplayEvent::RoundEnd(end) => self.round_end(signal.tick, end),
            ReplayEvent::Kill(kill) => self.kill(signal.tick, kill),
        };
    }

    fn round_start(&mut self, tick: i32) {
        self.current_round += 1;
        self.round_start_tick = tick;

        tracing::debug!(round = self.current_round, tick, "Round started");
    }

    fn round_end(&mut self, tick: i32, end: &RoundEnd) {
        let duration_secs = round_duration_secs(self.round_start_tick, tick);
        if duration_secs < 0 {
            tracing::warn!(
                round = self.current_round,
                start = self.round_start_tick,
                end = tick,
                "Round ended before it started"
            );
        }

        self.rounds.push(RoundRecord {
            number: self.current_round,
            winner: end.winner,
            reason: end.reason.clone(),
            ct_score: end.ct_score,
            t_score: end.t_score,
            duration_secs,
        });

        tracing::debug!(round = self.current_round, tick, winner = ?end.winner, "Round ended");
    }

    fn kill(&mut self, tick: i32, kill: &Kill) {
        if let Some(killer) = &kill.killer {
            self.resolve(killer).kills += 1;
        }
        if let Some(victim) = &kill.victim {
            self.resolve(victim).deaths += 1;
        }
        if let Some(assister) = &kill.assister {
            self.resolve(assister).assists += 1;
        }

        self.events.push(EventRecord {
            tick,
            round: self.current_round,
            payload: EventPayload::Kill(KillPayload {
                killer: display_name(kill.killer.as_ref()),
                victim: display_name(kill.victim.as_ref()),
                assister: kill.assister.as_ref().map(|p| p.name.clone()),
                weapon: kill.weapon.clone(),
                headshot: kill.headshot,
                penetrated: kill.penetrated,
            }),
        });
    }

    /// The first sighting of a player fixes their name and side.
    fn resolve(&mut self, player: &PlayerRef) -> &mut PlayerAccumulator {
        self.players
            .entry(player.steam_id)
            .or_insert_with(|| PlayerAccumulator::new(player))
    }
}

fn display_name(player: Option<&PlayerRef>) -> String {
    player
        .map(|p| p.name.clone())
        .unwrap_or_else(|| UNKNOWN_PLAYER.to_owned())
}

/// Drains `source` and folds every signal into a fresh [`AggregationState`].
///
/// Any decode error aborts the whole aggregation, no partial state is
/// returned.
pub fn aggregate<S>(source: &mut S) -> Result<(Header, AggregationState), DecodeError>
where
    S: ReplaySource + ?Sized,
{
    let mut state = AggregationState::new();

    loop {
        let signal = match source.next_signal() {
            Ok(Some(s)) => s,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(
                    round = state.current_round,
                    events = state.events.len(),
                    "Aborting aggregation: {}",
                    e
                );
                return Err(e);
            }
        };

        state.apply(&signal);
    }

    let header = source.header()?;

    tracing::debug!(
        players = state.players.len(),
        rounds = state.rounds.len(),
        events = state.events.len(),
        "Aggregation finished"
    );

    Ok((header, state))
}
