//! The decoded view of a replay that the aggregation works on.
//!
//! Turning the raw demo bytes into these signals is the job of a
//! [`ReplayDecoder`]; nothing in here knows about the binary demo format.

use std::collections::VecDeque;
use std::time::Duration;

/// The side a player is on, collapsed to the three values the output knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    #[serde(rename = "t")]
    Terrorist,
    #[serde(rename = "ct")]
    CounterTerrorist,
    #[serde(rename = "spectator")]
    Spectator,
}

impl Side {
    /// Maps the game's team number (2 = T, 3 = CT) to a side, everything
    /// else counts as spectator.
    pub fn from_team_number(team: i32) -> Self {
        match team {
            2 => Self::Terrorist,
            3 => Self::CounterTerrorist,
            _ => Self::Spectator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WinReason {
    StillInProgress,
    BombExploded,
    VipEscaped,
    VipKilled,
    TSaved,
    CtStoppedEscape,
    RoundEndReasonTerroristsStopped,
    BombDefused,
    TKilled,
    CTKilled,
    Draw,
    HostageRescued,
    TimeRanOut,
    RoundEndReasonHostagesNotRescued,
    TerroristsNotEscaped,
    VipNotEscaped,
    GameStart,
    TSurrender,
    CTSurrender,
    TPlanted,
    CTReachedHostage,
    /// A reason this table does not know, kept as it was signaled.
    Other(String),
}

impl WinReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::StillInProgress => "still_in_progress",
            Self::BombExploded => "bomb_exploded",
            Self::VipEscaped => "vip_escaped",
            Self::VipKilled => "vip_killed",
            Self::TSaved => "t_saved",
            Self::CtStoppedEscape => "ct_stopped_escape",
            Self::RoundEndReasonTerroristsStopped => "terrorists_stopped",
            Self::BombDefused => "bomb_defused",
            Self::TKilled => "t_killed",
            Self::CTKilled => "ct_killed",
            Self::Draw => "draw",
            Self::HostageRescued => "hostage_rescued",
            Self::TimeRanOut => "time_ran_out",
            Self::RoundEndReasonHostagesNotRescued => "hostages_not_rescued",
            Self::TerroristsNotEscaped => "terrorists_not_escaped",
            Self::VipNotEscaped => "vip_not_escaped",
            Self::GameStart => "game_start",
            Self::TSurrender => "t_surrender",
            Self::CTSurrender => "ct_surrender",
            Self::TPlanted => "t_planted",
            Self::CTReachedHostage => "ct_reached_hostage",
            Self::Other(label) => label,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        ROUND_WIN_REASON.get(&code).cloned()
    }

    /// Inverse of [`WinReason::as_str`].
    pub fn from_label(label: &str) -> Option<Self> {
        ROUND_WIN_REASON
            .values()
            .find(|reason| reason.as_str() == label)
            .cloned()
    }
}

// https://github.com/markus-wa/demoinfocs-golang/blob/205b0bb25e9f3e96e1d306d154199b4a6292940e/pkg/demoinfocs/events/events.go#L53
pub static ROUND_WIN_REASON: phf::Map<i32, WinReason> = phf::phf_map! {
    0_i32 => WinReason::StillInProgress,
    1_i32 => WinReason::BombExploded,
    2_i32 => WinReason::VipEscaped,
    3_i32 => WinReason::VipKilled,
    4_i32 => WinReason::TSaved,
    5_i32 => WinReason::CtStoppedEscape,
    6_i32 => WinReason::RoundEndReasonTerroristsStopped,
    7_i32 => WinReason::BombDefused,
    8_i32 => WinReason::TKilled,
    9_i32 => WinReason::CTKilled,
    10_i32 => WinReason::Draw,
    11_i32 => WinReason::HostageRescued,
    12_i32 => WinReason::TimeRanOut,
    13_i32 => WinReason::RoundEndReasonHostagesNotRescued,
    14_i32 => WinReason::TerroristsNotEscaped,
    15_i32 => WinReason::VipNotEscaped,
    16_i32 => WinReason::GameStart,
    17_i32 => WinReason::TSurrender,
    18_i32 => WinReason::CTSurrender,
    19_i32 => WinReason::TPlanted,
    20_i32 => WinReason::CTReachedHostage,
};

/// A player as referenced by a single signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub steam_id: u64,
    pub name: String,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEnd {
    pub winner: Side,
    pub reason: WinReason,
    /// Scores as reported by the game at the moment the round ended.
    pub ct_score: u32,
    pub t_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kill {
    pub killer: Option<PlayerRef>,
    pub victim: Option<PlayerRef>,
    pub assister: Option<PlayerRef>,
    pub weapon: String,
    pub headshot: bool,
    /// Number of surfaces the bullet went through before the kill.
    pub penetrated: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayEvent {
    RoundStart,
    RoundEnd(RoundEnd),
    Kill(Kill),
}

/// An event together with the ingame tick it happened at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub tick: i32,
    pub event: ReplayEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub map_name: String,
    pub playback_time: Duration,
    pub frame_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("replay is not valid UTF-8 at byte {0}")]
    InvalidUtf8(usize),
    #[error("replay has no header")]
    MissingHeader,
    #[error("malformed replay at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("replay ended before the stop marker")]
    Truncated,
    #[error("header requested before the replay was read to the end")]
    NotFinished,
}

/// An ordered stream of decoded signals.
///
/// `next_signal` returns `Ok(None)` once the stream ended cleanly, after
/// which `header` returns the finalized header.
pub trait ReplaySource {
    fn next_signal(&mut self) -> Result<Option<Signal>, DecodeError>;

    fn header(&self) -> Result<Header, DecodeError>;
}

pub trait ReplayDecoder: Send + Sync {
    fn open<'b>(&self, buf: &'b [u8]) -> Result<Box<dyn ReplaySource + 'b>, DecodeError>;
}

/// A source over signals that are already in memory.
#[derive(Debug)]
pub struct VecSource {
    header: Header,
    signals: VecDeque<Signal>,
    fault: Option<(usize, DecodeError)>,
    emitted: usize,
    finished: bool,
}

impl VecSource {
    pub fn new(header: Header, signals: Vec<Signal>) -> Self {
        Self {
            header,
            signals: signals.into(),
            fault: None,
            emitted: 0,
            finished: false,
        }
    }

    /// Reports `error` instead of the signal following the first `after`
    /// signals.
    pub fn failing_after(mut self, after: usize, error: DecodeError) -> Self {
        self.fault = Some((after, error));
        self
    }
}

impl ReplaySource for VecSource {
    fn next_signal(&mut self) -> Result<Option<Signal>, DecodeError> {
        if let Some((after, _)) = &self.fault {
            if *after == self.emitted {
                if let Some((_, err)) = self.fault.take() {
                    return Err(err);
                }
            }
        }

        match self.signals.pop_front() {
            Some(signal) => {
                self.emitted += 1;
                Ok(Some(signal))
            }
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }

    fn header(&self) -> Result<Header, DecodeError> {
        if !self.finished {
            return Err(DecodeError::NotFinished);
        }
        Ok(self.header.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_numbers() {
        assert_eq!(Side::Terrorist, Side::from_team_number(2));
        assert_eq!(Side::CounterTerrorist, Side::from_team_number(3));
        assert_eq!(Side::Spectator, Side::from_team_number(1));
        assert_eq!(Side::Spectator, Side::from_team_number(0));
    }

    #[test]
    fn win_reason_codes() {
        assert_eq!(Some(WinReason::BombDefused), WinReason::from_code(7));
        assert_eq!(Some(WinReason::CTReachedHostage), WinReason::from_code(20));
        assert_eq!(None, WinReason::from_code(21));
        assert_eq!(Some(WinReason::CTKilled), WinReason::from_label("ct_killed"));
        assert_eq!(None, WinReason::from_label("elimination"));
    }

    #[test]
    fn vec_source_fault() {
        let header = Header {
            map_name: "de_dust2".to_owned(),
            playback_time: Duration::from_secs(1),
            frame_rate: 64.0,
        };
        let signals = vec![
            Signal { tick: 0, event: ReplayEvent::RoundStart },
            Signal { tick: 1, event: ReplayEvent::RoundStart },
        ];
        let mut source = VecSource::new(header, signals).failing_after(1, DecodeError::Truncated);

        assert!(source.next_signal().unwrap().is_some());
        assert_eq!(Err(DecodeError::Truncated), source.next_signal());
        assert_eq!(Err(DecodeError::NotFinished), source.header());
    }
}
