//! Decoder for pre-decoded replay event logs.
//!
//! An event log is JSON Lines: a header record first, one record per signal,
//! and a stop record at the very end.
//!
//! ```text
//! {"type":"header","mapName":"de_nuke","playbackTime":2210.4,"frameRate":64.0}
//! {"type":"signal","tick":100,"event":{"kind":"round_start"}}
//! {"type":"signal","tick":740,"event":{"kind":"kill","killer":{"steamId":1,"name":"a","side":"t"},"victim":null,"assister":null,"weapon":"ak47","headshot":true,"penetrated":0}}
//! {"type":"signal","tick":1380,"event":{"kind":"round_end","winner":"ct","reason":"t_killed","ctScore":1,"tScore":0}}
//! {"type":"stop"}
//! ```
//!
//! The round end `reason` is either a label or the game's numeric code. Labels
//! and codes that are not known are kept as [`WinReason::Other`].

use crate::replay::{
    DecodeError, Header, Kill, PlayerRef, ReplayDecoder, ReplayEvent, ReplaySource, RoundEnd, Side,
    Signal, WinReason,
};

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record {
    Header(HeaderRecord),
    Signal(SignalRecord),
    Stop,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderRecord {
    map_name: String,
    playback_time: f64,
    frame_rate: f64,
}

#[derive(Debug, serde::Deserialize)]
struct SignalRecord {
    tick: i32,
    event: EventRecord,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EventRecord {
    RoundStart,
    RoundEnd(RoundEndRecord),
    Kill(KillRecord),
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoundEndRecord {
    winner: Side,
    reason: ReasonRecord,
    ct_score: u32,
    t_score: u32,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ReasonRecord {
    Code(i32),
    Label(String),
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct KillRecord {
    #[serde(default)]
    killer: Option<PlayerRecord>,
    #[serde(default)]
    victim: Option<PlayerRecord>,
    #[serde(default)]
    assister: Option<PlayerRecord>,
    weapon: String,
    headshot: bool,
    #[serde(default)]
    penetrated: u32,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRecord {
    steam_id: u64,
    name: String,
    side: Side,
}

impl From<PlayerRecord> for PlayerRef {
    fn from(value: PlayerRecord) -> Self {
        Self {
            steam_id: value.steam_id,
            name: value.name,
            side: value.side,
        }
    }
}

impl ReasonRecord {
    fn resolve(self) -> WinReason {
        match self {
            Self::Code(code) => {
                WinReason::from_code(code).unwrap_or_else(|| WinReason::Other(code.to_string()))
            }
            Self::Label(label) => {
                WinReason::from_label(&label).unwrap_or(WinReason::Other(label))
            }
        }
    }
}

impl EventRecord {
    fn into_event(self) -> ReplayEvent {
        match self {
            Self::RoundStart => ReplayEvent::RoundStart,
            Self::RoundEnd(end) => ReplayEvent::RoundEnd(RoundEnd {
                winner: end.winner,
                reason: end.reason.resolve(),
                ct_score: end.ct_score,
                t_score: end.t_score,
            }),
            Self::Kill(kill) => ReplayEvent::Kill(Kill {
                killer: kill.killer.map(PlayerRef::from),
                victim: kill.victim.map(PlayerRef::from),
                assister: kill.assister.map(PlayerRef::from),
                weapon: kill.weapon,
                headshot: kill.headshot,
                penetrated: kill.penetrated,
            }),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EventLogDecoder;

impl ReplayDecoder for EventLogDecoder {
    fn open<'b>(&self, buf: &'b [u8]) -> Result<Box<dyn ReplaySource + 'b>, DecodeError> {
        let source = EventLogSource::parse(buf)?;
        Ok(Box::new(source))
    }
}

pub struct EventLogSource<'b> {
    lines: std::iter::Enumerate<std::str::Lines<'b>>,
    header: Header,
    finished: bool,
}

impl<'b> EventLogSource<'b> {
    pub fn parse(buf: &'b [u8]) -> Result<Self, DecodeError> {
        let content =
            std::str::from_utf8(buf).map_err(|e| DecodeError::InvalidUtf8(e.valid_up_to()))?;

        let mut lines = content.lines().enumerate();
        let (idx, first) = lines
            .by_ref()
            .find(|(_, l)| !l.trim().is_empty())
            .ok_or(DecodeError::MissingHeader)?;

        let header = match parse_record(idx + 1, first)? {
            Record::Header(header) => header,
            _ => return Err(DecodeError::MissingHeader),
        };

        let playback_time = std::time::Duration::try_from_secs_f64(header.playback_time)
            .map_err(|e| DecodeError::Malformed {
                line: idx + 1,
                reason: format!("playback time: {}", e),
            })?;

        Ok(Self {
            lines,
            header: Header {
                map_name: header.map_name,
                playback_time,
                frame_rate: header.frame_rate,
            },
            finished: false,
        })
    }
}

fn parse_record(line: usize, content: &str) -> Result<Record, DecodeError> {
    serde_json::from_str(content).map_err(|e| DecodeError::Malformed {
        line,
        reason: e.to_string(),
    })
}

impl ReplaySource for EventLogSource<'_> {
    fn next_signal(&mut self) -> Result<Option<Signal>, DecodeError> {
        if self.finished {
            return Ok(None);
        }

        while let Some((idx, content)) = self.lines.next() {
            if content.trim().is_empty() {
                continue;
            }

            let line = idx + 1;
            match parse_record(line, content)? {
                Record::Signal(signal) => {
                    return Ok(Some(Signal {
                        tick: signal.tick,
                        event: signal.event.into_event(),
                    }));
                }
                Record::Stop => {
                    if let Some((idx, _)) = self.lines.by_ref().find(|(_, l)| !l.trim().is_empty()) {
                        return Err(DecodeError::Malformed {
                            line: idx + 1,
                            reason: "content after stop marker".to_owned(),
                        });
                    }

                    self.finished = true;
                    return Ok(None);
                }
                Record::Header(_) => {
                    return Err(DecodeError::Malformed {
                        line,
                        reason: "duplicate header".to_owned(),
                    });
                }
            }
        }

        Err(DecodeError::Truncated)
    }

    fn header(&self) -> Result<Header, DecodeError> {
        if !self.finished {
            return Err(DecodeError::NotFinished);
        }
        Ok(self.header.clone())
    }
}
