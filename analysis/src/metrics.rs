//! Conversion of raw counters and header values into output values.

use crate::replay::{Header, Side};

/// Nominal simulation rate used to turn tick differences into seconds,
/// independent of the header's frame rate.
pub const TICK_RATE: i32 = 128;

pub fn team_label(side: Side) -> &'static str {
    match side {
        Side::Terrorist => "T",
        Side::CounterTerrorist => "CT",
        Side::Spectator => "spectator",
    }
}

/// Whole seconds between two ticks, truncated toward zero.
pub fn round_duration_secs(start_tick: i32, end_tick: i32) -> i64 {
    (i64::from(end_tick) - i64::from(start_tick)) / i64::from(TICK_RATE)
}

pub fn metadata(header: &Header) -> common::demo_analysis::Metadata {
    common::demo_analysis::Metadata {
        map_name: header.map_name.clone(),
        duration: header.playback_time.as_secs(),
        tick_rate: header.frame_rate.round() as u32,
    }
}

/// Advanced per player metrics. These are part of the output but are not
/// computed yet, so they always hold zero.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PerformanceMetrics {
    pub adr: f64,
    pub hsp: f64,
    pub kast: f64,
    pub rating: f64,
}

impl PerformanceMetrics {
    pub fn placeholder() -> Self {
        Self::default()
    }
}
