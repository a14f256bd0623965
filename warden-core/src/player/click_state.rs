//! Click tracking: exact sliding-window CPS, inter-click interval history
//! and burst segmentation, symmetric for the left and right buttons.

use warden_utils::collections::RingBuffer;

use crate::player::click_stats;

/// Sliding CPS window length in ticks (one second at 20 TPS).
const CPS_WINDOW: usize = 20;
/// Inter-click interval history length.
const INTERVAL_HISTORY: usize = 100;
/// Micro window used for burst statistics.
const MICRO_WINDOW: usize = 10;
/// Finalized bursts retained for cross-burst comparison.
const BURST_HISTORY: usize = 10;
/// A burst closes after this many click-free ticks.
const BURST_GAP_TICKS: u64 = 6;
/// Bursts shorter than this are discarded, not finalized.
const BURST_MIN_CLICKS: u32 = 3;

/// Which mouse button a click came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickButton {
    /// Attack button.
    Left,
    /// Use/place button.
    Right,
}

/// Statistics of one finalized click burst.
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    /// Clicks in the burst.
    pub click_count: u32,
    /// Highest instantaneous CPS observed during the burst.
    pub peak_cps: u32,
    /// Shortest interval in ticks.
    pub min_interval: f64,
    /// Longest interval in ticks.
    pub max_interval: f64,
    /// Mean interval over the micro window.
    pub mean_interval: f64,
    /// Population stddev over the micro window.
    pub stddev: f64,
    /// `max_interval - min_interval`.
    pub range: f64,
}

/// Click tracking for one button.
#[derive(Debug, Clone)]
pub struct ClickTrack {
    cps_window: RingBuffer<u32>,
    intervals: RingBuffer<f64>,
    micro: RingBuffer<f64>,
    bursts: RingBuffer<Burst>,
    cps: u32,
    clicks_this_tick: u32,
    last_click_tick: Option<u64>,
    burst_clicks: u32,
    burst_peak_cps: u32,
    burst_min_interval: f64,
    burst_max_interval: f64,
}

impl ClickTrack {
    fn new() -> Self {
        Self {
            cps_window: RingBuffer::new(CPS_WINDOW),
            intervals: RingBuffer::new(INTERVAL_HISTORY),
            micro: RingBuffer::new(MICRO_WINDOW),
            bursts: RingBuffer::new(BURST_HISTORY),
            cps: 0,
            clicks_this_tick: 0,
            last_click_tick: None,
            burst_clicks: 0,
            burst_peak_cps: 0,
            burst_min_interval: f64::INFINITY,
            burst_max_interval: 0.0,
        }
    }

    /// Records one click at `tick`.
    pub fn on_click(&mut self, tick: u64) {
        if let Some(last) = self.last_click_tick {
            // First click of a session has no interval.
            let interval = tick.saturating_sub(last) as f64;
            self.intervals.push(interval);
            self.micro.push(interval);
            self.burst_min_interval = self.burst_min_interval.min(interval);
            self.burst_max_interval = self.burst_max_interval.max(interval);
        }
        self.last_click_tick = Some(tick);
        self.clicks_this_tick += 1;
        self.burst_clicks += 1;
        self.burst_peak_cps = self.burst_peak_cps.max(self.cps + self.clicks_this_tick);
    }

    /// Advances the sliding window one tick and finalizes an open burst when
    /// the click gap has grown past [`BURST_GAP_TICKS`].
    pub fn on_tick(&mut self, tick: u64) {
        if let Some(last) = self.last_click_tick
            && tick.saturating_sub(last) >= BURST_GAP_TICKS
            && self.burst_clicks > 0
        {
            if self.burst_clicks >= BURST_MIN_CLICKS {
                self.finalize_burst();
            }
            self.reset_open_burst();
        }

        // Exact sliding sum: the evicted slot leaves the window as this
        // tick's count enters it.
        let evicted = self.cps_window.push(self.clicks_this_tick).unwrap_or(0);
        self.cps = self.cps + self.clicks_this_tick - evicted;
        self.clicks_this_tick = 0;
    }

    fn finalize_burst(&mut self) {
        let samples = self.micro.to_vec();
        let mean = click_stats::mean(&samples).unwrap_or(0.0);
        let stddev = if samples.len() >= 2 {
            let var = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>()
                / samples.len() as f64;
            var.sqrt()
        } else {
            0.0
        };
        let min_interval = if self.burst_min_interval.is_finite() {
            self.burst_min_interval
        } else {
            0.0
        };
        self.bursts.push(Burst {
            click_count: self.burst_clicks,
            peak_cps: self.burst_peak_cps,
            min_interval,
            max_interval: self.burst_max_interval,
            mean_interval: mean,
            stddev,
            range: self.burst_max_interval - min_interval,
        });
    }

    fn reset_open_burst(&mut self) {
        self.burst_clicks = 0;
        self.burst_peak_cps = 0;
        self.burst_min_interval = f64::INFINITY;
        self.burst_max_interval = 0.0;
        self.micro.clear();
    }

    /// Current clicks-per-second over the 20-tick window.
    #[must_use]
    pub const fn cps(&self) -> u32 {
        self.cps
    }

    /// Interval history snapshot, oldest first.
    #[must_use]
    pub fn intervals(&self) -> Vec<f64> {
        self.intervals.to_vec()
    }

    /// Finalized bursts, oldest first.
    #[must_use]
    pub fn bursts(&self) -> Vec<Burst> {
        self.bursts.to_vec()
    }

    /// Number of interval samples recorded so far.
    #[must_use]
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }
}

/// Both button tracks.
#[derive(Debug, Clone)]
pub struct ClickState {
    /// Left (attack) button track.
    pub left: ClickTrack,
    /// Right (use) button track.
    pub right: ClickTrack,
}

impl ClickState {
    /// Fresh tracks for both buttons.
    #[must_use]
    pub fn new() -> Self {
        Self {
            left: ClickTrack::new(),
            right: ClickTrack::new(),
        }
    }

    /// Records a click on the given button.
    pub fn on_click(&mut self, button: ClickButton, tick: u64) {
        self.track_mut(button).on_click(tick);
    }

    /// Advances both tracks one tick.
    pub fn on_tick(&mut self, tick: u64) {
        self.left.on_tick(tick);
        self.right.on_tick(tick);
    }

    /// Track for a button.
    #[must_use]
    pub const fn track(&self, button: ClickButton) -> &ClickTrack {
        match button {
            ClickButton::Left => &self.left,
            ClickButton::Right => &self.right,
        }
    }

    /// Mutable track for a button.
    pub const fn track_mut(&mut self, button: ClickButton) -> &mut ClickTrack {
        match button {
            ClickButton::Left => &mut self.left,
            ClickButton::Right => &mut self.right,
        }
    }
}

impl Default for ClickState {
    fn default() -> Self {
        Self::new()
    }
}
