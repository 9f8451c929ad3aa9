use web_time::Instant;

use fibre_core::{HostTree, PassStats, Root};

pub struct Hud {
    pub inspector_enabled: bool,
    pass_count: u64,
    last_pass: Option<Instant>,
    rate_smooth: f32,
    commit_ms_smooth: f32,
    pub metrics: Option<Metrics>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            inspector_enabled: false,
            pass_count: 0,
            last_pass: None,
            rate_smooth: 0.0,
            commit_ms_smooth: 0.0,
            metrics: None,
        }
    }

    pub fn toggle_inspector(&mut self) {
        self.inspector_enabled = !self.inspector_enabled;
    }

    /// Folds one committed pass into the running figures.
    pub fn record(&mut self, stats: &PassStats) {
        self.record_at(stats, Instant::now());
    }

    fn record_at(&mut self, stats: &PassStats, now: Instant) {
        self.pass_count += 1;
        // simple EMA
        let a = 0.2;
        if let Some(prev) = self.last_pass.replace(now) {
            let dt = now.saturating_duration_since(prev).as_secs_f32();
            if dt > 0.0 {
                let rate = 1.0 / dt;
                self.rate_smooth = if self.rate_smooth == 0.0 {
                    rate
                } else {
                    (1.0 - a) * self.rate_smooth + a * rate
                };
            }
        }
        let commit_ms = stats.commit_time.as_secs_f32() * 1000.0;
        self.commit_ms_smooth = if self.pass_count == 1 {
            commit_ms
        } else {
            (1.0 - a) * self.commit_ms_smooth + a * commit_ms
        };
        self.metrics = Some(Metrics::from(stats));
    }

    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    /// One line suitable for a status bar or a log.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("passes: {}", self.pass_count),
            format!("passes/s: {:.1}", self.rate_smooth),
            format!("commit: {:.2} ms", self.commit_ms_smooth),
        ];
        if let Some(m) = &self.metrics {
            lines.push(format!("units: {}", m.units));
            lines.push(format!(
                "+{} ~{} -{}",
                m.inserted, m.updated, m.deleted
            ));
            lines.push(format!("mutations: {}", m.mutations));
            if m.restarts > 0 || m.yields > 0 {
                lines.push(format!("restarts: {}  yields: {}", m.restarts, m.yields));
            }
        }
        lines.join("  |  ")
    }
}

/// Figures of the most recent pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    pub pass: u64,
    pub units: usize,
    pub restarts: usize,
    pub yields: usize,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub mutations: usize,
}

impl From<&PassStats> for Metrics {
    fn from(s: &PassStats) -> Self {
        Self {
            pass: s.pass,
            units: s.units,
            restarts: s.restarts,
            yields: s.yields,
            inserted: s.inserted,
            updated: s.updated,
            deleted: s.deleted,
            mutations: s.mutations,
        }
    }
}

/// Watches a root and logs a summary line for every pass it commits.
pub struct Inspector {
    pub hud: Hud,
    seen: u64,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            hud: Hud::new(),
            seen: 0,
        }
    }

    /// Call after driving `root`. Returns true if a new pass was recorded.
    pub fn observe<H: HostTree>(&mut self, root: &Root<H>) -> bool {
        let Some(stats) = root.stats() else {
            return false;
        };
        if stats.pass == self.seen {
            return false;
        }
        self.seen = stats.pass;
        self.hud.record(stats);
        if self.hud.inspector_enabled {
            log::info!("[{}] {}", root.config().label, self.hud.summary());
        }
        true
    }
}
