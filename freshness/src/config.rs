use std::time::Duration;

/// Inclusive range of local hours, e.g. `14..=18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour <= self.end
    }
}

/// Thresholds for the Freshness Evaluator.
#[derive(Debug, Clone)]
pub struct FreshnessRules {
    /// Age above which either partition is stale.
    pub max_age: Duration,

    /// Tightened age threshold for the next partition while the local hour
    /// is inside `critical_window`.
    pub critical_max_age: Duration,

    /// Local hour the next period is conventionally published at. Next data
    /// fetched before this hour is superseded once the hour is reached.
    pub publication_hour: u32,

    /// Hours during which next-period data may still be revised.
    pub critical_window: HourRange,
}

impl Default for FreshnessRules {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(30 * 60),
            critical_max_age: Duration::from_secs(20 * 60),
            publication_hour: 14,
            critical_window: HourRange::new(14, 18),
        }
    }
}

/// Lower bounds of the suspension buckets. Each bound is inclusive.
#[derive(Debug, Clone)]
pub struct SuspensionThresholds {
    pub short: Duration,
    pub medium: Duration,
    pub long: Duration,
}

impl Default for SuspensionThresholds {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(10 * 60),
            medium: Duration::from_secs(30 * 60),
            long: Duration::from_secs(2 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    // =========================
    // Staleness rules
    // =========================
    pub freshness: FreshnessRules,

    pub suspension: SuspensionThresholds,

    /// Hours in which data is most likely to change upstream: the morning
    /// settlement of the current period and the afternoon publication of the
    /// next one. A medium suspension inside these hours forces a refresh, and
    /// the critical-hour sweep only acts inside them.
    pub key_hours: [HourRange; 2],

    /// Window in which a never-fetched next partition is fetched by the
    /// critical-hour sweep.
    pub prime_publication_window: HourRange,

    // =========================
    // Timing
    // =========================
    /// Resume signals closer together than this collapse into one evaluation.
    pub debounce: Duration,

    /// Upper bound on how long the in-flight flag may stay set when refetch
    /// completions never arrive.
    pub fallback_timeout: Duration,

    /// Period of the general sweep.
    pub general_sweep_every: Duration,

    /// Period of the critical-hour sweep.
    pub critical_sweep_every: Duration,

    // =========================
    // Session
    // =========================
    /// Version string the session was served with. Reports of a different
    /// version raise the reload prompt.
    pub baseline_version: String,

    /// Fetch both partitions as soon as the engine starts.
    pub initial_fetch: bool,
}

impl EngineConfig {
    pub fn is_key_hour(&self, hour: u32) -> bool {
        self.key_hours.iter().any(|r| r.contains(hour))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            freshness: FreshnessRules::default(),
            suspension: SuspensionThresholds::default(),
            key_hours: [HourRange::new(6, 10), HourRange::new(14, 18)],
            prime_publication_window: HourRange::new(14, 16),

            debounce: Duration::from_millis(150),
            fallback_timeout: Duration::from_secs(2),
            general_sweep_every: Duration::from_secs(5 * 60),
            critical_sweep_every: Duration::from_secs(10 * 60),

            baseline_version: "dev".to_string(),
            initial_fetch: true,
        }
    }
}
