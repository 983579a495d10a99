use hdrhistogram::Histogram;
use std::time::{Duration, Instant};

// 1us to 1,000s, recorded in microseconds.
const MAX_MICROS: u64 = 1_000_000_000;

/// Statistics for latency measurements.
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    /// Total number of samples.
    pub count: u64,
    /// Minimum latency in microseconds.
    pub min: u64,
    /// Maximum latency in microseconds.
    pub max: u64,
    /// Mean latency in microseconds.
    pub mean: f64,
    /// 50th percentile (median) latency in microseconds.
    pub p50: u64,
    /// 90th percentile latency in microseconds.
    pub p90: u64,
    /// 99th percentile latency in microseconds.
    pub p99: u64,
    /// Sum of all samples in microseconds.
    pub total: u64,
}

pub struct LatencyMeasurerGuard<'a> {
    measurer: &'a mut LatencyMeasurer,
    start: Instant,
}

impl Drop for LatencyMeasurerGuard<'_> {
    fn drop(&mut self) {
        self.measurer.measure(self.start.elapsed());
    }
}

/// Round-trip latency recorder backed by HdrHistogram.
pub struct LatencyMeasurer {
    histogram: Histogram<u64>,
    total: u64,
}

impl LatencyMeasurer {
    pub fn new() -> Self {
        // 3 significant figures
        let histogram = Histogram::<u64>::new_with_bounds(1, MAX_MICROS, 3)
            .expect("constant histogram bounds are valid");
        Self {
            histogram,
            total: 0,
        }
    }

    pub fn measure(&mut self, duration: Duration) {
        let micros = (duration.as_micros() as u64).clamp(1, MAX_MICROS);
        self.histogram.saturating_record(micros);
        self.total += micros;
    }

    pub fn measure_with_guard(&mut self) -> LatencyMeasurerGuard<'_> {
        LatencyMeasurerGuard {
            measurer: self,
            start: Instant::now(),
        }
    }

    pub fn count(&self) -> u64 {
        self.histogram.len()
    }

    pub fn reset(&mut self) {
        self.histogram.reset();
        self.total = 0;
    }

    pub fn get_stats(&self) -> LatencyStats {
        let count = self.histogram.len();
        if count == 0 {
            return LatencyStats::default();
        }

        LatencyStats {
            count,
            min: self.histogram.min(),
            max: self.histogram.max(),
            mean: self.histogram.mean(),
            p50: self.histogram.value_at_quantile(0.5),
            p90: self.histogram.value_at_quantile(0.9),
            p99: self.histogram.value_at_quantile(0.99),
            total: self.total,
        }
    }

    pub fn format_stats(&self) -> String {
        let stats = self.get_stats();
        if stats.count == 0 {
            return "No requests recorded".into();
        }

        format!(
            "\trequests={},\ttotal={},\tmin={},\tmax={},\tmean={},\tp50={},\tp90={},\tp99={}",
            stats.count,
            Self::format_duration(stats.total as f64),
            Self::format_duration(stats.min as f64),
            Self::format_duration(stats.max as f64),
            Self::format_duration(stats.mean),
            Self::format_duration(stats.p50 as f64),
            Self::format_duration(stats.p90 as f64),
            Self::format_duration(stats.p99 as f64),
        )
    }

    fn format_duration(micros: f64) -> String {
        if micros < 1000.0 {
            format!("{:.1}us", micros)
        } else if micros < 1_000_000.0 {
            format!("{:.1}ms", micros / 1000.0)
        } else {
            format!("{:.2}s", micros / 1_000_000.0)
        }
    }
}

impl Default for LatencyMeasurer {
    fn default() -> Self {
        Self::new()
    }
}
