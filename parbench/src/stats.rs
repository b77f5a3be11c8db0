use std::time::Duration;

/// Outcome of one complete run at a fixed thread count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunResult {
    pub total: u64,
    pub estimate: Option<f64>,
    pub elapsed: Duration,
}

impl RunResult {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Summary over the repetitions recorded for one thread count. Every figure
/// is recomputed from `runs` on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    runs: Vec<RunResult>,
}

impl Stats {
    pub fn new(runs: Vec<RunResult>) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> &[RunResult] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn mean_ms(&self) -> f64 {
        mean(self.runs.iter().map(RunResult::elapsed_ms))
    }

    /// Population standard deviation of the elapsed times.
    pub fn stddev_ms(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        let m = self.mean_ms();
        let variance = mean(self.runs.iter().map(|r| {
            let d = r.elapsed_ms() - m;
            d * d
        }));
        variance.sqrt()
    }

    pub fn mean_total(&self) -> f64 {
        mean(self.runs.iter().map(|r| r.total as f64))
    }

    pub fn mean_estimate(&self) -> Option<f64> {
        let estimates: Vec<f64> = self.runs.iter().filter_map(|r| r.estimate).collect();
        if estimates.is_empty() {
            None
        } else {
            Some(mean(estimates))
        }
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Ratio of baseline mean time to `other` mean time.
pub fn speedup(baseline: &Stats, other: &Stats) -> f64 {
    let base = baseline.mean_ms();
    let mean = other.mean_ms();
    if mean > 0.0 {
        base / mean
    } else if base > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ms(ms: u64, estimate: Option<f64>) -> RunResult {
        RunResult {
            total: ms * 10,
            estimate,
            elapsed: Duration::from_millis(ms),
        }
    }

    #[test]
    fn mean_and_population_stddev() {
        let stats = Stats::new(
            [2, 4, 4, 4, 5, 5, 7, 9]
                .into_iter()
                .map(|ms| run_ms(ms, None))
                .collect(),
        );
        assert!((stats.mean_ms() - 5.0).abs() < 1e-9);
        assert!((stats.stddev_ms() - 2.0).abs() < 1e-9);
        assert!((stats.mean_total() - 50.0).abs() < 1e-9);
        assert_eq!(stats.mean_estimate(), None);
    }

    #[test]
    fn statistics_are_repeatable() {
        let stats = Stats::new(vec![
            run_ms(13, Some(3.14)),
            run_ms(11, Some(3.15)),
            run_ms(17, Some(3.13)),
        ]);
        assert_eq!(stats.mean_ms(), stats.mean_ms());
        assert_eq!(stats.stddev_ms(), stats.stddev_ms());
        assert_eq!(stats.mean_estimate(), stats.mean_estimate());
        assert!((stats.mean_estimate().unwrap() - 3.14).abs() < 1e-9);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = Stats::new(Vec::new());
        assert!(stats.is_empty());
        assert_eq!(stats.mean_ms(), 0.0);
        assert_eq!(stats.stddev_ms(), 0.0);
    }

    #[test]
    fn speedup_against_self_is_one() {
        let base = Stats::new(vec![run_ms(40, None), run_ms(60, None)]);
        assert_eq!(speedup(&base, &base), 1.0);

        let fast = Stats::new(vec![run_ms(10, None), run_ms(15, None)]);
        assert!((speedup(&base, &fast) - 4.0).abs() < 1e-9);
        assert!(speedup(&fast, &base) >= 0.0);
    }

    #[test]
    fn speedup_with_zero_times() {
        let zero = Stats::new(vec![run_ms(0, None)]);
        let some = Stats::new(vec![run_ms(5, None)]);
        assert_eq!(speedup(&zero, &zero), 1.0);
        assert_eq!(speedup(&some, &zero), f64::INFINITY);
        assert_eq!(speedup(&zero, &some), 0.0);
    }
}
