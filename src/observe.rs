use crate::Moves;
use crate::aggregator::CurveAggregator;
use crate::driver::RunResult;
use crate::stopping;

/// means at checkpoints 0, ~K/4 and the end: enough of the curve to
/// watch it settle without printing all of it
pub fn curve_summary(curve: &CurveAggregator) -> String {
    let last = curve.len().saturating_sub(1);
    let mid = (curve.len() / 4).min(last);
    format!(
        "mean(U/N): t0={:.4} t25%={:.4} tEnd={:.4}",
        curve.mean_at(0),
        curve.mean_at(mid),
        curve.mean_at(last),
    )
}

/// progress surface for the pool. all calls happen under the pool's
/// mutex, so the one-shot first-sample line and the run tally need no
/// synchronization of their own.
pub struct Monitor {
    alpha: f64,
    eps: f64,
    every: u64,
    printed_first: bool,
    completed: u64,
}

impl Monitor {
    pub fn new(alpha: f64, eps: f64, every: u64) -> Self {
        Self {
            alpha,
            eps,
            every: every.max(1),
            printed_first: false,
            completed: 0,
        }
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// account one finished run and emit diagnostics: the first sample
    /// always, then one line every `every` completions at debug level
    pub fn on_run(&mut self, run: u64, curve: &CurveAggregator, result: &RunResult) {
        self.completed += 1;
        let n = curve.count_at(0);
        let w = stopping::halfwidth(n, curve.len() as u64, self.alpha, 1.0);
        if !self.printed_first {
            self.printed_first = true;
            log::info!(
                "[first sample] n={} 2w={:.6} eps={:.6} alpha={:.6} {} moves(last)={}",
                n,
                2.0 * w,
                self.eps,
                self.alpha,
                curve_summary(curve),
                result.moves,
            );
        } else if self.completed % self.every == 0 {
            log::debug!(
                "[run {}] n={} 2w={:.6} eps={:.6} alpha={:.6} {} moves(last)={} avg_same(last)={:.4}",
                run,
                n,
                2.0 * w,
                self.eps,
                self.alpha,
                curve_summary(curve),
                result.moves,
                result.final_avg_same,
            );
        }
    }
}

/// text rendering of the finished curve with its uniform confidence
/// band, the thin stand-in for a live plotting surface
pub fn dump_curve(checkpoints: &[Moves], curve: &CurveAggregator, alpha: f64) {
    let n = curve.count_at(0);
    let w = stopping::halfwidth(n, curve.len() as u64, alpha, 1.0);
    for (k, &t) in checkpoints.iter().enumerate() {
        log::info!(
            "curve t={:>9} mean={:.6} band=+-{:.6} n={}",
            t,
            curve.mean_at(k),
            w,
            curve.count_at(k),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reads_the_quarter_checkpoint() {
        let curve = CurveAggregator::new(8);
        for k in 0..8 {
            curve.record(k, k as u32, 10);
        }
        let s = curve_summary(&curve);
        assert!(s.contains("t0=0.0000"));
        assert!(s.contains("t25%=0.2000"));
        assert!(s.contains("tEnd=0.7000"));
    }

    #[test]
    fn summary_survives_an_empty_aggregator() {
        let curve = CurveAggregator::new(4);
        assert!(curve_summary(&curve).contains("NaN"));
    }

    #[test]
    fn monitor_counts_completions() {
        let curve = CurveAggregator::new(2);
        curve.record(0, 1, 2);
        let result = RunResult {
            agents: 2,
            seed: 0,
            moves: 5,
            converged: true,
            init_unhappy: 1,
            final_unhappy: 0,
            final_avg_same: 1.0,
        };
        let mut monitor = Monitor::new(1e-4, 5e-4, 10);
        for run in 0..25 {
            monitor.on_run(run, &curve, &result);
        }
        assert!(monitor.completed() == 25);
    }
}
