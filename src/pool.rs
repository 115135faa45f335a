use crate::Moves;
use crate::aggregator::CurveAggregator;
use crate::driver;
use crate::geometry::Geometry;
use crate::observe::Monitor;
use crate::rng;
use crate::stepper::MoveRule;
use crate::stopping;
use crate::unhappy::Threshold;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::Relaxed;

/// immutable description of what one worker does per run
#[derive(Debug, Clone, Copy)]
pub struct Job {
    pub density: f64,
    pub tau: Threshold,
    pub rule: MoveRule,
    pub alpha: f64,
    pub eps: f64,
    pub debug_every: u64,
}

/// worker-count resolution: 0 means auto, which leaves a core or two
/// for the rest of the machine
#[derive(Debug, Clone, Copy)]
pub struct ThreadPlan {
    pub detected: usize,
    pub reserved: usize,
    pub used: usize,
}

pub fn thread_plan(requested: usize) -> ThreadPlan {
    let detected = num_cpus::get().max(1);
    let reserved = if detected >= 6 { 2 } else { 1 };
    let used = if requested == 0 {
        detected.saturating_sub(reserved).max(1)
    } else {
        requested.min(detected)
    };
    ThreadPlan {
        detected,
        reserved,
        used,
    }
}

/// fans the experiment out over OS threads. each worker draws run
/// indices off a shared counter, derives the run seed from the base
/// seed, executes one full run into the shared aggregator, and then,
/// under the one mutex, evaluates the stopping rule and emits
/// diagnostics. the per-step hot path never takes a lock; workers only
/// observe the stop flag between runs, so the aggregator never sees a
/// partial run.
pub struct Pool<'a, G: Geometry> {
    geom: &'a G,
    job: Job,
    threads: usize,
    base_seed: u64,
    checkpoints: &'a [Moves],
    curve: &'a CurveAggregator,
}

impl<'a, G: Geometry> Pool<'a, G> {
    pub fn new(
        geom: &'a G,
        job: Job,
        threads: usize,
        base_seed: u64,
        checkpoints: &'a [Moves],
        curve: &'a CurveAggregator,
    ) -> Self {
        Self {
            geom,
            job,
            threads,
            base_seed,
            checkpoints,
            curve,
        }
    }

    /// run until the anytime-CS rule fires. returns completed runs.
    pub fn run(&self) -> u64 {
        let plan = thread_plan(self.threads);
        log::info!(
            "hw threads: {} using {} worker thread(s) (reserved {})",
            plan.detected,
            plan.used,
            plan.reserved,
        );
        let job = self.job;
        let k = self.checkpoints.len() as u64;
        let stop = AtomicBool::new(false);
        let runs = AtomicU64::new(0);
        let monitor = Mutex::new(Monitor::new(job.alpha, job.eps, job.debug_every));
        std::thread::scope(|scope| {
            for _ in 0..plan.used {
                scope.spawn(|| {
                    while !stop.load(Relaxed) {
                        let (run, seed) = rng::next_seed(self.base_seed, &runs);
                        let result = driver::run_once_segmented(
                            self.geom,
                            job.density,
                            job.tau,
                            job.rule,
                            seed,
                            self.checkpoints,
                            self.curve,
                        );
                        let mut guard = monitor.lock().expect("pool mutex");
                        guard.on_run(run, self.curve, &result);
                        let n = self.curve.count_at(0);
                        if stopping::should_stop(n, k, job.alpha, job.eps, 1.0) {
                            stop.store(true, Relaxed);
                        }
                    }
                });
            }
        });
        monitor.into_inner().expect("pool mutex").completed()
    }
}
