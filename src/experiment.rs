use crate::aggregator::CurveAggregator;
use crate::checkpoints;
use crate::config::GraphKind;
use crate::config::Settings;
use crate::geometry::Lollipop;
use crate::geometry::Torus;
use crate::observe;
use crate::pool::Job;
use crate::pool::Pool;
use crate::rng;
use crate::stepper::MoveRule;
use crate::unhappy::Threshold;

/// the top-level experiment: one checkpoint schedule, one shared
/// aggregator, one pool of workers over the chosen geometry. returns
/// once the anytime-CS rule has certified the curve.
pub fn run(settings: &Settings) {
    let base_seed = if settings.seed == 0 {
        rng::auto_seed()
    } else {
        settings.seed
    };
    let checkpoints = checkpoints::log_spaced(crate::CURVE_HORIZON, crate::CURVE_POINTS);
    let curve = CurveAggregator::new(checkpoints.len());
    banner(settings, base_seed);

    let job = Job {
        density: settings.density,
        tau: Threshold::from(settings.threshold),
        rule: settings.rule,
        alpha: settings.alpha,
        eps: settings.eps,
        debug_every: settings.debug_every,
    };
    let completed = match settings.graph {
        GraphKind::Torus => {
            let geom = Torus::new(settings.dims.0, settings.dims.1);
            Pool::new(&geom, job, settings.threads, base_seed, &checkpoints, &curve).run()
        }
        GraphKind::Lollipop => {
            let geom = Lollipop::new(settings.dims.0, settings.dims.1);
            Pool::new(&geom, job, settings.threads, base_seed, &checkpoints, &curve).run()
        }
    };
    log::info!("completed {} runs", completed);
    if settings.plot {
        observe::dump_curve(&checkpoints, &curve, settings.alpha);
    }

    println!(
        "done. stopped by anytime-CS rule. eps={:.6} alpha={:.6}",
        settings.eps, settings.alpha,
    );
}

fn banner(settings: &Settings, seed: u64) {
    let (a, b) = settings.dims;
    let (graph, sep) = match settings.graph {
        GraphKind::Torus => ("torus", 'x'),
        GraphKind::Lollipop => ("lollipop", ':'),
    };
    let (rule, k) = match settings.rule {
        MoveRule::Any => ("any", 1),
        MoveRule::First { k } => ("first", k),
    };
    log::info!(
        "config: graph={} size={}{}{} move={} density={:.3} threshold={:.3} \
         alpha={:.6} eps={:.6} k={} threads={} seed={} plot={} debug={}",
        graph,
        a,
        sep,
        b,
        rule,
        settings.density,
        settings.threshold,
        settings.alpha,
        settings.eps,
        k,
        settings.threads,
        seed,
        if settings.plot { "on" } else { "off" },
        if settings.debug { "on" } else { "off" },
    );
}
