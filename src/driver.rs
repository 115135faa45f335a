use crate::Moves;
use crate::Vertex;
use crate::aggregator::CurveAggregator;
use crate::geometry::Geometry;
use crate::metrics;
use crate::stepper::MoveRule;
use crate::stepper::Stepper;
use crate::unhappy::Threshold;
use crate::world::BitWorld;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// what a single run leaves behind once its samples are in the
/// aggregator. thread-local and ephemeral.
#[derive(Debug, Clone, Copy)]
pub struct RunResult {
    pub agents: u32,
    pub seed: u64,
    pub moves: Moves,
    pub converged: bool,
    pub init_unhappy: u32,
    pub final_unhappy: u32,
    pub final_avg_same: f64,
}

/// one full run: fill a fresh world from the seed, then advance the
/// stepper checkpoint by checkpoint, recording the unhappy count at
/// each into the shared curve. a converged run pads exact zeros over
/// the remaining checkpoints; a run with nowhere left to move freezes
/// its current count instead. runs never fail: degenerate inputs
/// (N = 0, density = 0) converge immediately.
pub fn run_once_segmented<G: Geometry>(
    geom: &G,
    density: f64,
    tau: Threshold,
    rule: MoveRule,
    seed: u64,
    checkpoints: &[Moves],
    curve: &CurveAggregator,
) -> RunResult {
    let n = geom.n();
    let agents = ((density * f64::from(n)).round() as i64).clamp(0, i64::from(n)) as Vertex;
    let ref mut rng = SmallRng::seed_from_u64(seed);
    let mut world = BitWorld::new(n);
    world.random_fill(agents, rng);
    let mut stepper = Stepper::new(geom, world, tau, rule);
    let u0 = stepper.unhappy_count();
    curve.record(0, u0, agents);

    let mut last_u = u0;
    let mut total: Moves = 0;
    let mut k = 1;
    while k < checkpoints.len() && !stepper.converged() {
        let target = checkpoints[k];
        while total < target {
            let moved = stepper.advance(target - total, rng);
            total += moved;
            if stepper.halted() || moved == 0 {
                break;
            }
        }
        last_u = stepper.unhappy_count();
        if !stepper.converged() && total < target {
            // no further progress is possible; the curve holds flat
            for frozen in k..checkpoints.len() {
                curve.record(frozen, last_u, agents);
            }
            break;
        }
        curve.record(k, last_u, agents);
        k += 1;
    }
    if stepper.converged() {
        last_u = 0;
        curve.pad_zeros_from(k);
    }
    RunResult {
        agents,
        seed,
        moves: total,
        converged: stepper.converged(),
        init_unhappy: u0,
        final_unhappy: last_u,
        final_avg_same: metrics::scan(geom, stepper.world(), tau).avg_same,
    }
}
