use crate::Vertex;
use crate::geometry::Geometry;
use crate::unhappy::Threshold;
use crate::world::BitWorld;

/// full-scan snapshot of the population: exact unhappy count and the
/// average same-type neighbor fraction. O(N * deg), so it serves as
/// the oracle for the incremental tracker and for one-shot diagnostics,
/// never the hot path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scan {
    pub unhappy: u32,
    pub avg_same: f64,
}

pub fn scan<G: Geometry>(geom: &G, world: &BitWorld, tau: Threshold) -> Scan {
    let mut unhappy = 0u32;
    let mut sum_frac = 0.0f64;
    let mut agents = 0u64;
    world.for_each_agent(|v, t| {
        let (same, deg) = neighbor_counts(geom, world, v, t);
        // isolated agents count as fully assorted
        let frac = if deg == 0 {
            1.0
        } else {
            f64::from(same) / f64::from(deg)
        };
        sum_frac += frac;
        if !tau.satisfied(same, deg) {
            unhappy += 1;
        }
        agents += 1;
    });
    let avg_same = if agents == 0 {
        0.0
    } else {
        sum_frac / agents as f64
    };
    Scan { unhappy, avg_same }
}

/// (same-type occupied neighbors, occupied neighbors) of v for type t
pub fn neighbor_counts<G: Geometry>(
    geom: &G,
    world: &BitWorld,
    v: Vertex,
    t: bool,
) -> (u32, u32) {
    let mut same = 0u32;
    let mut deg = 0u32;
    geom.for_each_neighbor(v, |u| {
        if world.is_occupied(u) {
            deg += 1;
            if world.type_of(u) == t {
                same += 1;
            }
        }
    });
    (same, deg)
}
