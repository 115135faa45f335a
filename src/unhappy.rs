use crate::Vertex;
use crate::geometry::Geometry;
use crate::world::BitWorld;
use crate::world::NONE;
use rand::Rng;
use rand::rngs::SmallRng;

/// rational satisfaction threshold p/q, kept in integer arithmetic so
/// the happiness test never drifts with floating point. an agent with
/// `same` same-type occupied neighbors out of `deg` occupied neighbors
/// is satisfied iff same * q >= p * deg; an isolated agent is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    p: u32,
    q: u32,
}

impl Threshold {
    pub fn new(p: u32, q: u32) -> Self {
        Self { p, q }
    }
    pub fn satisfied(&self, same: u32, deg: u32) -> bool {
        if deg == 0 {
            return true;
        }
        u64::from(same) * u64::from(self.q) >= u64::from(self.p) * u64::from(deg)
    }
}

impl From<f64> for Threshold {
    fn from(frac: f64) -> Self {
        Self {
            p: (frac * 1000.0 + 0.5) as u32,
            q: 1000,
        }
    }
}

/// exact membership of the unhappy occupied vertices, maintained
/// incrementally: a dense list plus back-indices for O(1) swap-remove
/// and O(1) uniform random pick. after every world mutation the caller
/// re-scans the affected neighborhoods so that
/// `v in list <=> occupied(v) && scan says unhappy(v)`.
#[derive(Debug, Clone)]
pub struct UnhappySet {
    tau: Threshold,
    list: Vec<Vertex>,
    pos: Vec<Vertex>,
}

impl UnhappySet {
    pub fn new(n: Vertex, tau: Threshold) -> Self {
        Self {
            tau,
            list: Vec::new(),
            pos: vec![NONE; n as usize],
        }
    }

    pub fn threshold(&self) -> Threshold {
        self.tau
    }
    pub fn count(&self) -> u32 {
        self.list.len() as u32
    }
    pub fn has_any(&self) -> bool {
        !self.list.is_empty()
    }
    pub fn contains(&self, v: Vertex) -> bool {
        self.pos[v as usize] != NONE
    }

    /// discard current membership and rebuild from a full scan
    pub fn rebuild<G: Geometry>(&mut self, geom: &G, world: &BitWorld) {
        self.list.clear();
        self.pos.fill(NONE);
        world.for_each_agent(|v, _| {
            if self.is_unhappy_from_scan(geom, world, v) {
                self.pos[v as usize] = self.list.len() as Vertex;
                self.list.push(v);
            }
        });
    }

    /// v must be occupied. counts occupied neighbors and same-type
    /// occupied neighbors in one pass over the neighborhood.
    pub fn is_unhappy_from_scan<G: Geometry>(&self, geom: &G, world: &BitWorld, v: Vertex) -> bool {
        debug_assert!(world.is_occupied(v));
        let t = world.type_of(v);
        let mut deg = 0u32;
        let mut same = 0u32;
        geom.for_each_neighbor(v, |u| {
            if world.is_occupied(u) {
                deg += 1;
                if world.type_of(u) == t {
                    same += 1;
                }
            }
        });
        !self.tau.satisfied(same, deg)
    }

    /// re-derive v's flag from the world and fix membership.
    /// an empty vertex is never unhappy.
    pub fn refresh<G: Geometry>(&mut self, geom: &G, world: &BitWorld, v: Vertex) {
        if !world.is_occupied(v) {
            self.set(v, false);
        } else {
            let unhappy = self.is_unhappy_from_scan(geom, world, v);
            self.set(v, unhappy);
        }
    }

    /// idempotent flag write: append on true, swap-remove on false
    pub fn set(&mut self, v: Vertex, unhappy: bool) {
        let p = self.pos[v as usize];
        if unhappy {
            if p == NONE {
                self.pos[v as usize] = self.list.len() as Vertex;
                self.list.push(v);
            }
        } else if p != NONE {
            let last = self.list.len() - 1;
            let moved = self.list[last];
            self.list[p as usize] = moved;
            self.pos[moved as usize] = p;
            self.list.pop();
            self.pos[v as usize] = NONE;
        }
    }

    /// uniform draw from the unhappy list. undefined when empty.
    pub fn random_pick(&self, rng: &mut SmallRng) -> Vertex {
        debug_assert!(!self.list.is_empty());
        self.list[rng.random_range(0..self.list.len())]
    }
}
