use crate::Vertex;
use rand::Rng;
use rand::rngs::SmallRng;

/// sentinel for the position maps: vertex not present in the list
pub const NONE: Vertex = Vertex::MAX;

/// occupancy and color state over N vertices, bit-packed into two
/// u64 planes, plus dense index lists of empty and occupied vertices
/// with back-indices for O(1) swap-remove. the lists are what make
/// uniform random selection of an empty (or occupied) site O(1).
#[derive(Debug, Clone)]
pub struct BitWorld {
    n: Vertex,
    occ: Vec<u64>,
    typ: Vec<u64>,
    empties: Vec<Vertex>,
    occupied: Vec<Vertex>,
    pos_in_empties: Vec<Vertex>,
    pos_in_occupied: Vec<Vertex>,
}

impl BitWorld {
    /// everything starts empty: empties = [0, N), occupied = []
    pub fn new(n: Vertex) -> Self {
        let words = (n as usize).div_ceil(64);
        Self {
            n,
            occ: vec![0; words],
            typ: vec![0; words],
            empties: (0..n).collect(),
            occupied: Vec::with_capacity(n as usize),
            pos_in_empties: (0..n).collect(),
            pos_in_occupied: vec![NONE; n as usize],
        }
    }

    pub fn n(&self) -> Vertex {
        self.n
    }
    pub fn agents(&self) -> u32 {
        self.occupied.len() as u32
    }
    pub fn empties(&self) -> u32 {
        self.empties.len() as u32
    }
    pub fn has_empty(&self) -> bool {
        !self.empties.is_empty()
    }

    pub fn is_occupied(&self, v: Vertex) -> bool {
        (self.occ[v as usize / 64] >> (v % 64)) & 1 == 1
    }

    /// only meaningful while v is occupied
    pub fn type_of(&self, v: Vertex) -> bool {
        (self.typ[v as usize / 64] >> (v % 64)) & 1 == 1
    }

    /// vacate v. idempotent: a vertex already empty stays where it is.
    pub fn set_empty(&mut self, v: Vertex) {
        if self.is_occupied(v) {
            self.occ[v as usize / 64] &= !(1u64 << (v % 64));
            let p = self.pos_in_occupied[v as usize];
            let last = self.occupied.len() - 1;
            let moved = self.occupied[last];
            self.occupied[p as usize] = moved;
            self.pos_in_occupied[moved as usize] = p;
            self.occupied.pop();
            self.pos_in_occupied[v as usize] = NONE;
        }
        if self.pos_in_empties[v as usize] == NONE {
            self.pos_in_empties[v as usize] = self.empties.len() as Vertex;
            self.empties.push(v);
        }
    }

    /// place an agent of type t at v. idempotent on list membership;
    /// the type bit is rewritten either way.
    pub fn set_occupied(&mut self, v: Vertex, t: bool) {
        if !self.is_occupied(v) {
            self.occ[v as usize / 64] |= 1u64 << (v % 64);
            let p = self.pos_in_empties[v as usize];
            if p != NONE {
                let last = self.empties.len() - 1;
                let moved = self.empties[last];
                self.empties[p as usize] = moved;
                self.pos_in_empties[moved as usize] = p;
                self.empties.pop();
                self.pos_in_empties[v as usize] = NONE;
            }
        }
        if t {
            self.typ[v as usize / 64] |= 1u64 << (v % 64);
        } else {
            self.typ[v as usize / 64] &= !(1u64 << (v % 64));
        }
        if self.pos_in_occupied[v as usize] == NONE {
            self.pos_in_occupied[v as usize] = self.occupied.len() as Vertex;
            self.occupied.push(v);
        }
    }

    /// uniform draw over empty sites. undefined when none remain.
    pub fn random_empty(&self, rng: &mut SmallRng) -> Vertex {
        debug_assert!(!self.empties.is_empty());
        self.empties[rng.random_range(0..self.empties.len())]
    }

    /// uniform draw over occupied sites. undefined when none exist.
    pub fn random_occupied(&self, rng: &mut SmallRng) -> Vertex {
        debug_assert!(!self.occupied.is_empty());
        self.occupied[rng.random_range(0..self.occupied.len())]
    }

    /// place `agents` agents on distinct uniform vertices via a partial
    /// Fisher-Yates over [0, N), with types drawn uniformly from {0, 1}.
    /// fully reproducible from the rng state.
    pub fn random_fill(&mut self, agents: Vertex, rng: &mut SmallRng) {
        let n = self.n;
        let agents = agents.min(n);
        let mut idx: Vec<Vertex> = (0..n).collect();
        for i in 0..agents {
            let j = rng.random_range(i..n);
            idx.swap(i as usize, j as usize);
            let v = idx[i as usize];
            let t = rng.random::<bool>();
            self.set_occupied(v, t);
        }
    }

    /// visit (vertex, type) for every agent
    pub fn for_each_agent<F: FnMut(Vertex, bool)>(&self, mut f: F) {
        for &v in &self.occupied {
            f(v, self.type_of(v));
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        assert!(self.occupied.len() + self.empties.len() == self.n as usize);
        for v in 0..self.n {
            let po = self.pos_in_occupied[v as usize];
            let pe = self.pos_in_empties[v as usize];
            if self.is_occupied(v) {
                assert!(po != NONE && pe == NONE);
                assert!(self.occupied[po as usize] == v);
            } else {
                assert!(pe != NONE && po == NONE);
                assert!(self.empties[pe as usize] == v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn starts_fully_empty() {
        let w = BitWorld::new(130);
        assert!(w.agents() == 0);
        assert!(w.empties() == 130);
        assert!((0..130).all(|v| !w.is_occupied(v)));
        w.assert_invariants();
    }

    #[test]
    fn occupy_then_vacate_round_trips() {
        let mut w = BitWorld::new(70);
        let before = w.clone();
        w.set_occupied(65, true);
        assert!(w.is_occupied(65));
        assert!(w.type_of(65));
        assert!(w.agents() == 1 && w.empties() == 69);
        w.set_empty(65);
        assert!(!w.is_occupied(65));
        assert!(w.agents() == before.agents());
        assert!(w.empties() == before.empties());
        w.assert_invariants();
    }

    #[test]
    fn mutators_are_idempotent() {
        let mut w = BitWorld::new(10);
        w.set_occupied(3, false);
        w.set_occupied(3, true);
        assert!(w.agents() == 1);
        assert!(w.type_of(3));
        w.set_empty(3);
        w.set_empty(3);
        assert!(w.agents() == 0 && w.empties() == 10);
        w.assert_invariants();
    }

    #[test]
    fn invariants_hold_under_random_churn() {
        let ref mut rng = SmallRng::seed_from_u64(7);
        let mut w = BitWorld::new(257);
        for _ in 0..5000 {
            let v = rng.random_range(0..257);
            if rng.random::<bool>() {
                w.set_occupied(v, rng.random::<bool>());
            } else {
                w.set_empty(v);
            }
            w.assert_invariants();
        }
    }

    #[test]
    fn random_fill_places_exact_count() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let mut w = BitWorld::new(100);
        w.random_fill(37, rng);
        assert!(w.agents() == 37);
        assert!(w.empties() == 63);
        w.assert_invariants();
    }

    #[test]
    fn random_fill_is_reproducible() {
        let fill = |seed| {
            let ref mut rng = SmallRng::seed_from_u64(seed);
            let mut w = BitWorld::new(64);
            w.random_fill(32, rng);
            let mut layout = Vec::new();
            w.for_each_agent(|v, t| layout.push((v, t)));
            layout
        };
        assert!(fill(9) == fill(9));
        assert!(fill(9) != fill(10));
    }

    #[test]
    fn random_draws_come_from_the_right_list() {
        let ref mut rng = SmallRng::seed_from_u64(3);
        let mut w = BitWorld::new(50);
        w.random_fill(20, rng);
        for _ in 0..100 {
            let e = w.random_empty(rng);
            assert!(!w.is_occupied(e));
            let o = w.random_occupied(rng);
            assert!(w.is_occupied(o));
        }
    }

    #[test]
    fn fill_saturates_at_n() {
        let ref mut rng = SmallRng::seed_from_u64(5);
        let mut w = BitWorld::new(8);
        w.random_fill(100, rng);
        assert!(w.agents() == 8);
        assert!(!w.has_empty());
        w.assert_invariants();
    }
}
