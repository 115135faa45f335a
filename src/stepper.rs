use crate::Moves;
use crate::Vertex;
use crate::geometry::Geometry;
use crate::metrics;
use crate::unhappy::Threshold;
use crate::unhappy::UnhappySet;
use crate::world::BitWorld;
use rand::rngs::SmallRng;

/// how a relocating agent chooses its destination.
/// `Any` takes a uniformly random empty site, unconditionally.
/// `First` samples up to k random empty sites and takes the first
/// whose neighborhood would satisfy the threshold, staying put when
/// none of the candidates passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRule {
    Any,
    First { k: u32 },
}

/// one relocation event at a time: pick a random unhappy agent, pick a
/// destination under the move rule, move, and repair the unhappy set by
/// re-scanning the two touched neighborhoods. everything is O(deg^2)
/// per step; there are no global scans anywhere in the loop.
pub struct Stepper<'a, G: Geometry> {
    geom: &'a G,
    world: BitWorld,
    unhappy: UnhappySet,
    rule: MoveRule,
    moves: Moves,
}

impl<'a, G: Geometry> Stepper<'a, G> {
    pub fn new(geom: &'a G, world: BitWorld, tau: Threshold, rule: MoveRule) -> Self {
        let mut unhappy = UnhappySet::new(geom.n(), tau);
        unhappy.rebuild(geom, &world);
        Self {
            geom,
            world,
            unhappy,
            rule,
            moves: 0,
        }
    }

    pub fn world(&self) -> &BitWorld {
        &self.world
    }
    pub fn unhappy(&self) -> &UnhappySet {
        &self.unhappy
    }
    pub fn unhappy_count(&self) -> u32 {
        self.unhappy.count()
    }
    pub fn moves(&self) -> Moves {
        self.moves
    }

    /// equilibrium: nobody left to move
    pub fn converged(&self) -> bool {
        !self.unhappy.has_any()
    }
    /// unhappy agents remain but there is nowhere to go
    pub fn stuck(&self) -> bool {
        self.unhappy.has_any() && !self.world.has_empty()
    }
    /// no step can succeed from this state
    pub fn halted(&self) -> bool {
        !self.unhappy.has_any() || !self.world.has_empty()
    }

    /// one relocation attempt. returns true iff an agent moved.
    pub fn step(&mut self, rng: &mut SmallRng) -> bool {
        if !self.unhappy.has_any() {
            return false;
        }
        if !self.world.has_empty() {
            return false;
        }
        let from = self.unhappy.random_pick(rng);
        if !self.world.is_occupied(from) {
            return false;
        }
        let t = self.world.type_of(from);
        let to = match self.rule {
            MoveRule::Any => self.world.random_empty(rng),
            MoveRule::First { k } => match self.first_accepting(t, k, rng) {
                Some(to) => to,
                None => return false,
            },
        };
        if to == from {
            return false;
        }
        self.unhappy.set(from, false);
        self.world.set_empty(from);
        self.world.set_occupied(to, t);
        self.reconcile(from, to);
        self.moves += 1;
        true
    }

    /// run up to `attempts` step attempts; stops early once halted.
    /// returns the number of successful moves, which equals the number
    /// of attempts spent under the `Any` rule.
    pub fn advance(&mut self, attempts: Moves, rng: &mut SmallRng) -> Moves {
        let mut moved = 0;
        for _ in 0..attempts {
            if self.halted() {
                break;
            }
            if self.step(rng) {
                moved += 1;
            }
        }
        moved
    }

    /// both endpoints changed occupancy, so only their neighborhoods
    /// (and the moved agent itself) can have flipped happiness
    fn reconcile(&mut self, from: Vertex, to: Vertex) {
        let Self {
            geom,
            world,
            unhappy,
            ..
        } = self;
        let geom = *geom;
        geom.for_each_neighbor(from, |u| unhappy.refresh(geom, world, u));
        geom.for_each_neighbor(to, |u| unhappy.refresh(geom, world, u));
        unhappy.refresh(geom, world, to);
    }

    /// destination search for the `First` rule: candidates are drawn
    /// with replacement and judged on their pre-move neighborhoods
    fn first_accepting(&self, t: bool, k: u32, rng: &mut SmallRng) -> Option<Vertex> {
        let tau = self.unhappy.threshold();
        let tries = k.max(1).min(self.world.empties());
        for _ in 0..tries {
            let cand = self.world.random_empty(rng);
            let (same, deg) = metrics::neighbor_counts(self.geom, &self.world, cand, t);
            if tau.satisfied(same, deg) {
                return Some(cand);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Lollipop;
    use crate::geometry::Torus;
    use rand::SeedableRng;

    fn assert_membership<G: Geometry>(stepper: &Stepper<'_, G>, geom: &G) {
        let world = stepper.world();
        let unhappy = stepper.unhappy();
        for v in 0..geom.n() {
            let expect = world.is_occupied(v) && unhappy.is_unhappy_from_scan(geom, world, v);
            assert!(unhappy.contains(v) == expect);
        }
    }

    #[test]
    fn full_world_cannot_move() {
        // two opposed agents fill the whole clique: unhappy forever
        let g = Lollipop::new(2, 0);
        let mut w = BitWorld::new(g.n());
        w.set_occupied(0, false);
        w.set_occupied(1, true);
        let mut stepper = Stepper::new(&g, w, Threshold::from(0.5), MoveRule::Any);
        let ref mut rng = SmallRng::seed_from_u64(1);
        assert!(stepper.unhappy_count() == 2);
        assert!(stepper.stuck());
        assert!(!stepper.step(rng));
        assert!(stepper.unhappy_count() == 2);
        assert!(stepper.moves() == 0);
    }

    #[test]
    fn equilibrium_never_steps() {
        let g = Torus::new(4, 4);
        let mut w = BitWorld::new(g.n());
        w.set_occupied(0, true);
        w.set_occupied(1, true);
        let mut stepper = Stepper::new(&g, w, Threshold::from(0.5), MoveRule::Any);
        let ref mut rng = SmallRng::seed_from_u64(1);
        assert!(stepper.converged());
        assert!(!stepper.step(rng));
        assert!(stepper.moves() == 0);
    }

    #[test]
    fn any_move_relocates_and_repairs() {
        // opposed adjacent pair on an otherwise empty torus
        let g = Torus::new(4, 4);
        let mut w = BitWorld::new(g.n());
        w.set_occupied(0, false);
        w.set_occupied(1, true);
        let mut stepper = Stepper::new(&g, w, Threshold::from(0.5), MoveRule::Any);
        assert!(stepper.unhappy_count() == 2);
        let ref mut rng = SmallRng::seed_from_u64(4);
        assert!(stepper.step(rng));
        assert!(stepper.moves() == 1);
        assert!(stepper.world().agents() == 2);
        assert_membership(&stepper, &g);
    }

    #[test]
    fn membership_invariant_survives_churn() {
        let ref mut rng = SmallRng::seed_from_u64(33);
        let g = Torus::new(8, 8);
        let mut w = BitWorld::new(g.n());
        w.random_fill(40, rng);
        let mut stepper = Stepper::new(&g, w, Threshold::from(0.5), MoveRule::Any);
        assert_membership(&stepper, &g);
        for _ in 0..500 {
            if !stepper.step(rng) {
                break;
            }
            assert_membership(&stepper, &g);
        }
    }

    #[test]
    fn move_count_tracks_successes_only() {
        let ref mut rng = SmallRng::seed_from_u64(8);
        let g = Torus::new(6, 6);
        let mut w = BitWorld::new(g.n());
        w.random_fill(20, rng);
        let mut stepper = Stepper::new(&g, w, Threshold::from(0.5), MoveRule::Any);
        let moved = stepper.advance(1000, rng);
        assert!(stepper.moves() == moved);
        assert!(moved <= 1000);
        if !stepper.halted() {
            // under Any every non-halted attempt is a move
            assert!(moved == 1000);
        }
    }

    #[test]
    fn replay_is_deterministic() {
        let run = |seed| {
            let ref mut rng = SmallRng::seed_from_u64(seed);
            let g = Torus::new(8, 8);
            let mut w = BitWorld::new(g.n());
            w.random_fill(32, rng);
            let mut stepper = Stepper::new(&g, w, Threshold::from(0.5), MoveRule::Any);
            stepper.advance(300, rng);
            let mut layout = Vec::new();
            stepper.world().for_each_agent(|v, t| layout.push((v, t)));
            layout.sort();
            (stepper.moves(), stepper.unhappy_count(), layout)
        };
        assert!(run(77) == run(77));
    }

    #[test]
    fn first_rule_stays_put_when_nothing_accepts() {
        // lone dissenter in a clique; the only vacancy neighbors an
        // opposite-type agent, so every candidate is rejected
        let g = Lollipop::new(3, 1);
        let mut w = BitWorld::new(g.n());
        w.set_occupied(0, true);
        w.set_occupied(1, false);
        w.set_occupied(2, false);
        let mut stepper = Stepper::new(&g, w, Threshold::from(0.5), MoveRule::First { k: 8 });
        assert!(stepper.unhappy_count() == 1);
        let ref mut rng = SmallRng::seed_from_u64(6);
        assert!(!stepper.step(rng));
        assert!(stepper.moves() == 0);
        assert!(stepper.world().is_occupied(0));
        assert_membership(&stepper, &g);
    }

    #[test]
    fn first_rule_takes_an_accepting_site() {
        // opposed pair at the clique end of a short lollipop; the far
        // path tip is isolated, hence always accepting
        let g = Lollipop::new(2, 2);
        let mut w = BitWorld::new(g.n());
        w.set_occupied(0, false);
        w.set_occupied(1, true);
        let mut stepper = Stepper::new(&g, w, Threshold::from(0.5), MoveRule::First { k: 64 });
        assert!(stepper.unhappy_count() == 2);
        let ref mut rng = SmallRng::seed_from_u64(10);
        assert!(stepper.step(rng));
        assert!(stepper.moves() == 1);
        assert_membership(&stepper, &g);
    }
}
