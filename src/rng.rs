use std::hash::Hash;
use std::hash::Hasher;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// SplitMix64 finalizer. one round of the stateless mixer,
/// used both as a key-stretcher for the per-run seed stream
/// and to whiten the entropy sources of the auto seed.
pub fn mix64(z: u64) -> u64 {
    let mut z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// the seed of run r is a pure function of the base seed,
/// so a single-threaded replay with the same base seed
/// reproduces every run byte for byte.
pub fn run_seed(base: u64, run: u64) -> u64 {
    mix64(base.wrapping_add(run))
}

/// draw the next run index off a shared counter and derive its seed.
pub fn next_seed(base: u64, counter: &AtomicU64) -> (u64, u64) {
    let run = counter.fetch_add(1, Ordering::Relaxed);
    (run, run_seed(base, run))
}

/// base seed for seed=auto: OS entropy, the wall clock, the thread id,
/// and a stack address, each whitened through the finalizer.
pub fn auto_seed() -> u64 {
    let clock = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    let mut seed = mix64(rand::random::<u64>());
    seed ^= mix64(clock);
    seed ^= mix64(hasher.finish());
    seed ^= mix64(&clock as *const u64 as usize as u64);
    if seed == 0 {
        seed = 0x9e3779b97f4a7c15;
    }
    seed
}
