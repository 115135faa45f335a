pub mod aggregator;
pub mod checkpoints;
pub mod config;
pub mod driver;
pub mod experiment;
pub mod geometry;
pub mod metrics;
pub mod observe;
pub mod pool;
pub mod rng;
pub mod stepper;
pub mod stopping;
pub mod unhappy;
pub mod world;

/// dimensional analysis types
pub type Vertex = u32;
pub type Moves = u64;

// curve sampling parameters
pub const CURVE_HORIZON: Moves = 2_000_000;
pub const CURVE_POINTS: usize = 96;

/// initialize logging. diagnostics go to stderr so that stdout
/// carries nothing but the completion line.
pub fn init(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}
