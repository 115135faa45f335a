use crate::stepper::MoveRule;
use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Torus,
    Lollipop,
}

/// command line. every knob is optional here so a config file can
/// supply it; explicit flags always win the merge.
#[derive(Parser, Debug, Default)]
#[command(
    name = "schelling",
    version,
    about = "Schelling-process Monte-Carlo engine with anytime-valid stopping"
)]
pub struct Cli {
    /// TOML config file; explicit flags override its keys
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// torus or lollipop
    #[arg(long)]
    pub graph: Option<String>,
    /// WxH for a torus (256x256), m:n for a lollipop (64:512)
    #[arg(long)]
    pub size: Option<String>,
    /// any (relocate blindly) or first (first accepting of k draws)
    #[arg(long = "move")]
    pub rule: Option<String>,
    /// agent fraction in (0, 1]
    #[arg(long)]
    pub density: Option<f64>,
    /// satisfaction threshold in [0, 1]
    #[arg(long)]
    pub threshold: Option<f64>,
    /// familywise error of the confidence sequence
    #[arg(long)]
    pub alpha: Option<f64>,
    /// sup-norm stopping tolerance
    #[arg(long, visible_alias = "delta")]
    pub eps: Option<f64>,
    /// worker threads; 0 = auto (leave a core or two free)
    #[arg(long)]
    pub threads: Option<usize>,
    /// base seed; 0 = derive from entropy
    #[arg(long)]
    pub seed: Option<u64>,
    /// candidate draws per step under --move first
    #[arg(long)]
    pub k: Option<u32>,
    /// log the aggregated curve at completion
    #[arg(long)]
    pub plot: Option<bool>,
    /// verbose progress
    #[arg(long)]
    pub debug: Option<bool>,
    /// progress line cadence in completed runs
    #[arg(long)]
    pub debug_every: Option<u64>,
}

/// the same knobs as the CLI, read from a TOML file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub graph: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "move")]
    pub rule: Option<String>,
    pub density: Option<f64>,
    pub threshold: Option<f64>,
    pub alpha: Option<f64>,
    pub eps: Option<f64>,
    pub threads: Option<usize>,
    pub seed: Option<u64>,
    pub k: Option<u32>,
    pub plot: Option<bool>,
    pub debug: Option<bool>,
    pub debug_every: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("graph must be 'torus' or 'lollipop'; got '{0}'")]
    Graph(String),
    #[error("move must be 'any' or 'first'; got '{0}'")]
    Move(String),
    #[error("size is required: WxH for a torus, m:n for a lollipop")]
    SizeMissing,
    #[error("size '{0}' is invalid for the selected graph")]
    Size(String),
    #[error("density must be in (0, 1]")]
    Density,
    #[error("threshold must be in [0, 1]")]
    Threshold,
    #[error("alpha must be in (0, 1)")]
    Alpha,
    #[error("eps must be > 0")]
    Eps,
    #[error("k must be >= 1")]
    Candidates,
}

/// effective configuration after the file/CLI merge and validation
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub graph: GraphKind,
    pub dims: (u32, u32),
    pub rule: MoveRule,
    pub density: f64,
    pub threshold: f64,
    pub alpha: f64,
    pub eps: f64,
    pub threads: usize,
    pub seed: u64,
    pub plot: bool,
    pub debug: bool,
    pub debug_every: u64,
}

impl Settings {
    pub fn resolve(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read config {}", path.display()))?;
                toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?
            }
            None => FileConfig::default(),
        };
        Ok(Self::merge(cli, file)?)
    }

    fn merge(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let graph = match cli.graph.or(file.graph) {
            None => GraphKind::Torus,
            Some(s) => match s.to_ascii_lowercase().as_str() {
                "torus" => GraphKind::Torus,
                "lollipop" => GraphKind::Lollipop,
                _ => return Err(ConfigError::Graph(s)),
            },
        };
        let dims = match cli.size.or(file.size) {
            None => return Err(ConfigError::SizeMissing),
            Some(s) => parse_size(&s, graph).ok_or(ConfigError::Size(s))?,
        };
        let k = cli.k.or(file.k).unwrap_or(32);
        if k == 0 {
            return Err(ConfigError::Candidates);
        }
        let rule = match cli.rule.or(file.rule) {
            None => MoveRule::Any,
            Some(s) => match s.to_ascii_lowercase().as_str() {
                "any" => MoveRule::Any,
                "first" => MoveRule::First { k },
                _ => return Err(ConfigError::Move(s)),
            },
        };
        let density = cli.density.or(file.density).unwrap_or(0.0);
        if !(density > 0.0 && density <= 1.0) {
            return Err(ConfigError::Density);
        }
        let threshold = cli.threshold.or(file.threshold).unwrap_or(0.5);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Threshold);
        }
        let alpha = cli.alpha.or(file.alpha).unwrap_or(1e-4);
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ConfigError::Alpha);
        }
        let eps = cli.eps.or(file.eps).unwrap_or(5e-4);
        if !(eps > 0.0) {
            return Err(ConfigError::Eps);
        }
        Ok(Self {
            graph,
            dims,
            rule,
            density,
            threshold,
            alpha,
            eps,
            threads: cli.threads.or(file.threads).unwrap_or(0),
            seed: cli.seed.or(file.seed).unwrap_or(0),
            plot: cli.plot.or(file.plot).unwrap_or(true),
            debug: cli.debug.or(file.debug).unwrap_or(false),
            debug_every: cli.debug_every.or(file.debug_every).unwrap_or(10).max(1),
        })
    }
}

/// torus sizes read WxH, lollipop sizes m:n; either separator is
/// accepted on input and normalized by graph kind. both torus
/// dimensions must be positive; a lollipop only needs its clique,
/// so m:0 (no path, no bridge) is a legal shape.
fn parse_size(s: &str, graph: GraphKind) -> Option<(u32, u32)> {
    let sep = match graph {
        GraphKind::Torus => 'x',
        GraphKind::Lollipop => ':',
    };
    let normal: String = s
        .chars()
        .map(|c| match c {
            'x' | 'X' | '+' | ':' => sep,
            _ => c,
        })
        .collect();
    let (a, b) = normal.split_once(sep)?;
    let a = a.trim().parse::<u32>().ok()?;
    let b = b.trim().parse::<u32>().ok()?;
    let valid = match graph {
        GraphKind::Torus => a > 0 && b > 0,
        GraphKind::Lollipop => a > 0,
    };
    valid.then_some((a, b))
}
