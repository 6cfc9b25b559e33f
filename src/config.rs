//! CLI surface, runtime configuration, and logging bootstrap. All of this
//! is ambient infrastructure around the simulation's entry point: the core
//! engine/monitor only ever see the already resolved `AlphaProfile`/policy
//! values, never raw CLI flags.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::topology::AlphaProfile as TopologyAlphaProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlphaProfileArg {
    Fast,
    Medium,
    Slow,
}

impl From<AlphaProfileArg> for TopologyAlphaProfile {
    fn from(arg: AlphaProfileArg) -> Self {
        match arg {
            AlphaProfileArg::Fast => TopologyAlphaProfile::Fast,
            AlphaProfileArg::Medium => TopologyAlphaProfile::Medium,
            AlphaProfileArg::Slow => TopologyAlphaProfile::Slow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Balanced,
    Prioritized,
}

/// Command-line surface for the simulation's entry point. The core treats
/// the α-profile, policy, and exit threshold as compile-time constants of
/// the modeled instance; these flags just let an operator pick which
/// constants to resolve to before the core is constructed.
#[derive(Debug, Parser)]
#[command(name = "petri_workflow", about = "Concurrent timed Petri net workflow simulator")]
pub struct SimArgs {
    /// Lower-bound temporal profile for timed transitions.
    #[arg(long, value_enum, default_value_t = AlphaProfileArg::Fast)]
    pub profile: AlphaProfileArg,

    /// Firing policy used by the monitor's release protocol.
    #[arg(long, value_enum, default_value_t = PolicyArg::Balanced)]
    pub policy: PolicyArg,

    /// Overrides the modeled instance's exit-transition firing target
    /// (`N_exit`). Defaults to the modeled value of 186.
    #[arg(long)]
    pub exit_count: Option<u64>,

    /// Path to write the final statistics log to.
    #[arg(long, default_value = "petri_workflow.log")]
    pub log_path: PathBuf,

    /// Tracing filter, e.g. "info", "debug", "petri_workflow=trace".
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Default for PolicyArg {
    fn default() -> Self {
        PolicyArg::Balanced
    }
}

impl std::fmt::Display for PolicyArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PolicyArg::Balanced => "balanced",
            PolicyArg::Prioritized => "prioritized",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for AlphaProfileArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlphaProfileArg::Fast => "fast",
            AlphaProfileArg::Medium => "medium",
            AlphaProfileArg::Slow => "slow",
        };
        write!(f, "{s}")
    }
}

/// Initializes the global `tracing` subscriber from `log_level`. Called
/// once from `main`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
