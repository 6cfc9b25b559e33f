//! Entry point: parses CLI arguments, builds the monitor for the modeled
//! instance, spawns one worker thread per transition and a log-writer
//! thread, and waits for the run to terminate.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use petri_workflow::config::{init_tracing, PolicyArg, SimArgs};
use petri_workflow::logwriter::write_on_release;
use petri_workflow::monitor::Monitor;
use petri_workflow::policy::{Balanced, Policy, Prioritized};
use petri_workflow::topology::{AlphaProfile, TRANSITION_COUNT};
use petri_workflow::worker::{run_worker, spawn_named, WorkerStats};

fn main() -> ExitCode {
    let args = SimArgs::parse();
    init_tracing(&args.log_level);

    let profile: AlphaProfile = args.profile.into();
    let policy: Box<dyn Policy> = match args.policy {
        PolicyArg::Balanced => Box::new(Balanced),
        PolicyArg::Prioritized => Box::new(Prioritized),
    };

    let monitor = match args.exit_count {
        Some(n) => Arc::new(Monitor::with_exit_threshold(profile, policy, n)),
        None => Arc::new(Monitor::new(profile, policy)),
    };

    let writer = {
        let monitor = monitor.clone();
        let log_path = args.log_path.clone();
        std::thread::spawn(move || write_on_release(&monitor, &log_path))
    };

    let mut workers = Vec::with_capacity(TRANSITION_COUNT);
    for t in 0..TRANSITION_COUNT {
        let monitor = monitor.clone();
        let stats = Arc::new(WorkerStats::default());
        let worker_stats = stats.clone();
        let handle = match spawn_named(t, move || {
            if let Err(err) = run_worker(monitor, t, worker_stats) {
                tracing::error!(transition = t, error = %err, "worker aborted on fatal error");
            }
        }) {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(transition = t, error = %e, "failed to spawn worker thread");
                return ExitCode::FAILURE;
            }
        };
        workers.push((handle, stats));
    }

    let mut failed = false;
    for (handle, stats) in workers {
        if handle.join().is_err() {
            failed = true;
        }
        tracing::info!(
            successes = stats.successes(),
            attempts = stats.blocked_attempts(),
            "worker finished"
        );
    }

    match writer.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!(error = %e, "log writer failed");
            failed = true;
        }
        Err(_) => failed = true,
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
