//! The offline log file writer. It is the only thing that persists state,
//! so it is implemented here as a one-shot latch subscriber rather than a
//! polling loop: the monitor signals the latch exactly once, the moment it
//! observes termination.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Condvar, Mutex};

use crate::policy::Policy;

/// A one-shot latch: `wait` blocks until `release` has been called, exactly
/// once, by anyone. Subsequent `wait` calls return immediately.
#[derive(Default)]
pub struct Latch {
    released: Mutex<bool>,
    cvar: Condvar,
}

impl Latch {
    pub fn new() -> Self {
        Latch::default()
    }

    pub fn release(&self) {
        let mut released = self.released.lock().unwrap_or_else(|e| e.into_inner());
        *released = true;
        self.cvar.notify_all();
    }

    pub fn wait(&self) {
        let guard = self.released.lock().unwrap_or_else(|e| e.into_inner());
        let _ = self
            .cvar
            .wait_while(guard, |released| !*released)
            .unwrap_or_else(|e| e.into_inner());
    }
}

/// Renders the final statistics report from a snapshot of the engine's
/// observable state.
pub fn render(sequence: &str, fires: &[u64], invariant_labels: &[String], invariant_counts: &[u64]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{sequence}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "-------------------------- Transiciones disparadas --------------------------"
    );
    for (t, &count) in fires.iter().enumerate() {
        let _ = writeln!(out, "Transicion {t} disparada: {count} veces.");
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "-------------------------- Invariantes completados --------------------------"
    );
    for (label, &count) in invariant_labels.iter().zip(invariant_counts) {
        let _ = writeln!(out, "{label} completado: {count} veces");
    }
    let total: u64 = invariant_counts.iter().sum();
    let _ = writeln!(out, "Total de invariantes completados: {total}");
    out
}

/// Blocks on the monitor's termination latch, then renders and writes the
/// final statistics to `path`. Returns once the file has been written.
pub fn write_on_release<P: Policy>(monitor: &crate::monitor::Monitor<P>, path: &Path) -> io::Result<()> {
    monitor.latch().wait();
    let sequence = monitor.sequence_snapshot();
    let fires = monitor.fires_snapshot();
    let labels = monitor.transition_invariant_labels();
    let counts = monitor.transition_invariant_counts_snapshot();
    let report = render(&sequence, &fires, &labels, &counts);
    tracing::info!(path = %path.display(), "writing final log");
    fs::write(path, report)
}
