//! Place-invariant checking and transition-invariant accounting. Both are
//! pure functions over borrowed state: the former is a read-only check
//! against a candidate marking, the latter works on a copy of the firing
//! counts and never touches live engine state.

use crate::topology::{PlaceInvariant, TransitionInvariant};

/// Checks every place-invariant family against `marking`, returning a
/// description of the first family that fails, if any.
pub fn check(invariants: &[PlaceInvariant], marking: &[i64]) -> Result<(), String> {
    for inv in invariants {
        let sum: i64 = inv.places.iter().map(|&p| marking[p]).sum();
        if sum != inv.constant {
            return Err(format!(
                "places {:?} sum to {} (expected {})",
                inv.places, sum, inv.constant
            ));
        }
    }
    Ok(())
}

/// Greedy transition-invariant accounting: how many complete cycles of each
/// family could be accounted for by `fires`. Ties among simultaneously
/// satisfiable families are resolved by lexical (declaration) order: at each
/// step the lexically first family with every member count still positive
/// is the one decremented.
pub fn transition_invariant_counts(invariants: &[TransitionInvariant], fires: &[u64]) -> Vec<u64> {
    let mut remaining = fires.to_vec();
    let mut counts = vec![0u64; invariants.len()];
    loop {
        let satisfiable = invariants
            .iter()
            .position(|inv| inv.transitions.iter().all(|&t| remaining[t] > 0));
        let Some(idx) = satisfiable else { break };
        for &t in &invariants[idx].transitions {
            remaining[t] -= 1;
        }
        counts[idx] += 1;
    }
    counts
}
