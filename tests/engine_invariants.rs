//! Integration coverage for the net engine's core correctness properties
//! (P1-P3, R1-R2, B1-B3) against the fixed, real topology. Unit tests beside
//! the code exercise individual functions in isolation; these tests drive
//! the engine through real firing sequences the way a worker ensemble would.

use petri_workflow::net::NetEngine;
use petri_workflow::topology::{self, AlphaProfile};

const INVARIANT_1: [usize; 7] = [0, 1, 3, 4, 7, 8, 11];
const INVARIANT_2: [usize; 8] = [0, 1, 3, 4, 6, 9, 10, 11];
const INVARIANT_3: [usize; 7] = [0, 1, 2, 5, 7, 8, 11];
const INVARIANT_4: [usize; 8] = [0, 1, 2, 5, 6, 9, 10, 11];

fn assert_place_invariants_hold(engine: &NetEngine) {
    for inv in engine.place_invariant_definitions() {
        let sum: i64 = inv.places.iter().map(|&p| engine.marking()[p]).sum();
        assert_eq!(sum, inv.constant, "place invariant over {:?} violated", inv.places);
    }
    assert!(
        engine.marking().iter().all(|&x| x >= 0),
        "negative token count in marking {:?}",
        engine.marking()
    );
}

#[test]
fn p1_p2_hold_after_every_step_of_every_transition_invariant() {
    for cycle in [&INVARIANT_1[..], &INVARIANT_2[..], &INVARIANT_3[..], &INVARIANT_4[..]] {
        let mut engine = NetEngine::new(AlphaProfile::Fast);
        for &t in cycle {
            assert!(engine.try_fire(t, true).unwrap(), "T{t} should be fireable mid-cycle");
            assert_place_invariants_hold(&engine);
        }
    }
}

#[test]
fn r1_every_transition_invariant_returns_marking_to_m0() {
    let m0 = topology::instance(AlphaProfile::Fast).initial_marking;
    for cycle in [&INVARIANT_1[..], &INVARIANT_2[..], &INVARIANT_3[..], &INVARIANT_4[..]] {
        let mut engine = NetEngine::new(AlphaProfile::Fast);
        for &t in cycle {
            engine.try_fire(t, true).unwrap();
        }
        assert_eq!(engine.marking(), m0.as_slice());
    }
}

#[test]
fn r2_zero_fires_yields_zero_invariant_counts() {
    let engine = NetEngine::new(AlphaProfile::Fast);
    assert_eq!(engine.transition_invariant_counts(), vec![0, 0, 0, 0]);
}

#[test]
fn r2_two_full_cycles_of_invariant_one_count_as_two() {
    let mut engine = NetEngine::new(AlphaProfile::Fast);
    for _ in 0..2 {
        for &t in &INVARIANT_1 {
            assert!(engine.try_fire(t, true).unwrap());
        }
    }
    assert_eq!(engine.transition_invariant_counts(), vec![2, 0, 0, 0]);
}

#[test]
fn b1_b2_alpha_boundary_is_exact() {
    let mut engine = NetEngine::new(AlphaProfile::Fast);
    engine.try_fire(0, true).unwrap(); // enables T1, timed
    let ts = engine.timestamp(1);
    let alpha = engine.min_delay(1);

    assert!(engine.is_enabled(1));
    assert!(engine.is_temporally_ready(1, ts + alpha), "B1: exact alpha boundary must be ready");
    assert!(
        !engine.is_temporally_ready(1, ts + alpha - 1),
        "B2: one millisecond short of alpha must not be ready"
    );
}

#[test]
fn b3_firing_a_non_enabled_transition_never_mutates_state() {
    let mut engine = NetEngine::new(AlphaProfile::Fast);
    let marking_before = engine.marking().to_vec();
    let fires_before = engine.fires().to_vec();
    let sequence_before = engine.sequence().to_string();

    // T5 (manual_review) is not enabled at cold start.
    let fired = engine.try_fire(5, false).unwrap();

    assert!(!fired);
    assert_eq!(engine.marking(), marking_before.as_slice());
    assert_eq!(engine.fires(), fires_before.as_slice());
    assert_eq!(engine.sequence(), sequence_before);
}

#[test]
fn p3_sequence_length_tracks_total_fires_across_a_mixed_run() {
    let mut engine = NetEngine::new(AlphaProfile::Fast);
    for &t in &INVARIANT_3 {
        engine.try_fire(t, true).unwrap();
    }
    let total: u64 = engine.fires().iter().sum();
    let tokens = engine.sequence().split_whitespace().count() as u64;
    assert_eq!(tokens, total);
}
