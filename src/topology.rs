//! The fixed, compile-time topology of the modeled workflow: a 15-place,
//! 12-transition order-fulfillment net.

use crate::matrix::Matrix;

pub const PLACE_COUNT: usize = 15;
pub const TRANSITION_COUNT: usize = 12;

pub const N_EXIT: u64 = 186;
pub const T_EXIT: usize = 11;

/// Lower temporal bound profile for the timed transitions. Only `α` (lower
/// bound) is modeled; upper bounds are explicitly out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaProfile {
    Fast,
    Medium,
    Slow,
}

/// A place-invariant family: the places whose marking must sum to `constant`
/// after every accepted firing.
#[derive(Debug, Clone)]
pub struct PlaceInvariant {
    pub places: Vec<usize>,
    pub constant: i64,
}

/// A transition-invariant family: a minimal firing cycle that returns the
/// net to `M0`. `name` matches the `Invariante N` numbering in the mandated
/// log format.
#[derive(Debug, Clone)]
pub struct TransitionInvariant {
    pub name: &'static str,
    pub transitions: Vec<usize>,
}

/// Everything needed to construct a `NetEngine` for the modeled instance.
pub struct Topology {
    pub incidence: Matrix,
    pub initial_marking: Vec<i64>,
    pub place_invariants: Vec<PlaceInvariant>,
    pub transition_invariants: Vec<TransitionInvariant>,
    pub timed_transitions: Vec<usize>,
    pub alpha: Vec<u64>,
}

fn alpha_for(profile: AlphaProfile) -> Vec<u64> {
    // indexed by transition; 0 for non-timed transitions
    let mut a = vec![0u64; TRANSITION_COUNT];
    let (t1, t4, t5, t9, t10) = match profile {
        AlphaProfile::Fast => (5, 15, 20, 8, 10),
        AlphaProfile::Medium => (20, 60, 80, 30, 40),
        AlphaProfile::Slow => (50, 150, 200, 80, 100),
    };
    a[1] = t1;
    a[4] = t4;
    a[5] = t5;
    a[9] = t9;
    a[10] = t10;
    a
}

/// Builds the incidence matrix `W` (P x T) from the pre/post sets of the
/// modeled workflow. Each arc has weight 1; weighted arcs are out of scope.
fn incidence_matrix() -> Matrix {
    let pre: [&[usize]; TRANSITION_COUNT] = [
        &[0],       // T0 accept_order
        &[1, 14],   // T1 triage
        &[2, 10, 13], // T2 assign_manual_agent
        &[2, 11, 13], // T3 assign_auto_agent
        &[4],       // T4 auto_process
        &[3],       // T5 manual_review
        &[5, 12],   // T6 approve_payment
        &[5, 12],   // T7 decline_payment
        &[7],       // T8 refund
        &[6],       // T9 capture
        &[8],       // T10 settle
        &[9],       // T11 close_order
    ];
    let post: [&[usize]; TRANSITION_COUNT] = [
        &[1],        // T0
        &[2],        // T1
        &[3],        // T2
        &[4],        // T3
        &[5, 11],    // T4
        &[5, 10],    // T5
        &[6, 14],    // T6
        &[7, 14],    // T7
        &[9, 12, 13], // T8
        &[8],        // T9
        &[9, 12, 13], // T10
        &[0],        // T11
    ];

    let mut rows = vec![vec![0i64; TRANSITION_COUNT]; PLACE_COUNT];
    for t in 0..TRANSITION_COUNT {
        for &p in pre[t] {
            rows[p][t] -= 1;
        }
        for &p in post[t] {
            rows[p][t] += 1;
        }
    }
    Matrix::from_rows(rows)
}

fn place_invariants() -> Vec<PlaceInvariant> {
    vec![
        PlaceInvariant { places: vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9], constant: 5 },
        PlaceInvariant { places: vec![3, 10], constant: 2 },
        PlaceInvariant { places: vec![4, 11], constant: 3 },
        PlaceInvariant { places: vec![6, 7, 8, 12], constant: 4 },
        PlaceInvariant { places: vec![13, 3, 4, 5, 6, 7, 8], constant: 4 },
        PlaceInvariant { places: vec![14, 2, 3, 4, 5], constant: 3 },
    ]
}

fn transition_invariants() -> Vec<TransitionInvariant> {
    vec![
        TransitionInvariant { name: "Invariante 1", transitions: vec![0, 1, 3, 4, 7, 8, 11] },
        TransitionInvariant { name: "Invariante 2", transitions: vec![0, 1, 3, 4, 6, 9, 10, 11] },
        TransitionInvariant { name: "Invariante 3", transitions: vec![0, 1, 2, 5, 7, 8, 11] },
        TransitionInvariant { name: "Invariante 4", transitions: vec![0, 1, 2, 5, 6, 9, 10, 11] },
    ]
}

/// Constructs the topology for the modeled instance under the given
/// α-profile.
pub fn instance(profile: AlphaProfile) -> Topology {
    Topology {
        incidence: incidence_matrix(),
        initial_marking: vec![5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 3, 4, 4, 3],
        place_invariants: place_invariants(),
        transition_invariants: transition_invariants(),
        timed_transitions: vec![1, 4, 5, 9, 10],
        alpha: alpha_for(profile),
    }
}
