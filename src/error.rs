//! Crate-wide error kinds.
//!
//! Structural kinds (`OutOfRange`, `DimMismatch`, `InvariantViolation`) are
//! programmer-facing and fatal: they indicate the incidence matrix, the
//! invariant families, or a caller's index is inconsistent with the
//! topology. They are the only kinds that unwind; synchronization outcomes
//! (not-enabled, interrupted, termination observed) are ordinary control
//! flow and are represented by plain `bool`/enum returns elsewhere, not by
//! this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("transition/place index {index} out of range [0, {bound})")]
    OutOfRange { index: usize, bound: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimMismatch { expected: usize, actual: usize },

    #[error("place invariant violated after firing T{transition}: {detail}")]
    InvariantViolation {
        transition: usize,
        detail: String,
        marking_dump: String,
    },
}

pub type SimResult<T> = Result<T, SimError>;
