//! A concurrent, timed Place/Transition Petri net workflow simulator: a
//! monitor-mediated net engine, pluggable firing policies, a worker
//! ensemble, and an offline log writer.

pub mod config;
pub mod error;
pub mod logwriter;
pub mod matrix;
pub mod monitor;
pub mod net;
pub mod policy;
pub mod topology;
pub mod worker;
