//! Execution engine for synchronous dataflow (SDF) and scenario-aware
//! dataflow (SADF) process networks.
//!
//! Actors, kernels, detectors and broadcast junctions each run on their own
//! thread and talk only through order-preserving token channels. A unit
//! fires whenever its inputs hold enough tokens; there is no global
//! scheduler.

pub mod config;
pub mod error;
pub mod io;
pub mod moc;
pub mod network;
pub mod prelude;
pub mod utils;
