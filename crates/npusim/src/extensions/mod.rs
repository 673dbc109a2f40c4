//! Optional tooling around the simulation core.

pub mod trace_reader;
