//! Deterministic, pure logic shared by the engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod error;
pub mod forest;
pub mod invariants;
pub mod marking;
pub mod normalize;
pub mod relations;
pub mod semantics;
pub mod types;
