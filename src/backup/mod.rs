// src/backup/mod.rs

//! Durable backup of captured process output.
//!
//! Every pipeline stage's stdout/stderr is preserved under the output root
//! as a write-once audit trail; nothing in this system ever reads these
//! files back.

pub mod writer;

pub use writer::BackupWriter;
