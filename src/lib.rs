//! dupsweep - duplicate file remover
//!
//! Finds files with identical content under a directory tree and removes all
//! but the oldest copy of each, either to the system trash or permanently.
//!
//! The core is [`pipeline::Pipeline`]: scan, group by size, hash, group by
//! digest, select, remove. It reports through a [`progress::ProgressSink`]
//! and stops cooperatively on a [`signal::StopSignal`].

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod scanner;
pub mod signal;

pub use app::run_app;
