//! Command orchestration and terminal presentation

pub mod context;
pub mod merge;
pub mod style;
