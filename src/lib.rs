//! detbench: runs a detection tool and a metrics tool over every
//! model / framework / quantization combination of a dataset.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod runner;
pub mod tools;

pub use error::RunnerError;
