//! riff command function buildpack
//!
//! Detects an executable function artifact in an application and
//! contributes the command invoker that runs it.

pub mod archive;
pub mod buildpack;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod contribute;
pub mod detect;
pub mod error;
pub mod layer;
pub mod metadata;
pub mod plan;

pub use error::{BuildpackError, BuildpackResult};
