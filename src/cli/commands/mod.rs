//! Phase implementations

pub mod build;
pub mod detect;

pub use build::execute as build;
pub use detect::execute as detect;

/// Detect exit code when the buildpack applies / build exit code on success
pub const PASS_STATUS_CODE: u8 = 0;

/// Detect exit code when the buildpack does not apply
pub const FAIL_STATUS_CODE: u8 = 100;
