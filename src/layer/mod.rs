//! Layer contribution
//!
//! A layer is a directory under the lifecycle's layers directory plus a
//! `<name>.toml` metadata file recording its lifecycle flags and the
//! identity marker it was populated for. Population runs at most once per
//! marker; environment exported by the layer lives in its `env*`
//! directories so later phases can rebuild it without re-populating.

pub mod contribute;
pub mod env;
pub mod launch;
pub mod manifest;

pub use contribute::{Contribution, Layer, LayerFlags, Layers};
pub use env::{EnvModifier, EnvScope, EnvVar, Environment};
pub use launch::{LaunchMetadata, Process};
pub use manifest::LayerMetadata;

/// A value whose identity decides whether a layer must be re-populated.
///
/// Only the `(type, discriminator)` tuple is compared; any other content
/// the marker serializes is recorded but does not affect caching.
pub trait Identifiable {
    fn identity(&self) -> (String, String);
}
