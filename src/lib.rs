//! Link and data budget calculators for CubeSat mission engineering.
//!
//! The engines live in their own crates so that any front-end (CLI today, GUI or web later)
//! can call them with plain parameter records. This crate ties them to scenario manifests,
//! project snapshots, and plotting.

pub mod logging;
pub mod plot;
pub mod project;
pub mod scenario;

pub use cubesat_config as config;
pub use cubesat_core as physics;
pub use cubesat_data as data;
pub use cubesat_export as export;
pub use cubesat_link as link;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
