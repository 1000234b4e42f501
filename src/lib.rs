//! Drone survey route optimizer.
//!
//! The workspace crates hold the domain logic; this library re-exports them
//! under one roof and adds the scenario plumbing shared by the binaries.

pub use drone_battery as battery;
pub use drone_config as config;
pub use drone_core as common;
pub use drone_export as export;
pub use drone_geodesy as geodesy;
pub use drone_importer as importer;
pub use drone_mission as mission;
pub use drone_optimizer as optimizer;
pub use drone_weather as weather;

pub mod scenario;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
