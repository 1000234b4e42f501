//! Mission façade: leg planning, route model, simulation, and fitness scoring.

pub mod fitness;
pub mod leg;
pub mod route;
pub mod simulator;

pub use facade::*;

mod facade;
