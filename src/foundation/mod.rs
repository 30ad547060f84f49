//! Foundation utilities shared by the simulation and bridge layers.

pub mod math;
pub mod units;

pub use math::{Point2, Vec2};
pub use units::CoordinateMapper;
