//! Waypoint-tour engine.
//!
//! [`planner`] turns a property and its nearby places into a closed walking
//! loop; [`player`] walks that loop as a timed state machine that drives a
//! [`surface::RenderingSurface`]; [`driver`] runs a player in real time on tokio.

pub mod analytics;
pub mod config;
pub mod driver;
pub mod error;
pub mod observer;
pub mod planner;
pub mod player;
pub mod speed;
pub mod surface;
pub mod waypoint;

pub use analytics::*;
pub use config::*;
pub use driver::*;
pub use error::*;
pub use observer::*;
pub use planner::*;
pub use player::*;
pub use speed::*;
pub use surface::*;
pub use waypoint::*;
