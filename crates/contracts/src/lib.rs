//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! sonar data model, the configuration blueprint and the traits describing
//! the host collaborators (renderer, rigid-body link, publish sink).
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Angle Model
//! - All angles are radians.
//! - Orientations are unit quaternions; roll/pitch/yaw are extracted with the
//!   ZYX convention (`yaw * pitch * roll`).
//! - Simulation time (seconds, f64) is the only clock.

mod axis;
mod blueprint;
mod error;
mod frame;
mod link;
mod pose;
mod renderer;
mod sink;
mod sonar;
mod world;

pub use axis::*;
pub use blueprint::*;
pub use error::*;
pub use frame::*;
pub use link::{LinkLookup, MountLink};
pub use pose::*;
pub use renderer::*;
pub use sink::*;
pub use sonar::*;
pub use world::WorldContext;
