//! # Sim Host
//!
//! 轻量仿真宿主：为扫描声呐提供刚体连杆、渲染后端与 tick 驱动。
//!
//! - `KinematicLink`：按角速度积分的连杆
//! - `SimModel`：父模型，按名称查找子连杆
//! - `SyntheticBackend` / `SyntheticSonar`：基于球体目标的光线投射渲染器，支持注入失败
//! - `SimulationDriver`：按固定步长驱动四个阶段与物理步进

mod backend;
mod driver;
mod link;
mod model;
mod renderer;

pub use backend::{SyntheticBackend, SyntheticFailures};
pub use driver::{SimulationDriver, TickReport};
pub use link::KinematicLink;
pub use model::SimModel;
pub use renderer::{Sphere, SyntheticSonar};
