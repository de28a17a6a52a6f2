//! # Scan Engine
//!
//! Scanning and image-synthesis core of a mechanically scanning imaging sonar.
//!
//! 负责：
//! - 扫描角度跟踪 (`AngleTracker`)
//! - 在角度限位之间往返扫描 (`ScanMotionController`)
//! - 临时位姿偏移 + 渲染 + 恢复 (`BeamRenderAdapter`, `PoseGuard`)
//! - 强度图着色、掩码、结构化回波 (`SonarImageCompositor`)
//! - 发布限频 (`RateLimiter`)
//!
//! ## 使用示例
//!
//! ```ignore
//! use scan_engine::MsisSonar;
//!
//! let mut sonar = MsisSonar::setup(&config.sensor, &mut backend, &model, &world)?;
//!
//! // One simulation tick, phases in this exact order
//! sonar.pre_render(&mut model)?;
//! sonar.pose_update(&mut model)?;
//! sonar.render()?;
//! if let Some(emission) = sonar.post_render(&world)? {
//!     // hand to the publish boundary
//! }
//! ```

mod angle;
mod beam;
mod colormap;
mod compositor;
mod error;
mod lease;
mod motion;
mod pose_guard;
mod rate;
mod sensor;

#[cfg(test)]
mod testing;

pub use angle::AngleTracker;
pub use beam::{BeamRenderAdapter, BeamSample};
pub use colormap::{winter, ColorLut};
pub use compositor::{Composite, SonarImageCompositor};
pub use error::{Result, ScanError};
pub use lease::RendererLease;
pub use motion::{ScanMotionController, SweepState};
pub use pose_guard::PoseGuard;
pub use rate::RateLimiter;
pub use sensor::{MsisSonar, TickPhase, DEFAULT_FAR_CLIP, TEXTURE_NAME};

// Re-export contracts types
pub use contracts::{BeamFrame, MountPose, ScanAxis, ScanLimits, SonarEmission};
