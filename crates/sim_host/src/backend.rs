//! 合成渲染后端（支持注入失败场景）

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::{ContractError, RenderBackend, SceneHandle, WorldConfig};
use tracing::instrument;

use crate::{Sphere, SyntheticSonar};

/// 失败注入配置
#[derive(Debug, Default, Clone)]
pub struct SyntheticFailures {
    /// init 失败
    pub fail_init: bool,
    /// load 失败
    pub fail_load: bool,
    /// create_texture 失败
    pub fail_texture: bool,
    /// 回读时报告错误的 far clip
    pub misreport_far_clip: Option<f64>,
    /// create_scene 失败
    pub fail_scene: bool,
}

/// 进程级合成渲染引擎
///
/// 场景按世界名复用；创建的每个渲染器共享同一组球体目标。
pub struct SyntheticBackend {
    enabled: bool,
    scenes: Vec<SceneHandle>,
    targets: Arc<Vec<Sphere>>,
    failures: SyntheticFailures,
    releases: Arc<AtomicUsize>,
    sonars_created: usize,
}

impl SyntheticBackend {
    pub fn new(targets: Vec<Sphere>) -> Self {
        Self::with_failures(targets, SyntheticFailures::default())
    }

    /// 使用失败注入配置创建
    pub fn with_failures(targets: Vec<Sphere>, failures: SyntheticFailures) -> Self {
        Self {
            enabled: true,
            scenes: Vec::new(),
            targets: Arc::new(targets),
            failures,
            releases: Arc::new(AtomicUsize::new(0)),
            sonars_created: 0,
        }
    }

    /// 按世界配置中的目标创建
    pub fn from_world(world: &WorldConfig) -> Self {
        Self::new(world.targets.iter().map(Sphere::from).collect())
    }

    /// 禁用渲染（模拟无渲染引擎的进程）
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(Vec::new())
        }
    }

    /// 已创建的场景数
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// 已创建的渲染器数
    pub fn sonars_created(&self) -> usize {
        self.sonars_created
    }

    /// 已释放的渲染器数
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl RenderBackend for SyntheticBackend {
    type Renderer = SyntheticSonar;

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn scene(&self, world: &str) -> Option<SceneHandle> {
        self.scenes.iter().find(|s| s.world == world).cloned()
    }

    #[instrument(name = "synthetic_create_scene", skip(self))]
    fn create_scene(&mut self, world: &str) -> Result<SceneHandle, ContractError> {
        if self.failures.fail_scene {
            return Err(ContractError::renderer("injected scene failure"));
        }
        let handle = SceneHandle {
            id: self.scenes.len() as u32 + 1,
            world: world.to_string(),
        };
        self.scenes.push(handle.clone());
        Ok(handle)
    }

    #[instrument(name = "synthetic_create_sonar", skip(self, scene), fields(scene_id = scene.id))]
    fn create_sonar(
        &mut self,
        name: &str,
        scene: &SceneHandle,
    ) -> Result<SyntheticSonar, ContractError> {
        if !self.scenes.contains(scene) {
            return Err(ContractError::renderer(format!(
                "scene {} does not belong to this backend",
                scene.id
            )));
        }
        self.sonars_created += 1;
        Ok(SyntheticSonar::new(
            name,
            scene.clone(),
            self.targets.clone(),
            self.failures.clone(),
            self.releases.clone(),
        ))
    }
}
