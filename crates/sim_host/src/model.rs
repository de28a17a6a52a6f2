//! 父模型：持有声呐所在的子连杆

use contracts::{LinkLookup, MountLink, WorldConfig};

use crate::KinematicLink;

/// Parent model carrying one or more kinematic links.
#[derive(Debug, Clone)]
pub struct SimModel {
    name: String,
    links: Vec<KinematicLink>,
}

impl SimModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
        }
    }

    /// Model with a single link placed as `world` describes.
    pub fn from_world(world: &WorldConfig, link_name: &str) -> Self {
        let mut model = Self::new(format!("{}_model", world.name));
        model.add_link(KinematicLink::new(
            link_name,
            world.mount.to_pose(),
            world.parent.to_pose(),
        ));
        model
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_link(&mut self, link: KinematicLink) {
        self.links.push(link);
    }

    pub fn links(&self) -> &[KinematicLink] {
        &self.links
    }

    /// Integrate every link over one physics step.
    pub fn step(&mut self, dt: f64) {
        for link in &mut self.links {
            link.integrate(dt);
        }
    }
}

impl LinkLookup for SimModel {
    type Link = KinematicLink;

    fn link(&self, name: &str) -> Option<&KinematicLink> {
        self.links.iter().find(|l| l.name() == name)
    }

    fn link_mut(&mut self, name: &str) -> Option<&mut KinematicLink> {
        self.links.iter_mut().find(|l| l.name() == name)
    }
}
