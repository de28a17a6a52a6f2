//! Scoped ownership of a renderer instance.

use std::ops::{Deref, DerefMut};

use contracts::SonarRenderer;
use tracing::debug;

/// Owns a renderer and releases it exactly once, on drop at the latest.
///
/// Created right after the backend hands out the renderer so that a failing
/// later setup step still releases textures and scene references.
pub struct RendererLease<R: SonarRenderer> {
    renderer: R,
    released: bool,
}

impl<R: SonarRenderer> RendererLease<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        debug!(renderer = %self.renderer.name(), "Releasing renderer");
        self.renderer.release();
        self.released = true;
    }
}

impl<R: SonarRenderer> Deref for RendererLease<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.renderer
    }
}

impl<R: SonarRenderer> DerefMut for RendererLease<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: SonarRenderer> Drop for RendererLease<R> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRenderer;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_release_once_on_drop() {
        let renderer = StubRenderer::new(2, 2);
        let releases = renderer.releases.clone();
        {
            let _lease = RendererLease::new(renderer);
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_explicit_release_not_repeated() {
        let renderer = StubRenderer::new(2, 2);
        let releases = renderer.releases.clone();
        let mut lease = RendererLease::new(renderer);
        lease.release();
        assert!(lease.is_released());
        drop(lease);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
