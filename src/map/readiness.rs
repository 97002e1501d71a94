//! One-shot readiness signal for the clustering capability.

use super::cluster::{ClusterEngine, ClusterOptions};
use tokio::sync::oneshot;
use tracing::warn;

/// Resolves once, with the engine, when clustering has finished initializing.
pub struct ClusterReady(oneshot::Receiver<ClusterEngine>);

impl ClusterReady {
    /// Build the engine on the blocking pool and signal when done.
    pub fn prepare(options: ClusterOptions) -> Self {
        let (tx, rx) = oneshot::channel();
        tokio::task::spawn_blocking(move || {
            if tx.send(ClusterEngine::new(options)).is_err() {
                warn!("cluster readiness dropped before delivery");
            }
        });
        Self(rx)
    }

    /// Wait for the engine. `None` if the initializer went away.
    pub async fn wait(self) -> Option<ClusterEngine> {
        self.0.await.ok()
    }
}
