//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use probe_server::config::{Profile, ServerConfig};
use probe_server::lifecycle::{Controller, LifecycleError, LifecycleState};
use tempfile::TempDir;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

pub const HOSTNAME: &str = "probe-under-test";

/// A server running on an ephemeral port, stopped through a test-owned
/// termination trigger instead of an OS signal.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: watch::Receiver<LifecycleState>,
    trigger: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), LifecycleError>>,
    dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn not_ready_file(&self) -> PathBuf {
        self.dir.path().join("not-ready")
    }

    pub fn not_alive_file(&self) -> PathBuf {
        self.dir.path().join("not-alive")
    }

    /// Deliver the termination trigger without waiting for the outcome.
    pub fn terminate(&mut self) {
        if let Some(trigger) = self.trigger.take() {
            let _ = trigger.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the lifecycle to return.
    pub async fn join(self) -> Result<(), LifecycleError> {
        self.task.await.expect("lifecycle task panicked")
    }

    /// Trigger and wait.
    pub async fn stop(mut self) -> Result<(), LifecycleError> {
        self.terminate();
        self.join().await
    }
}

pub async fn start_server(profile: Profile, shutdown_delay: Duration) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(ServerConfig {
        address: "127.0.0.1:0".into(),
        shutdown_delay,
        profile,
        not_ready_file: dir.path().join("not-ready"),
        not_alive_file: dir.path().join("not-alive"),
        metrics_address: None,
        hostname: HOSTNAME.into(),
    });

    let controller = Controller::new(config);
    let state = controller.state();
    let running = controller.start().await.unwrap();
    let addr = running.local_addr();

    let (trigger, termination) = oneshot::channel::<()>();
    let task = tokio::spawn(running.run_until(async move {
        let _ = termination.await;
    }));

    TestServer {
        addr,
        state,
        trigger: Some(trigger),
        task,
        dir,
    }
}

/// Client without connection pooling or proxies so every request opens a
/// fresh connection straight to the server.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Wait until the lifecycle reports `target`.
pub async fn wait_for_state(state: &mut watch::Receiver<LifecycleState>, target: LifecycleState) {
    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| *s == target))
        .await
        .expect("timed out waiting for lifecycle state")
        .expect("lifecycle state channel closed");
}
