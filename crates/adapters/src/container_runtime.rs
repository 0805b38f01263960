// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ContainerRuntime`: the abstract capability over a container engine (C3).
//!
//! The only error surfaced by name is `NotFound`; every other failure from
//! the underlying engine collapses to `Unavailable` so the instance manager
//! has a single retry-triggering error to reason about.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("container {0:?} not found")]
    NotFound(String),

    #[error("container runtime unavailable: {0}")]
    Unavailable(String),
}

/// Host/container port publish mapping: `container_port → (host_ip, host_port)`.
#[derive(Debug, Clone)]
pub struct PortPublish {
    pub container_port: u16,
    pub host_ip: String,
    pub host_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    ReadOnly,
    ReadWrite,
}

#[derive(Debug, Clone)]
pub struct BindMount {
    pub host_path: String,
    pub container_path: String,
    pub mode: MountMode,
}

/// Everything `run` needs to create and start a sandbox container. No
/// further semantics are imposed on the runtime.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub image: String,
    pub name: String,
    pub ports: Vec<PortPublish>,
    pub mounts: Vec<BindMount>,
    pub env: HashMap<String, String>,
    pub memory_bytes: u64,
    pub cpu_quota: f64,
    pub restart_policy: RestartPolicy,
    pub init: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Always,
    UnlessStopped,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    NotFound,
    Created,
    Running,
    Exited,
    Paused,
    Dead,
}

/// Abstract capability over a container engine. Implementations run
/// synchronous/blocking engine calls on a worker so the orchestrator's
/// cooperative concurrency is never blocked by them.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    async fn run(&self, spec: ContainerSpec) -> Result<String, RuntimeError>;
    async fn start(&self, name: &str) -> Result<(), RuntimeError>;
    async fn stop(&self, name: &str, grace: std::time::Duration) -> Result<(), RuntimeError>;
    async fn restart(&self, name: &str, grace: std::time::Duration) -> Result<(), RuntimeError>;
    async fn remove(&self, name: &str, force: bool) -> Result<(), RuntimeError>;
    async fn inspect(&self, name: &str) -> Result<RuntimeStatus, RuntimeError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod test_support {
    use super::{ContainerRuntime, ContainerSpec, RuntimeError, RuntimeStatus};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// In-memory fake standing in for a container engine. Scripted
    /// per-container failures let instance-manager tests exercise the
    /// `creating → error` and `not_found → re-create` transitions without a
    /// real daemon.
    #[derive(Clone, Default)]
    pub struct FakeContainerRuntime {
        inner: Arc<Mutex<FakeState>>,
    }

    #[derive(Default)]
    struct FakeState {
        statuses: HashMap<String, RuntimeStatus>,
        run_failures: HashMap<String, String>,
        calls: Vec<String>,
    }

    impl FakeContainerRuntime {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next `run` for `name` fail with `Unavailable(reason)`.
        pub fn fail_run(&self, name: &str, reason: &str) {
            self.inner.lock().run_failures.insert(name.to_string(), reason.to_string());
        }

        pub fn set_status(&self, name: &str, status: RuntimeStatus) {
            self.inner.lock().statuses.insert(name.to_string(), status);
        }

        pub fn calls(&self) -> Vec<String> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl ContainerRuntime for FakeContainerRuntime {
        async fn run(&self, spec: ContainerSpec) -> Result<String, RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(format!("run:{}", spec.name));
            if let Some(reason) = state.run_failures.remove(&spec.name) {
                return Err(RuntimeError::Unavailable(reason));
            }
            state.statuses.insert(spec.name.clone(), RuntimeStatus::Running);
            Ok(format!("fake-container-{}", spec.name))
        }

        async fn start(&self, name: &str) -> Result<(), RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(format!("start:{name}"));
            match state.statuses.get(name) {
                None | Some(RuntimeStatus::NotFound) => Err(RuntimeError::NotFound(name.to_string())),
                _ => {
                    state.statuses.insert(name.to_string(), RuntimeStatus::Running);
                    Ok(())
                }
            }
        }

        async fn stop(&self, name: &str, _grace: std::time::Duration) -> Result<(), RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(format!("stop:{name}"));
            state.statuses.insert(name.to_string(), RuntimeStatus::Exited);
            Ok(())
        }

        async fn restart(&self, name: &str, _grace: std::time::Duration) -> Result<(), RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(format!("restart:{name}"));
            match state.statuses.get(name) {
                None | Some(RuntimeStatus::NotFound) => Err(RuntimeError::NotFound(name.to_string())),
                _ => {
                    state.statuses.insert(name.to_string(), RuntimeStatus::Running);
                    Ok(())
                }
            }
        }

        async fn remove(&self, name: &str, _force: bool) -> Result<(), RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(format!("remove:{name}"));
            state.statuses.remove(name);
            Ok(())
        }

        async fn inspect(&self, name: &str) -> Result<RuntimeStatus, RuntimeError> {
            let state = self.inner.lock();
            Ok(state.statuses.get(name).copied().unwrap_or(RuntimeStatus::NotFound))
        }
    }
}

#[cfg(test)]
#[path = "container_runtime_tests.rs"]
mod tests;
