// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ContainerRuntime` over the local Docker Engine API via `bollard`.
//!
//! Single-host only, matching spec's Non-goals (no multi-node bin-packing);
//! this is the idiomatic Rust analogue of the original's `docker` SDK usage,
//! not a Kubernetes control-plane client.

use crate::container_runtime::{
    BindMount, ContainerRuntime, ContainerSpec, MountMode, RestartPolicy, RuntimeError,
    RuntimeStatus,
};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, RemoveContainerOptions,
    RestartContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::models::{HostConfig, PortBinding, RestartPolicy as BollardRestartPolicy, RestartPolicyNameEnum};
use bollard::Docker;
use std::collections::HashMap;

pub struct DockerContainerRuntime {
    docker: Docker,
}

impl DockerContainerRuntime {
    /// Connect using the platform-conventional local socket
    /// (`/var/run/docker.sock` on unix, the named pipe on Windows).
    pub fn connect_local() -> Result<Self, RuntimeError> {
        let docker =
            Docker::connect_with_local_defaults().map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(Self { docker })
    }

    fn map_err(name: &str, err: BollardError) -> RuntimeError {
        if let BollardError::DockerResponseServerError { status_code, .. } = &err {
            if *status_code == 404 {
                return RuntimeError::NotFound(name.to_string());
            }
        }
        RuntimeError::Unavailable(err.to_string())
    }
}

fn restart_policy_name(policy: RestartPolicy) -> RestartPolicyNameEnum {
    match policy {
        RestartPolicy::Always => RestartPolicyNameEnum::ALWAYS,
        RestartPolicy::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
        RestartPolicy::No => RestartPolicyNameEnum::NO,
    }
}

fn host_config(spec: &ContainerSpec) -> HostConfig {
    let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
    for publish in &spec.ports {
        port_bindings.insert(
            format!("{}/tcp", publish.container_port),
            Some(vec![PortBinding {
                host_ip: Some(publish.host_ip.clone()),
                host_port: Some(publish.host_port.to_string()),
            }]),
        );
    }

    let binds = spec
        .mounts
        .iter()
        .map(|m: &BindMount| {
            let suffix = match m.mode {
                MountMode::ReadOnly => ":ro",
                MountMode::ReadWrite => ":rw",
            };
            format!("{}:{}{}", m.host_path, m.container_path, suffix)
        })
        .collect();

    HostConfig {
        port_bindings: Some(port_bindings),
        binds: Some(binds),
        memory: Some(spec.memory_bytes as i64),
        nano_cpus: Some((spec.cpu_quota * 1_000_000_000.0) as i64),
        init: Some(spec.init),
        restart_policy: Some(BollardRestartPolicy {
            name: Some(restart_policy_name(spec.restart_policy)),
            maximum_retry_count: None,
        }),
        ..Default::default()
    }
}

#[async_trait]
impl ContainerRuntime for DockerContainerRuntime {
    async fn run(&self, spec: ContainerSpec) -> Result<String, RuntimeError> {
        let exposed_ports = spec
            .ports
            .iter()
            .map(|p| (format!("{}/tcp", p.container_port), HashMap::new()))
            .collect();
        let env: Vec<String> = spec.env.iter().map(|(k, v)| format!("{k}={v}")).collect();

        let config = Config {
            image: Some(spec.image.clone()),
            env: Some(env),
            exposed_ports: Some(exposed_ports),
            host_config: Some(host_config(&spec)),
            ..Default::default()
        };

        let options = CreateContainerOptions { name: spec.name.clone(), platform: None };
        let created = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| Self::map_err(&spec.name, e))?;

        self.docker
            .start_container(&spec.name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| Self::map_err(&spec.name, e))?;

        Ok(created.id)
    }

    async fn start(&self, name: &str) -> Result<(), RuntimeError> {
        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| Self::map_err(name, e))
    }

    async fn stop(&self, name: &str, grace: std::time::Duration) -> Result<(), RuntimeError> {
        let options = StopContainerOptions { t: grace.as_secs() as i64 };
        self.docker
            .stop_container(name, Some(options))
            .await
            .map_err(|e| Self::map_err(name, e))
    }

    async fn restart(&self, name: &str, grace: std::time::Duration) -> Result<(), RuntimeError> {
        let options = RestartContainerOptions { t: grace.as_secs() as i64 };
        self.docker
            .restart_container(name, Some(options))
            .await
            .map_err(|e| Self::map_err(name, e))
    }

    async fn remove(&self, name: &str, force: bool) -> Result<(), RuntimeError> {
        let options = RemoveContainerOptions { force, ..Default::default() };
        self.docker
            .remove_container(name, Some(options))
            .await
            .map_err(|e| Self::map_err(name, e))
    }

    async fn inspect(&self, name: &str) -> Result<RuntimeStatus, RuntimeError> {
        let result = self
            .docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await;

        let inspect = match result {
            Ok(inspect) => inspect,
            Err(BollardError::DockerResponseServerError { status_code: 404, .. }) => {
                return Ok(RuntimeStatus::NotFound)
            }
            Err(e) => return Err(Self::map_err(name, e)),
        };

        let status = inspect
            .state
            .and_then(|s| s.status)
            .map(|s| match s {
                bollard::models::ContainerStateStatusEnum::RUNNING => RuntimeStatus::Running,
                bollard::models::ContainerStateStatusEnum::CREATED => RuntimeStatus::Created,
                bollard::models::ContainerStateStatusEnum::EXITED => RuntimeStatus::Exited,
                bollard::models::ContainerStateStatusEnum::PAUSED => RuntimeStatus::Paused,
                bollard::models::ContainerStateStatusEnum::DEAD => RuntimeStatus::Dead,
                _ => RuntimeStatus::Exited,
            })
            .unwrap_or(RuntimeStatus::NotFound);

        Ok(status)
    }
}
