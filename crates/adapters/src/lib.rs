// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clawbowl-adapters: capability implementations at the orchestrator's
//! outer edges — the container engine, the push transport, the readiness
//! HTTP probe, and device-key crypto.

pub mod container_runtime;
pub mod device_crypto;
pub mod docker_runtime;
pub mod push;
pub mod readiness;

pub use container_runtime::{
    BindMount, ContainerRuntime, ContainerSpec, MountMode, PortPublish, RestartPolicy,
    RuntimeError, RuntimeStatus,
};
pub use docker_runtime::DockerContainerRuntime;
pub use push::{HttpPushChannel, PushChannel, PushError, PushPayload};
pub use readiness::{probe_once, ProbeError};

#[cfg(any(test, feature = "test-support"))]
pub use container_runtime::test_support::FakeContainerRuntime;
#[cfg(any(test, feature = "test-support"))]
pub use push::{FakePushChannel, PushCall};
