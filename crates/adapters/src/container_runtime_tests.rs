use super::*;
use crate::container_runtime::test_support::FakeContainerRuntime;

#[tokio::test]
async fn fake_runtime_run_then_inspect_reports_running() {
    let runtime = FakeContainerRuntime::new();
    let spec = ContainerSpec {
        image: "openclaw:latest".into(),
        name: "clawbowl-abc".into(),
        ports: vec![],
        mounts: vec![],
        env: HashMap::new(),
        memory_bytes: 0,
        cpu_quota: 0.0,
        restart_policy: RestartPolicy::UnlessStopped,
        init: false,
    };
    runtime.run(spec).await.unwrap();
    assert_eq!(runtime.inspect("clawbowl-abc").await.unwrap(), RuntimeStatus::Running);
}

#[tokio::test]
async fn fake_runtime_scripted_run_failure_surfaces_once() {
    let runtime = FakeContainerRuntime::new();
    runtime.fail_run("clawbowl-abc", "boom");
    let spec = ContainerSpec {
        image: "openclaw:latest".into(),
        name: "clawbowl-abc".into(),
        ports: vec![],
        mounts: vec![],
        env: HashMap::new(),
        memory_bytes: 0,
        cpu_quota: 0.0,
        restart_policy: RestartPolicy::UnlessStopped,
        init: false,
    };
    let err = runtime.run(spec.clone()).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Unavailable(reason) if reason == "boom"));
    runtime.run(spec).await.unwrap();
}

#[test]
fn runtime_error_not_found_displays_the_container_name() {
    let err = RuntimeError::NotFound("clawbowl-abc".to_string());
    assert_eq!(err.to_string(), "container \"clawbowl-abc\" not found");
}

#[test]
fn container_spec_carries_no_hidden_defaults() {
    let spec = ContainerSpec {
        image: "openclaw:latest".to_string(),
        name: "clawbowl-abc".to_string(),
        ports: vec![PortPublish { container_port: 8080, host_ip: "127.0.0.1".into(), host_port: 20001 }],
        mounts: vec![BindMount {
            host_path: "/data/abc/workspace".into(),
            container_path: "/workspace".into(),
            mode: MountMode::ReadWrite,
        }],
        env: HashMap::new(),
        memory_bytes: 512 * 1024 * 1024,
        cpu_quota: 1.0,
        restart_policy: RestartPolicy::UnlessStopped,
        init: true,
    };
    assert_eq!(spec.ports[0].host_port, 20001);
    assert_eq!(spec.mounts[0].mode, MountMode::ReadWrite);
}
