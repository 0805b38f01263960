// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sandbox(user_id: &str) -> Sandbox {
    Sandbox {
        user_id: UserId::new(user_id),
        container_name: container_name_for(&UserId::new(user_id)),
        container_id: None,
        port: 19000,
        state: SandboxState::Creating,
        gateway_token: "tok".into(),
        config_path: PathBuf::from("/data").join(user_id).join("config"),
        data_path: PathBuf::from("/data").join(user_id),
        created_at_epoch_ms: 0,
        last_active_at_epoch_ms: 0,
    }
}

#[test]
fn state_round_trips_through_display_and_parse() {
    for s in [SandboxState::Creating, SandboxState::Running, SandboxState::Stopped, SandboxState::Error]
    {
        assert_eq!(SandboxState::parse(&s.to_string()), Some(s));
    }
}

#[test]
fn state_parse_rejects_unknown_values() {
    assert_eq!(SandboxState::parse("zombie"), None);
}

#[test]
fn container_name_truncates_user_id_to_eight_chars() {
    let name = container_name_for(&UserId::new("0123456789abcdef"));
    assert_eq!(name, "clawbowl-01234567");
}

#[test]
fn container_name_handles_short_user_ids() {
    let name = container_name_for(&UserId::new("abc"));
    assert_eq!(name, "clawbowl-abc");
}

#[test]
fn session_key_is_stable_for_user() {
    let sb = sandbox("user-42");
    assert_eq!(sb.session_key(), "clawbowl-user-42");
}

#[test]
fn derived_paths_nest_under_data_path() {
    let sb = sandbox("user-42");
    assert_eq!(sb.workspace_path(), sb.data_path.join("workspace"));
    assert_eq!(sb.alerts_path(), sb.data_path.join("workspace").join(".alerts.jsonl"));
    assert_eq!(sb.cron_jobs_path(), sb.config_path.join("cron").join("jobs.json"));
}
