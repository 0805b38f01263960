use super::*;

fn entries() -> Vec<TemplateEntry> {
    vec![TemplateEntry {
        relative_path: "README.md".to_string(),
        contents: "Hello {user_name}, today is {creation_date}.".to_string(),
    }]
}

#[tokio::test]
async fn first_run_writes_rendered_templates_and_seeds_structure() {
    let workspace = tempfile::tempdir().unwrap();
    let config = tempfile::tempdir().unwrap();
    let mut vars = std::collections::HashMap::new();
    vars.insert("user_name", "Ada".to_string());
    vars.insert("creation_date", "2026-07-28".to_string());

    init(&entries(), &vars, workspace.path(), config.path()).await.unwrap();

    let readme = tokio::fs::read_to_string(workspace.path().join("README.md")).await.unwrap();
    assert_eq!(readme, "Hello Ada, today is 2026-07-28.");
    assert!(tokio::fs::metadata(workspace.path().join("memory")).await.is_ok());
    assert!(tokio::fs::metadata(workspace.path().join("media").join("inbound")).await.is_ok());

    let jobs = tokio::fs::read_to_string(config.path().join("cron").join("jobs.json")).await.unwrap();
    assert_eq!(jobs, r#"{"version":1,"jobs":[]}"#);
}

#[tokio::test]
async fn second_run_never_overwrites_existing_files() {
    let workspace = tempfile::tempdir().unwrap();
    let config = tempfile::tempdir().unwrap();
    let vars = std::collections::HashMap::new();

    init(&entries(), &vars, workspace.path(), config.path()).await.unwrap();
    tokio::fs::write(workspace.path().join("README.md"), "user-edited content").await.unwrap();

    init(&entries(), &vars, workspace.path(), config.path()).await.unwrap();

    let readme = tokio::fs::read_to_string(workspace.path().join("README.md")).await.unwrap();
    assert_eq!(readme, "user-edited content");
}

#[tokio::test]
async fn second_run_leaves_cron_jobs_file_unchanged() {
    let workspace = tempfile::tempdir().unwrap();
    let config = tempfile::tempdir().unwrap();
    let vars = std::collections::HashMap::new();

    init(&entries(), &vars, workspace.path(), config.path()).await.unwrap();
    tokio::fs::write(
        config.path().join("cron").join("jobs.json"),
        r#"{"version":1,"jobs":[{"id":"x","enabled":true}]}"#,
    )
    .await
    .unwrap();

    init(&entries(), &vars, workspace.path(), config.path()).await.unwrap();

    let jobs = tokio::fs::read_to_string(config.path().join("cron").join("jobs.json")).await.unwrap();
    assert_eq!(jobs, r#"{"version":1,"jobs":[{"id":"x","enabled":true}]}"#);
}
