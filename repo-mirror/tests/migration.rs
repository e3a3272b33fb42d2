use repo_mirror::{DestinationTransport, MigrationOutcome, Runner, RunnerConfig, RunnerError};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Creates `root/source/<name>.git` with two branches and a tag.
fn create_source_repository(root: &Path, name: &str) -> PathBuf {
    let work = root.join(format!("{name}-work"));
    fs::create_dir_all(&work).unwrap();
    git(&work, &["init", "-q"]);
    fs::write(work.join("README.md"), "hello\n").unwrap();
    git(&work, &["add", "README.md"]);
    git(
        &work,
        &[
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "commit",
            "-q",
            "-m",
            "initial",
        ],
    );
    git(&work, &["branch", "feature"]);
    git(&work, &["tag", "v1.0.0"]);

    let source_dir = root.join("source");
    fs::create_dir_all(&source_dir).unwrap();
    let source = source_dir.join(format!("{name}.git"));
    git(
        root,
        &[
            "clone",
            "-q",
            "--bare",
            work.to_str().unwrap(),
            source.to_str().unwrap(),
        ],
    );
    source
}

/// Creates an empty bare repository standing in for the GitHub remote.
fn create_destination_repository(root: &Path, name: &str) -> PathBuf {
    let dest_dir = root.join("destination");
    fs::create_dir_all(&dest_dir).unwrap();
    let dest = dest_dir.join(format!("{name}.git"));
    git(&dest_dir, &["init", "-q", "--bare", dest.to_str().unwrap()]);
    dest
}

fn write_records(root: &Path, records: serde_json::Value) -> PathBuf {
    let path = root.join("bitbucket_repos.json");
    fs::write(&path, records.to_string()).unwrap();
    path
}

fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

async fn mount_team(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/orgs/acme/teams/platform"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "slug": "platform",
            "name": "Platform"
        })))
        .mount(server)
        .await;
}

async fn mount_create_repository(server: &MockServer, name: &str, dest: &Path, times: u64) {
    let dest = dest.to_str().unwrap();
    mount_create_repository_with_urls(server, name, dest, dest, times).await;
}

/// Like [`mount_create_repository`], with distinct HTTPS and SSH URLs in the response.
async fn mount_create_repository_with_urls(
    server: &MockServer,
    name: &str,
    clone_url: &str,
    ssh_url: &str,
    times: u64,
) {
    Mock::given(method("POST"))
        .and(path("/orgs/acme/repos"))
        .and(body_json(json!({"name": name, "private": true, "team_id": 7})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "name": name,
            "full_name": format!("acme/{name}"),
            "private": true,
            "clone_url": clone_url,
            "ssh_url": ssh_url,
            "html_url": format!("https://github.com/acme/{name}")
        })))
        .expect(times)
        .mount(server)
        .await;
}

fn runner_config(root: &Path, input: PathBuf, server: &MockServer) -> RunnerConfig {
    RunnerConfig::new(input, "acme".to_string(), "platform".to_string())
        .with_token("test-token".to_string())
        .with_api_url(server.uri())
        .with_work_dir(root.join("mirrors"))
}

#[tokio::test]
async fn migrates_repository_end_to_end() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let source = create_source_repository(root, "repo");
    let dest = create_destination_repository(root, "repo");
    let input = write_records(
        root,
        json!([{
            "clone_url": source.to_str().unwrap(),
            "project_name": "Team Alpha",
            "repository_name": "repo",
            "full_name": "ns/repo"
        }]),
    );

    let server = MockServer::start().await;
    mount_team(&server).await;
    mount_create_repository(&server, "repo", &dest, 1).await;
    Mock::given(method("PUT"))
        .and(path("/repos/acme/repo/topics"))
        .and(body_json(json!({"names": ["team-alpha"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"names": ["team-alpha"]})))
        .expect(1)
        .mount(&server)
        .await;

    let runner = Runner::new(runner_config(root, input, &server)).unwrap();
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.records_read, 1);
    assert_eq!(summary.migrated, 1);
    assert!(summary.all_success());
    match &summary.outcomes[0] {
        MigrationOutcome::Migrated {
            destination,
            topic,
            url,
            ..
        } => {
            assert_eq!(destination, "acme/repo");
            assert_eq!(topic.as_deref(), Some("team-alpha"));
            assert_eq!(url.as_deref(), Some("https://github.com/acme/repo"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Every ref, including the extra branch and the tag, reached the destination.
    let source_refs = git(&source, &["for-each-ref", "--format=%(refname) %(objectname)"]);
    let dest_refs = git(&dest, &["for-each-ref", "--format=%(refname) %(objectname)"]);
    assert_eq!(source_refs, dest_refs);
    assert!(dest_refs.contains("refs/heads/feature"));
    assert!(dest_refs.contains("refs/tags/v1.0.0"));

    let mirror = root.join("mirrors/repo.git");
    assert_eq!(
        git(&mirror, &["remote", "get-url", "origin"]),
        dest.to_str().unwrap()
    );
    assert_eq!(
        git(&mirror, &["remote", "get-url", "bitbucket"]),
        source.to_str().unwrap()
    );
}

#[tokio::test]
async fn uncategorized_repository_gets_no_topic() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let source = create_source_repository(root, "tools");
    let dest = create_destination_repository(root, "tools");
    let input = write_records(
        root,
        json!([{"clone_url": source.to_str().unwrap(), "full_name": "ns/tools"}]),
    );

    let server = MockServer::start().await;
    mount_team(&server).await;
    mount_create_repository(&server, "tools", &dest, 1).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let runner = Runner::new(runner_config(root, input, &server)).unwrap();
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.migrated, 1);
    match &summary.outcomes[0] {
        MigrationOutcome::Migrated { topic, .. } => assert_eq!(topic, &None),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn failed_repository_does_not_stop_batch() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let source = create_source_repository(root, "good");
    let dest = create_destination_repository(root, "good");
    let missing = root.join("source/missing.git");
    let input = write_records(
        root,
        json!([
            {"clone_url": missing.to_str().unwrap(), "project_name": "X", "full_name": "ns/missing"},
            {"clone_url": source.to_str().unwrap(), "project_name": "uncategorized", "full_name": "ns/good"}
        ]),
    );

    let server = MockServer::start().await;
    mount_team(&server).await;
    mount_create_repository(&server, "good", &dest, 1).await;

    let runner = Runner::new(runner_config(root, input, &server)).unwrap();
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.migrated, 1);
    assert!(!summary.aborted);
    assert_eq!(summary.failures().next().unwrap().repository(), "ns/missing");
}

#[tokio::test]
async fn fail_fast_stops_at_first_failure() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let source = create_source_repository(root, "good");
    let dest = create_destination_repository(root, "good");
    let missing = root.join("source/missing.git");
    let input = write_records(
        root,
        json!([
            {"clone_url": missing.to_str().unwrap(), "full_name": "ns/missing"},
            {"clone_url": source.to_str().unwrap(), "full_name": "ns/good"}
        ]),
    );

    let server = MockServer::start().await;
    mount_team(&server).await;
    mount_create_repository(&server, "good", &dest, 0).await;

    let runner =
        Runner::new(runner_config(root, input, &server).with_fail_fast(true)).unwrap();
    let summary = runner.run().await.unwrap();

    assert!(summary.aborted);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.not_attempted(), 1);
    assert!(!summary.all_success());
}

#[tokio::test]
async fn unknown_team_is_critical() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let input = write_records(
        root,
        json!([{"clone_url": "https://example.com/ns/repo.git", "full_name": "ns/repo"}]),
    );

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/teams/platform"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;

    let runner = Runner::new(runner_config(root, input, &server)).unwrap();
    let result = runner.run().await;

    assert!(matches!(result, Err(RunnerError::Migration(_))));
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let input = write_records(
        root,
        json!([
            {"clone_url": "git@src:/ns/repo.git", "project_name": "Team Alpha", "full_name": "ns/repo"},
            {"clone_url": "git@src:/ns/other.git", "full_name": "ns/other"}
        ]),
    );

    // No mocks mounted: any request would fail the run.
    let server = MockServer::start().await;

    // No token either: a dry run never talks to GitHub.
    let config = RunnerConfig::new(input, "acme".to_string(), "platform".to_string())
        .with_api_url(server.uri())
        .with_work_dir(root.join("mirrors"))
        .with_dry_run(true);
    let runner = Runner::new(config).unwrap();
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.planned, 2);
    assert!(summary.all_success());
    assert!(!root.join("mirrors").exists());
    match &summary.outcomes[0] {
        MigrationOutcome::Planned {
            destination, topic, ..
        } => {
            assert_eq!(destination, "acme/repo");
            assert_eq!(topic.as_deref(), Some("team-alpha"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_records_file_is_critical() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;

    let runner = Runner::new(runner_config(
        temp.path(),
        temp.path().join("missing.json"),
        &server,
    ))
    .unwrap();

    assert!(matches!(
        runner.run().await,
        Err(RunnerError::Records(_))
    ));
}

#[tokio::test]
async fn live_run_without_token_is_critical() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let config = RunnerConfig::new(
        temp.path().join("bitbucket_repos.json"),
        "acme".to_string(),
        "platform".to_string(),
    );

    assert!(matches!(Runner::new(config), Err(RunnerError::Config(_))));
}

#[tokio::test]
async fn https_transport_keeps_token_out_of_mirror_config() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let source = create_source_repository(root, "repo");
    let dest = create_destination_repository(root, "repo");
    let input = write_records(
        root,
        json!([{"clone_url": source.to_str().unwrap(), "full_name": "ns/repo"}]),
    );

    // The SSH URL is unreachable, so only the HTTPS clone URL can receive the push.
    let server = MockServer::start().await;
    mount_team(&server).await;
    mount_create_repository_with_urls(
        &server,
        "repo",
        dest.to_str().unwrap(),
        "git@unreachable.invalid:acme/repo.git",
        1,
    )
    .await;

    let config = runner_config(root, input, &server)
        .with_destination_transport(DestinationTransport::Https);
    let summary = Runner::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.migrated, 1, "{:?}", summary.outcomes);

    let mirror = root.join("mirrors/repo.git");
    assert_eq!(
        git(&mirror, &["remote", "get-url", "origin"]),
        dest.to_str().unwrap()
    );
    let remotes = git(&mirror, &["config", "--get-regexp", "^remote\\."]);
    assert!(!remotes.contains("test-token"));
    assert!(!remotes.contains("x-access-token"));

    let source_refs = git(&source, &["for-each-ref", "--format=%(refname) %(objectname)"]);
    let dest_refs = git(&dest, &["for-each-ref", "--format=%(refname) %(objectname)"]);
    assert_eq!(source_refs, dest_refs);
}

#[tokio::test]
async fn migrates_concurrently() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let first = create_source_repository(root, "first");
    let second = create_source_repository(root, "second");
    let first_dest = create_destination_repository(root, "first");
    let second_dest = create_destination_repository(root, "second");
    let input = write_records(
        root,
        json!([
            {"clone_url": first.to_str().unwrap(), "full_name": "ns/first"},
            {"clone_url": second.to_str().unwrap(), "full_name": "ns/second"}
        ]),
    );

    let server = MockServer::start().await;
    mount_team(&server).await;
    mount_create_repository(&server, "first", &first_dest, 1).await;
    mount_create_repository(&server, "second", &second_dest, 1).await;

    let config = runner_config(root, input, &server).with_concurrency(2);
    let summary = Runner::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.migrated, 2, "{:?}", summary.outcomes);
    assert!(summary.all_success());
    assert!(git(&first_dest, &["for-each-ref"]).contains("refs/tags/v1.0.0"));
    assert!(git(&second_dest, &["for-each-ref"]).contains("refs/tags/v1.0.0"));
}

#[tokio::test]
async fn shared_mirror_directory_fails_later_record() {
    install_crypto_provider();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let source = create_source_repository(root, "repo");
    let dest = create_destination_repository(root, "repo");
    let input = write_records(
        root,
        json!([
            {"clone_url": source.to_str().unwrap(), "project_name": "Alpha", "full_name": "ns/repo"},
            {"clone_url": source.to_str().unwrap(), "project_name": "Beta", "full_name": "other/repo"}
        ]),
    );

    let server = MockServer::start().await;
    mount_team(&server).await;
    mount_create_repository(&server, "repo", &dest, 1).await;
    Mock::given(method("PUT"))
        .and(path("/repos/acme/repo/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"names": ["alpha"]})))
        .expect(1)
        .mount(&server)
        .await;

    let config = runner_config(root, input, &server).with_concurrency(2);
    let summary = Runner::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.failed, 1);
    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.repository(), "other/repo");
    match failure {
        MigrationOutcome::Failed { error, .. } => assert!(error.contains("ns/repo")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}
