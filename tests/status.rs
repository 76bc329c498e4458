// ABOUTME: Integration tests for the status prober.
// ABOUTME: Per-container probing over a fake shell and aggregation into one status word.

mod support;

use skiff::config::{Config, ContainerSpec};
use skiff::release::error::StatusError;
use skiff::release::{ContainerState, Status, StatusProber};
use skiff::types::{ContainerName, RuntimeType};
use support::fake_shell::{FakeShell, output};

const API_AND_WEB: &str = r#"
name: shop
images:
  api: {}
  web: {}
deploy:
  type: ssh
  ssh: deploy@shop.example.com
  containers:
    - name: api
      image: api
    - name: web
      image: web
"#;

fn containers() -> Vec<ContainerSpec> {
    Config::from_yaml(API_AND_WEB)
        .unwrap()
        .containers
        .iter()
        .cloned()
        .collect()
}

fn running(name: &str) -> String {
    format!("'ps' '--filter' 'name=^{}$'", name)
}

fn exited(name: &str) -> String {
    format!("'ps' '-a' '--filter' 'name=^{}$'", name)
}

#[tokio::test]
async fn any_running_container_makes_the_set_running() {
    let shell = FakeShell::new()
        .reply(&running("api"), output(0, "Up 3 minutes\n"))
        .reply(&exited("web"), output(0, "Exited (0) 2 hours ago\n"));

    let status = StatusProber::new(&shell, RuntimeType::Docker)
        .status(&containers())
        .await
        .unwrap();

    assert_eq!(status, Status::Running);
    assert_eq!(status.to_string(), "running");
}

#[tokio::test]
async fn stopped_without_running_is_stopped() {
    let shell = FakeShell::new().reply(&exited("web"), output(0, "Exited (137) 1 minute ago"));

    let status = StatusProber::new(&shell, RuntimeType::Docker)
        .status(&containers())
        .await
        .unwrap();

    assert_eq!(status, Status::Stopped);
}

#[tokio::test]
async fn nothing_on_the_host_is_not_found() {
    let shell = FakeShell::new();

    let status = StatusProber::new(&shell, RuntimeType::Podman)
        .status(&containers())
        .await
        .unwrap();

    assert_eq!(status.to_string(), "not found");
    assert!(shell.commands().iter().all(|c| c.starts_with("'podman' 'ps'")));
    assert_eq!(shell.commands().len(), 4);
}

#[tokio::test]
async fn running_container_is_not_asked_twice() {
    let shell = FakeShell::new().reply(&running("api"), output(0, "Up 1 second"));
    let name = ContainerName::new("api").unwrap();

    let state = StatusProber::new(&shell, RuntimeType::Docker)
        .container_state(&name)
        .await
        .unwrap();

    assert_eq!(state, ContainerState::Running);
    assert_eq!(shell.commands(), [running_command("api")]);
}

fn running_command(name: &str) -> String {
    format!(
        "'docker' 'ps' '--filter' 'name=^{}$' '--format' '{{{{.Status}}}}'",
        name
    )
}

#[tokio::test]
async fn single_container_set_reports_its_own_state() {
    let shell = FakeShell::new().reply(&exited("api"), output(0, "Created"));

    let status = StatusProber::new(&shell, RuntimeType::Docker)
        .status(&containers()[..1])
        .await
        .unwrap();

    assert_eq!(status, Status::Stopped);
}

#[tokio::test]
async fn failed_query_names_the_container() {
    let shell = FakeShell::new().reply(
        &exited("web"),
        output(1, "Cannot connect to the Docker daemon"),
    );

    let err = StatusProber::new(&shell, RuntimeType::Docker)
        .status(&containers())
        .await
        .unwrap_err();

    match err {
        StatusError::QueryExit { ref container, code, .. } => {
            assert_eq!(container.as_str(), "web");
            assert_eq!(code, 1);
        }
        ref other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("web"));
}

#[tokio::test]
async fn lost_connection_is_a_query_error() {
    let shell = FakeShell::new().cut_off("name=^api$");

    let err = StatusProber::new(&shell, RuntimeType::Docker)
        .status(&containers())
        .await
        .unwrap_err();

    assert!(matches!(err, StatusError::Query { .. }));
    assert!(err.to_string().contains("api"));
}
