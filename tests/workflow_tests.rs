use ecsdeploy::cli::{Command, dispatch};
use ecsdeploy::domain::{SERVER_ASSIGNED_FIELDS, WaitOutcome};
use ecsdeploy::error::{DeployError, Result};
use ecsdeploy::test_support::{MOCK_REPOSITORY, MockCloud, mock_config, mock_toolchain};
use ecsdeploy::{DeployPipeline, TaskDefinitionRef};
use std::sync::Arc;

fn pipeline(mock: &Arc<MockCloud>, scratch: &std::path::Path) -> DeployPipeline {
    DeployPipeline::new(mock_config(scratch), mock_toolchain(mock))
}

#[test]
fn test_full_deploy_builds_registers_and_deploys() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());
    mock.add_task_definition("web", "old/web:0000000");

    let summary = pipeline(&mock, scratch.path()).full_deploy()?;

    assert_eq!(summary.image_tag, "a1b2c3d");
    assert_eq!(summary.task_definition, TaskDefinitionRef::new("web", 2));
    assert_eq!(summary.outcome, WaitOutcome::Stable);

    let commands = mock.get_commands();
    let position = |prefix: &str| {
        commands
            .iter()
            .position(|c| c.starts_with(prefix))
            .unwrap_or_else(|| panic!("{prefix} was never called"))
    };
    assert!(position("is_available:docker") < position("login:"));
    assert!(position("login:") < position("build:"));
    assert!(position("push:") < position("describe_task_definition"));
    assert!(position("register_task_definition") < position("update_service"));

    let registered = &mock.submitted_documents()[0];
    assert_eq!(
        registered["containerDefinitions"][0]["image"],
        format!("{MOCK_REPOSITORY}:a1b2c3d")
    );
    Ok(())
}

#[test]
fn test_sequential_deploys_increase_revision_by_one() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());
    mock.add_task_definition("web", "old/web:0000000");
    let pipeline = pipeline(&mock, scratch.path());

    let first = pipeline.full_deploy()?;
    mock.set_head("b2c3d4e5f60718293a4b5c6d7e8f9012345678a1");
    let second = pipeline.full_deploy()?;

    assert_eq!(first.task_definition.revision + 1, second.task_definition.revision);
    assert_eq!(second.image_tag, "b2c3d4e");
    assert_eq!(mock.updates()[1].task_definition, second.task_definition);
    Ok(())
}

#[test]
fn test_registered_documents_never_carry_server_fields() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());
    mock.add_task_definition("web", "old/web:0000000");
    let pipeline = pipeline(&mock, scratch.path());

    pipeline.full_deploy()?;
    pipeline.deploy_only()?;

    for doc in mock.submitted_documents() {
        let fields = doc.as_object().expect("document is an object");
        for field in SERVER_ASSIGNED_FIELDS {
            assert!(!fields.contains_key(*field), "{field} was submitted");
        }
    }
    Ok(())
}

#[test]
fn test_force_sends_redeploy_for_identical_document() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());
    mock.add_task_definition("web", &format!("{MOCK_REPOSITORY}:a1b2c3d"));

    let mut config = mock_config(scratch.path());
    config.force = true;
    let pipeline = DeployPipeline::new(config, mock_toolchain(&mock));
    pipeline.deploy_only()?;

    let submitted = mock.submitted_documents();
    assert_eq!(
        submitted[0]["containerDefinitions"][0]["image"],
        format!("{MOCK_REPOSITORY}:a1b2c3d")
    );
    assert!(mock.updates()[0].force);
    Ok(())
}

#[test]
fn test_deploy_only_does_not_build_or_push() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());
    mock.add_task_definition("web", "old/web:0000000");

    let summary = pipeline(&mock, scratch.path()).deploy_only()?;

    // The image was never pushed; registration still succeeds.
    assert_eq!(summary.image_tag, "a1b2c3d");
    assert!(mock.registry_tags().is_empty());
    let commands = mock.get_commands();
    assert!(!commands.iter().any(|c| c.starts_with("build:")));
    assert!(!commands.iter().any(|c| c.starts_with("push:")));
    assert!(!commands.contains(&"is_available:docker".to_string()));
    Ok(())
}

#[test]
fn test_rollback_to_missing_tag_has_no_side_effects() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());
    mock.add_task_definition("web", "old/web:0000000");

    let err = pipeline(&mock, scratch.path())
        .rollback("zz9999")
        .unwrap_err();

    assert!(matches!(err, DeployError::TagNotFound { .. }));
    assert!(err.to_string().contains("list-images"));
    assert!(!mock.get_commands().contains(&"register_task_definition".to_string()));
    assert!(mock.updates().is_empty());
    Ok(())
}

#[test]
fn test_rollback_after_two_deploys_reuses_old_image() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());
    mock.add_task_definition("web", "old/web:0000000");
    let pipeline = pipeline(&mock, scratch.path());

    pipeline.full_deploy()?;
    mock.set_head("b2c3d4e5f60718293a4b5c6d7e8f9012345678a1");
    pipeline.full_deploy()?;

    let summary = pipeline.rollback("a1b2c3d")?;
    assert_eq!(summary.task_definition, TaskDefinitionRef::new("web", 4));

    let last = mock.submitted_documents().pop().expect("rollback registered");
    assert_eq!(
        last["containerDefinitions"][0]["image"],
        format!("{MOCK_REPOSITORY}:a1b2c3d")
    );
    Ok(())
}

#[test]
fn test_missing_tool_stops_deploy_before_login() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockCloud::new());
    mock.set_missing_tool("docker");

    let err = pipeline(&mock, scratch.path()).full_deploy().unwrap_err();
    assert!(matches!(err, DeployError::MissingDependency(ref tool) if tool == "docker"));
    assert!(!mock.get_commands().iter().any(|c| c.starts_with("login")));
}

#[test]
fn test_registration_failure_leaves_pushed_image() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockCloud::new());
    mock.add_task_definition("web", "old/web:0000000");
    mock.set_fail_on("register_task_definition");

    assert!(pipeline(&mock, scratch.path()).full_deploy().is_err());
    assert!(mock.registry_tags().contains(&"a1b2c3d".to_string()));
    assert!(mock.updates().is_empty());
}

#[test]
fn test_status_command_reads_service() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());

    dispatch(&pipeline(&mock, scratch.path()), Command::Status)?;
    assert!(mock.get_commands().contains(&"describe_service:web".to_string()));
    Ok(())
}

#[test]
fn test_dispatch_list_images_queries_repository_name() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let mock = Arc::new(MockCloud::new());
    mock.add_registry_image("a1b2c3d", None);

    dispatch(
        &pipeline(&mock, scratch.path()),
        Command::ListImages { limit: 10 },
    )?;
    assert!(mock.get_commands().contains(&"list_images:web".to_string()));
    Ok(())
}
