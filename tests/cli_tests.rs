use assert_cmd::Command;
use predicates::prelude::*;

/// Runs the binary with no tools on PATH and no config files in reach
fn ecsdeploy(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ecsdeploy"));
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("PATH", "")
        .env_remove("RUST_LOG")
        .env_remove("AWS_REGION")
        .env_remove("ECSDEPLOY_ECR_REPO")
        .env_remove("ECSDEPLOY_CLUSTER")
        .env_remove("ECSDEPLOY_SERVICE")
        .env_remove("ECSDEPLOY_TASK_FAMILY")
        .env_remove("ECSDEPLOY_CONFIG");
    cmd
}

#[test]
fn help_command_exits_zero() {
    let home = tempfile::tempdir().unwrap();
    ecsdeploy(&home)
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rollback"));
}

#[test]
fn help_flag_exits_zero() {
    let home = tempfile::tempdir().unwrap();
    ecsdeploy(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--ecr-repo"));
}

#[test]
fn missing_command_exits_one() {
    let home = tempfile::tempdir().unwrap();
    ecsdeploy(&home).assert().code(1);
}

#[test]
fn unknown_command_exits_one() {
    let home = tempfile::tempdir().unwrap();
    ecsdeploy(&home).arg("frobnicate").assert().code(1);
}

#[test]
fn unknown_option_exits_one() {
    let home = tempfile::tempdir().unwrap();
    ecsdeploy(&home).args(["--bogus", "deploy"]).assert().code(1);
}

#[test]
fn missing_dependency_exits_one() {
    let home = tempfile::tempdir().unwrap();
    ecsdeploy(&home)
        .args(["-e", "registry.example.com/web", "rollback", "zz9999"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("`aws` not found in PATH"));
}

#[test]
fn invalid_repository_exits_one() {
    let home = tempfile::tempdir().unwrap();
    ecsdeploy(&home)
        .args(["--ecr-repo", "not-a-uri", "list-images"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid repository uri"));
}

#[test]
fn explicit_config_file_must_exist() {
    let home = tempfile::tempdir().unwrap();
    ecsdeploy(&home)
        .args(["--config", "missing.toml", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn local_config_file_is_read() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("ecsdeploy.toml"),
        "[registry]\nrepository = \"broken\"\n",
    )
    .unwrap();

    ecsdeploy(&home)
        .arg("list-images")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid repository uri \"broken\""));
}
