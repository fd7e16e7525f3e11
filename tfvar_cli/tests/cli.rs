//! Runs the compiled `tfvar` binary.
//!
//! Each command starts from an empty environment inside the module
//! directory, so neither `TF_VAR_*` nor `TFVAR_*` variables of the test
//! runner leak in.

use anyhow::{Result, ensure};
use assert_cmd::Command;
use insta::assert_snapshot;
use rstest::{fixture, rstest};
use test_helpers::module::ModuleDir;

#[fixture]
fn module() -> Result<ModuleDir> {
    ModuleDir::sample()
}

fn tfvar(dir: &ModuleDir) -> Command {
    #[expect(
        deprecated,
        clippy::expect_used,
        reason = "cargo_bin is the standard assert_cmd API and test panics are acceptable"
    )]
    let mut cmd = Command::cargo_bin("tfvar").expect("binary should exist");
    cmd.env_clear()
        .env("RUST_BACKTRACE", "0")
        .current_dir(dir.path());
    cmd
}

fn stdout(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().clone();
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(cmd: &mut Command) -> String {
    let output = cmd.assert().failure().code(1).get_output().clone();
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[rstest]
fn env_var_output(module: Result<ModuleDir>) -> Result<()> {
    let dir = module?;
    let out = stdout(tfvar(&dir).args(["-e", "--var", "region=ap-northeast-1", "."]));
    assert_snapshot!(out, @r#"
    export TF_VAR_availability_zone_names='["us-west-1a"]'
    export TF_VAR_aws_amis='{ eu-west-1 = "ami-b1cf19c6", us-east-1 = "ami-de7ab6b6", us-west-1 = "ami-3f75767a", us-west-2 = "ami-21f78e11" }'
    export TF_VAR_docker_ports='[{ external = 8300, internal = 8301, protocol = "tcp" }]'
    export TF_VAR_instance_name='my-instance'
    export TF_VAR_password=''
    export TF_VAR_region='ap-northeast-1'
    "#);
    Ok(())
}

#[rstest]
fn resource_output(module: Result<ModuleDir>) -> Result<()> {
    let dir = module?;
    let out = stdout(tfvar(&dir).args(["-r", "--ignore-default", "."]));
    let password = concat!(
        "\n",
        "resource \"tfe_variable\" \"password\" {\n",
        "  key          = \"password\"\n",
        "  value        = null\n",
        "  sensitive    = true\n",
        "  description  = \"the root password to use with the database\"\n",
        "  workspace_id = null\n",
        "  category     = \"terraform\"\n",
        "}\n",
    );
    ensure!(out.contains(password), "got:\n{out}");
    ensure!(out.matches("resource \"tfe_variable\"").count() == 6, "got:\n{out}");
    Ok(())
}

#[rstest]
fn auto_assign_uses_environment_and_files(module: Result<ModuleDir>) -> Result<()> {
    let dir = module?;
    dir.write("terraform.tfvars", "instance_name = \"from-tfvars\"\n")?;
    let out = stdout(
        tfvar(&dir)
            .env("TF_VAR_region", "from-env")
            .args(["-a", "--no-comments", "."]),
    );
    ensure!(out.contains("instance_name = \"from-tfvars\"\n"), "got:\n{out}");
    ensure!(out.contains("region        = \"from-env\"\n"), "got:\n{out}");
    Ok(())
}

#[rstest]
fn settings_file_and_environment_apply(module: Result<ModuleDir>) -> Result<()> {
    let dir = module?;
    dir.write(".tfvar.toml", "format = \"workspace\"\nvar = [\"region=from-settings\"]\n")?;
    let out = stdout(tfvar(&dir).arg("."));
    ensure!(out.contains("\"value\": \"from-settings\""), "got:\n{out}");

    let overridden = stdout(tfvar(&dir).env("TFVAR_FORMAT", "env-vars").arg("."));
    ensure!(
        overridden.contains("export TF_VAR_region='from-settings'\n"),
        "got:\n{overridden}"
    );
    Ok(())
}

#[rstest]
fn debug_logs_go_to_stderr(module: Result<ModuleDir>) -> Result<()> {
    let dir = module?;
    let output = tfvar(&dir)
        .args(["-d", "."])
        .assert()
        .success()
        .get_output()
        .clone();
    let log = String::from_utf8_lossy(&output.stderr);
    ensure!(log.contains("logger initialised"), "got:\n{log}");
    ensure!(log.contains("loaded module"), "got:\n{log}");
    ensure!(String::from_utf8_lossy(&output.stdout).starts_with("availability_zone_names"));
    Ok(())
}

#[rstest]
#[case::malformed_var(&["--var", "region", "."], "bad var string 'region'")]
#[case::missing_var_file(&["--var-file", "absent.tfvars", "."], "failed to read 'absent.tfvars'")]
#[case::missing_directory(&["no-such-dir"], "failed to load configuration in 'no-such-dir'")]
#[case::missing_settings(&["--config", "absent.toml", "."], "settings file 'absent.toml' does not exist")]
#[case::wrong_type(&["--var", "docker_ports=[1]", "."], "invalid value for variable 'docker_ports'")]
fn errors_exit_with_status_one(
    module: Result<ModuleDir>,
    #[case] args: &[&str],
    #[case] message: &str,
) -> Result<()> {
    let dir = module?;
    let err = stderr(tfvar(&dir).args(args));
    ensure!(err.contains(message), "expected {message:?} in:\n{err}");
    Ok(())
}

#[rstest]
fn format_flags_conflict(module: Result<ModuleDir>) -> Result<()> {
    let dir = module?;
    let output = tfvar(&dir)
        .args(["-e", "-w", "."])
        .assert()
        .failure()
        .code(2)
        .get_output()
        .clone();
    let err = String::from_utf8_lossy(&output.stderr);
    ensure!(err.contains("cannot be used with"), "got:\n{err}");
    Ok(())
}

#[rstest]
fn version_is_reported(module: Result<ModuleDir>) -> Result<()> {
    let dir = module?;
    let out = stdout(tfvar(&dir).arg("--version"));
    insta::with_settings!({filters => vec![(r"\d+\.\d+\.\d+\S*", "[VERSION]")]}, {
        assert_snapshot!(out, @"tfvar [VERSION]");
    });
    Ok(())
}
