//! Tests for every output format.

use std::collections::BTreeMap;
use std::io;

use anyhow::{Result, anyhow, ensure};
use rstest::{fixture, rstest};
use test_helpers::module::ModuleDir;

use super::*;
use crate::config::VariableDeclaration;
use crate::error::SourceLocation;
use crate::{TfvarError, load};

fn var(name: &str, value: impl Into<Value>) -> Variable {
    Variable::from(
        VariableDeclaration::new(name, SourceLocation::new("main.tf")).with_default(value),
    )
}

fn render(format: OutputFormat, vars: &[Variable], with_comments: bool) -> Result<String> {
    let mut out = Vec::new();
    format.write(&mut out, vars, with_comments)?;
    Ok(String::from_utf8(out)?)
}

#[fixture]
fn sample() -> Result<Vec<Variable>> {
    let dir = ModuleDir::sample()?;
    Ok(load(dir.path())?)
}

const SAMPLE_TFVARS: &str = r#"availability_zone_names = ["us-west-1a"]
aws_amis = {
  eu-west-1 = "ami-b1cf19c6"
  us-east-1 = "ami-de7ab6b6"
  us-west-1 = "ami-3f75767a"
  us-west-2 = "ami-21f78e11"
}
docker_ports = [{
  external = 8300
  internal = 8301
  protocol = "tcp"
}]
instance_name = "my-instance"
# the root password to use with the database
password = null
region   = null
"#;

#[rstest]
fn tfvars_aligns_runs_and_writes_comments(sample: Result<Vec<Variable>>) -> Result<()> {
    let out = render(OutputFormat::Tfvars, &sample?, true)?;
    ensure!(out == SAMPLE_TFVARS, "got:\n{out}");
    Ok(())
}

#[rstest]
fn tfvars_without_comments_joins_the_run(sample: Result<Vec<Variable>>) -> Result<()> {
    let out = render(OutputFormat::Tfvars, &sample?, false)?;
    ensure!(
        out.ends_with(
            "instance_name = \"my-instance\"\npassword      = null\nregion        = null\n"
        ),
        "got:\n{out}"
    );
    ensure!(!out.contains('#'));
    Ok(())
}

#[rstest]
fn tfvars_splits_multi_line_descriptions() -> Result<()> {
    let decl = VariableDeclaration::new("zone", SourceLocation::new("main.tf"))
        .with_description("  first line\nsecond line\n")
        .with_default("a");
    let out = render(OutputFormat::Tfvars, &[Variable::from(decl)], true)?;
    ensure!(out == "# first line\n# second line\nzone = \"a\"\n", "got:\n{out}");
    Ok(())
}

#[rstest]
fn tfvars_escapes_strings_and_quotes_keys() -> Result<()> {
    let object = Value::Object(BTreeMap::from([
        ("not valid".to_owned(), Value::from(1_i64)),
        ("empty".to_owned(), Value::Object(BTreeMap::new())),
    ]));
    let vars = [
        var("text", "say \"hi\" ${name} %{if}\n\ttab\\"),
        var("settings", object),
    ];
    let out = render(OutputFormat::Tfvars, &vars, true)?;
    let expected = concat!(
        "text = \"say \\\"hi\\\" $${name} %%{if}\\n\\ttab\\\\\"\n",
        "settings = {\n",
        "  empty       = {}\n",
        "  \"not valid\" = 1\n",
        "}\n",
    );
    ensure!(out == expected, "got:\n{out}");
    Ok(())
}

#[rstest]
fn env_vars_flatten_values(sample: Result<Vec<Variable>>) -> Result<()> {
    let out = render(OutputFormat::EnvVars, &sample?, true)?;
    let expected = concat!(
        "export TF_VAR_availability_zone_names='[\"us-west-1a\"]'\n",
        "export TF_VAR_aws_amis='{ eu-west-1 = \"ami-b1cf19c6\", us-east-1 = \"ami-de7ab6b6\", us-west-1 = \"ami-3f75767a\", us-west-2 = \"ami-21f78e11\" }'\n",
        "export TF_VAR_docker_ports='[{ external = 8300, internal = 8301, protocol = \"tcp\" }]'\n",
        "export TF_VAR_instance_name='my-instance'\n",
        "export TF_VAR_password=''\n",
        "export TF_VAR_region=''\n",
    );
    ensure!(out == expected, "got:\n{out}");
    Ok(())
}

#[rstest]
fn workspace_payloads_use_single_quotes() -> Result<()> {
    let decl = VariableDeclaration::new("region", SourceLocation::new("main.tf"))
        .with_description("AWS region")
        .with_default("eu-west-1");
    let mut secret = var("zones", vec!["a", "b"]);
    secret.sensitive = true;
    let out = render(OutputFormat::Workspace, &[Variable::from(decl), secret], true)?;

    ensure!(
        out.starts_with(concat!(
            "{\n",
            "  \"data\": {\n",
            "    \"type\": \"vars\",\n",
            "    \"attributes\": {\n",
            "      \"key\": \"region\",\n",
            "      \"value\": \"eu-west-1\",\n",
            "      \"description\": \"AWS region\",\n",
            "      \"category\": \"terraform\",\n",
            "      \"hcl\": false,\n",
            "      \"sensitive\": false\n",
            "    }\n",
            "  }\n",
            "}\n",
        )),
        "got:\n{out}"
    );
    let payloads: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&out)
        .into_iter()
        .collect::<Result<_, _>>()?;
    let [_, second] = payloads.as_slice() else {
        return Err(anyhow!("expected two payloads, got {}", payloads.len()));
    };
    let attributes = second
        .pointer("/data/attributes")
        .ok_or_else(|| anyhow!("attributes missing"))?;
    ensure!(
        attributes.get("value").and_then(serde_json::Value::as_str) == Some("['a', 'b']"),
        "got {attributes}"
    );
    ensure!(attributes.get("sensitive").and_then(serde_json::Value::as_bool) == Some(true));
    Ok(())
}

#[rstest]
fn tfe_resource_aligns_scalar_blocks() -> Result<()> {
    let decl = VariableDeclaration::new("region", SourceLocation::new("main.tf"))
        .with_description("AWS region")
        .with_default("eu-west-1");
    let out = render(OutputFormat::TfeResource, &[Variable::from(decl)], true)?;
    let expected = concat!(
        "\n",
        "resource \"tfe_variable\" \"region\" {\n",
        "  key          = \"region\"\n",
        "  value        = \"eu-west-1\"\n",
        "  sensitive    = false\n",
        "  description  = \"AWS region\"\n",
        "  workspace_id = null\n",
        "  category     = \"terraform\"\n",
        "}\n",
    );
    ensure!(out == expected, "got:\n{out}");
    Ok(())
}

#[rstest]
fn tfe_resource_breaks_alignment_around_objects() -> Result<()> {
    let tags = Value::Object(BTreeMap::from([("env".to_owned(), Value::from("prod"))]));
    let mut secret = var("tags", tags);
    secret.sensitive = true;
    let out = render(OutputFormat::TfeResource, &[secret, var("count_", 2_i64)], true)?;
    let expected = concat!(
        "\n",
        "resource \"tfe_variable\" \"tags\" {\n",
        "  key = \"tags\"\n",
        "  value = {\n",
        "    env = \"prod\"\n",
        "  }\n",
        "  sensitive    = true\n",
        "  description  = \"\"\n",
        "  workspace_id = null\n",
        "  category     = \"terraform\"\n",
        "}\n",
        "\n",
        "resource \"tfe_variable\" \"count_\" {\n",
        "  key          = \"count_\"\n",
        "  value        = 2\n",
        "  sensitive    = false\n",
        "  description  = \"\"\n",
        "  workspace_id = null\n",
        "  category     = \"terraform\"\n",
        "}\n",
    );
    ensure!(out == expected, "got:\n{out}");
    Ok(())
}

#[rstest]
fn empty_input_writes_nothing() -> Result<()> {
    for format in [
        OutputFormat::Tfvars,
        OutputFormat::EnvVars,
        OutputFormat::Workspace,
        OutputFormat::TfeResource,
    ] {
        ensure!(render(format, &[], true)?.is_empty(), "{format:?} wrote output");
    }
    Ok(())
}

#[rstest]
#[case::tfvars("\"tfvars\"", OutputFormat::Tfvars)]
#[case::env("\"env-vars\"", OutputFormat::EnvVars)]
#[case::workspace("\"workspace\"", OutputFormat::Workspace)]
#[case::tfe("\"tfe-resource\"", OutputFormat::TfeResource)]
fn formats_deserialise_from_kebab_case(
    #[case] json: &str,
    #[case] expected: OutputFormat,
) -> Result<()> {
    ensure!(serde_json::from_str::<OutputFormat>(json)? == expected);
    Ok(())
}

struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[rstest]
fn write_failures_name_the_format() -> Result<()> {
    let Err(err) = OutputFormat::EnvVars.write(&mut BrokenPipe, &[var("a", "b")], true) else {
        return Err(anyhow!("writing to a broken pipe should fail"));
    };
    ensure!(
        matches!(&*err, TfvarError::Write { format: "environment", .. }),
        "got {err}"
    );
    Ok(())
}
