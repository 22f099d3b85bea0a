use std::fs;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::tempdir;

fn templator(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_templator"))
        .args(args)
        .env("LOG_LEVEL", "error")
        .output()
        .expect("templator binary runs")
}

#[test]
fn test_prints_template_to_stdout() {
    let output = templator(&["base-infrastructure"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with("}\n"));
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["AWSTemplateFormatVersion"], "2010-09-09");
    assert_eq!(value["Resources"]["VPC"]["Type"], "AWS::EC2::VPC");
}

#[test]
fn test_writes_and_validates_output_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stacks").join("css-server-instance.yaml");
    let path = path.to_str().unwrap();

    let output = templator(&["css-server-instance", "--format", "yaml", "--output", path]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let value: Value = serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["Outputs"]["InstanceIp"]["Value"]["Ref"], "IPAddress");

    let output = templator(&["validate", path]);
    assert!(output.status.success());
}

#[test]
fn test_validate_reports_unresolved_references() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(
        &path,
        r#"{"Resources": {"Eip": {"Type": "AWS::EC2::EIP", "Properties": {"InstanceId": {"Ref": "Server"}}}}}"#,
    )
    .unwrap();

    let output = templator(&["validate", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"Server\" referenced at Resources.Eip.Properties.InstanceId"));
}

#[test]
fn test_validate_rejects_short_form_yaml_tags() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.yaml");
    fs::write(
        &path,
        "Resources:\n  Eip:\n    Type: AWS::EC2::EIP\n    Properties:\n      InstanceId: !Ref Server\n",
    )
    .unwrap();

    let output = templator(&["validate", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unknown_template_fails() {
    let output = templator(&["no-such-template"]);
    assert!(!output.status.success());
}

#[test]
fn test_list_names_every_template() {
    let output = templator(&["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for name in [
        "base-infrastructure",
        "minimal-infrastructure",
        "css-server-instance",
    ] {
        assert!(stdout.contains(name), "{} missing from list", name);
    }
}
