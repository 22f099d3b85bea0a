use std::collections::BTreeMap;

use serde::Serialize;

use crate::Expr;

/// Resource metadata consumed by the bootstrap agent on the instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceMetadata {
    #[serde(
        rename = "AWS::CloudFormation::Init",
        skip_serializing_if = "Option::is_none"
    )]
    init: Option<Init>,
    #[serde(
        rename = "AWS::CloudFormation::Authentication",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    authentication: BTreeMap<String, AuthenticationBlock>,
}

impl ResourceMetadata {
    pub fn new() -> Self {
        ResourceMetadata::default()
    }

    pub fn init(mut self, init: Init) -> Self {
        self.init = Some(init);
        self
    }

    pub fn authentication(mut self, name: impl Into<String>, block: AuthenticationBlock) -> Self {
        self.authentication.insert(name.into(), block);
        self
    }

    /// First authentication name used by a provisioned file without a matching block.
    pub(crate) fn unknown_authentication(&self) -> Option<&str> {
        let init = self.init.as_ref()?;
        init.configs
            .values()
            .flat_map(|config| config.files.values())
            .filter_map(|file| file.authentication.as_deref())
            .find(|name| !self.authentication.contains_key(*name))
    }

    /// First config name listed in a config set without a matching config.
    pub(crate) fn unknown_init_config(&self) -> Option<&str> {
        let init = self.init.as_ref()?;
        init.config_sets
            .values()
            .flatten()
            .map(String::as_str)
            .find(|name| !init.configs.contains_key(*name))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Init {
    #[serde(rename = "configSets", skip_serializing_if = "BTreeMap::is_empty")]
    config_sets: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    configs: BTreeMap<String, InitConfig>,
}

impl Init {
    pub fn new() -> Self {
        Init::default()
    }

    /// Init with the single `config` key run by default.
    pub fn single(config: InitConfig) -> Self {
        Init::new().config("config", config)
    }

    pub fn config(mut self, name: impl Into<String>, config: InitConfig) -> Self {
        self.configs.insert(name.into(), config);
        self
    }

    pub fn config_set<I, S>(mut self, name: impl Into<String>, configs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_sets
            .insert(name.into(), configs.into_iter().map(Into::into).collect());
        self
    }
}

/// One cfn-init config. Keys within each section are processed in sorted order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitConfig {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    packages: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    sources: BTreeMap<String, Expr>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    files: BTreeMap<String, InitFile>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    commands: BTreeMap<String, InitCommand>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    services: BTreeMap<String, BTreeMap<String, InitService>>,
}

impl InitConfig {
    pub fn new() -> Self {
        InitConfig::default()
    }

    pub fn package(mut self, manager: &str, name: &str) -> Self {
        self.packages
            .entry(manager.to_string())
            .or_default()
            .insert(name.to_string(), vec![]);
        self
    }

    /// Archive downloaded and unpacked into `target_dir`.
    pub fn source(mut self, target_dir: impl Into<String>, url: impl Into<Expr>) -> Self {
        self.sources.insert(target_dir.into(), url.into());
        self
    }

    pub fn file(mut self, path: impl Into<String>, file: InitFile) -> Self {
        self.files.insert(path.into(), file);
        self
    }

    pub fn command(mut self, key: impl Into<String>, command: InitCommand) -> Self {
        self.commands.insert(key.into(), command);
        self
    }

    pub fn sysvinit_service(mut self, name: impl Into<String>, service: InitService) -> Self {
        self.services
            .entry("sysvinit".to_string())
            .or_default()
            .insert(name.into(), service);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authentication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
}

impl InitFile {
    pub fn from_source(url: impl Into<Expr>) -> Self {
        InitFile {
            source: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn authentication(mut self, name: impl Into<String>) -> Self {
        self.authentication = Some(name.into());
        self
    }

    /// Octal mode as six digits, e.g. `000755`.
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn owned_by(mut self, owner: impl Into<String>, group: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self.group = Some(group.into());
        self
    }

    /// Executable script owned by root.
    pub fn root_script(self) -> Self {
        self.mode("000755").owned_by("root", "root")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitCommand {
    command: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwd: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, Expr>,
}

impl InitCommand {
    pub fn new(command: impl Into<Expr>) -> Self {
        InitCommand {
            command: command.into(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitService {
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ensure_running: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    files: Vec<String>,
}

impl InitService {
    pub fn enabled_and_running() -> Self {
        InitService {
            enabled: Some(true),
            ensure_running: Some(true),
            files: vec![],
        }
    }

    /// Restart the service when `path` changes.
    pub fn watch_file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthenticationType {
    S3,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationBlock {
    #[serde(rename = "type")]
    kind: AuthenticationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_key_id: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_key: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_name: Option<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buckets: Vec<Expr>,
}

impl AuthenticationBlock {
    fn empty(kind: AuthenticationType) -> Self {
        AuthenticationBlock {
            kind,
            access_key_id: None,
            secret_key: None,
            role_name: None,
            buckets: vec![],
        }
    }

    pub fn s3_access_keys(access_key_id: impl Into<Expr>, secret_key: impl Into<Expr>) -> Self {
        AuthenticationBlock {
            access_key_id: Some(access_key_id.into()),
            secret_key: Some(secret_key.into()),
            ..AuthenticationBlock::empty(AuthenticationType::S3)
        }
    }

    pub fn s3_role(role_name: impl Into<Expr>) -> Self {
        AuthenticationBlock {
            role_name: Some(role_name.into()),
            ..AuthenticationBlock::empty(AuthenticationType::S3)
        }
    }

    pub fn bucket(mut self, bucket: impl Into<Expr>) -> Self {
        self.buckets.push(bucket.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_metadata_keys_and_casing() {
        let metadata = ResourceMetadata::new()
            .authentication(
                "S3AccessCreds",
                AuthenticationBlock::s3_access_keys(
                    Expr::reference("AWSAccessKey"),
                    Expr::reference("AWSSecretKey"),
                )
                .bucket(Expr::reference("BucketName")),
            )
            .init(Init::single(
                InitConfig::new()
                    .source("/tmp/mods", Expr::reference("CSSModsTgz"))
                    .file(
                        "/tmp/init-config.sh",
                        InitFile::from_source(Expr::reference("CSSInitConfigScript"))
                            .authentication("S3AccessCreds")
                            .root_script(),
                    )
                    .command(
                        "2_run_init-config.sh",
                        InitCommand::new("/tmp/init-config.sh")
                            .cwd("~")
                            .env("RCON_PASSWORD", Expr::reference("CSSRconPassword")),
                    ),
            ));

        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            json!({
                "AWS::CloudFormation::Authentication": {
                    "S3AccessCreds": {
                        "type": "S3",
                        "accessKeyId": {"Ref": "AWSAccessKey"},
                        "secretKey": {"Ref": "AWSSecretKey"},
                        "buckets": [{"Ref": "BucketName"}]
                    }
                },
                "AWS::CloudFormation::Init": {
                    "config": {
                        "sources": {"/tmp/mods": {"Ref": "CSSModsTgz"}},
                        "files": {
                            "/tmp/init-config.sh": {
                                "source": {"Ref": "CSSInitConfigScript"},
                                "authentication": "S3AccessCreds",
                                "mode": "000755",
                                "owner": "root",
                                "group": "root"
                            }
                        },
                        "commands": {
                            "2_run_init-config.sh": {
                                "command": "/tmp/init-config.sh",
                                "cwd": "~",
                                "env": {"RCON_PASSWORD": {"Ref": "CSSRconPassword"}}
                            }
                        }
                    }
                }
            })
        );
        assert_eq!(metadata.unknown_authentication(), None);
    }

    #[test]
    fn test_unknown_authentication_is_detected() {
        let metadata = ResourceMetadata::new().init(Init::single(InitConfig::new().file(
            "/tmp/server.cfg",
            InitFile::from_source("https://example.com/server.cfg").authentication("Missing"),
        )));
        assert_eq!(metadata.unknown_authentication(), Some("Missing"));
    }

    #[test]
    fn test_config_sets_and_services() {
        let init = Init::new()
            .config("install", InitConfig::new().package("yum", "screen"))
            .config(
                "run",
                InitConfig::new().sysvinit_service(
                    "srcds",
                    InitService::enabled_and_running().watch_file("/tmp/cfg/server.cfg"),
                ),
            )
            .config_set("default", ["install", "run"]);
        let metadata = ResourceMetadata::new().init(init);

        assert_eq!(metadata.unknown_init_config(), None);
        assert_eq!(
            serde_json::to_value(&metadata).unwrap()["AWS::CloudFormation::Init"],
            json!({
                "configSets": {"default": ["install", "run"]},
                "install": {"packages": {"yum": {"screen": []}}},
                "run": {
                    "services": {
                        "sysvinit": {
                            "srcds": {
                                "enabled": true,
                                "ensureRunning": true,
                                "files": ["/tmp/cfg/server.cfg"]
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_unknown_config_in_set() {
        let metadata = ResourceMetadata::new().init(
            Init::single(InitConfig::new()).config_set("default", ["config", "later"]),
        );
        assert_eq!(metadata.unknown_init_config(), Some("later"));
    }
}
