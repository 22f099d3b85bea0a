use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Logical name \"{0}\" is invalid, it must be non-empty and alphanumeric")]
    InvalidLogicalName(String),

    #[error("{kind} \"{name}\" is already declared in this template")]
    DuplicateLogicalName { kind: &'static str, name: String },

    #[error("Maximum number of {kind} ({max}) reached")]
    LimitExceeded { kind: &'static str, max: usize },

    #[error("Parameter \"{name}\" has an invalid default: {reason}")]
    InvalidParameterDefault { name: String, reason: String },

    #[error("Parameter \"{name}\" has an invalid AllowedPattern: {source}")]
    InvalidAllowedPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Resource \"{resource}\" uses authentication \"{authentication}\" which is not declared in its metadata")]
    UnknownAuthentication {
        resource: String,
        authentication: String,
    },

    #[error("Resource \"{resource}\" lists init config \"{config}\" in a config set but does not declare it")]
    UnknownInitConfig { resource: String, config: String },

    #[error("\"{target}\" referenced at {location} is not declared in this template")]
    UnresolvedReference { target: String, location: String },

    #[error("Resource \"{resource}\" routes through internet gateway \"{gateway}\" but does not depend on an attachment of it")]
    MissingAttachmentDependency { resource: String, gateway: String },

    #[error("Template must declare at least one resource")]
    NoResources,

    #[error("Template is not a JSON object with a Resources section")]
    MalformedTemplate,

    #[error("Failed to serialize template: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize template as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Rendered template is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
