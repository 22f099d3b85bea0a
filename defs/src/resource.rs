use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{LogicalId, ResourceMetadata, TemplateError};

/// Typed property set of one provider resource type.
pub trait ResourceProperties: Serialize {
    const RESOURCE_TYPE: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(skip)]
    name: String,
    #[serde(rename = "Type")]
    resource_type: String,
    #[serde(skip_serializing_if = "is_empty_object")]
    properties: Value,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_depends_on"
    )]
    depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ResourceMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deletion_policy: Option<DeletionPolicy>,
}

impl Resource {
    pub fn new<P: ResourceProperties>(
        name: impl Into<String>,
        properties: P,
    ) -> Result<Self, TemplateError> {
        Ok(Resource {
            name: name.into(),
            resource_type: P::RESOURCE_TYPE.to_string(),
            properties: serde_json::to_value(&properties)?,
            depends_on: vec![],
            metadata: None,
            deletion_policy: None,
        })
    }

    /// Explicit creation order, for dependencies not visible through a `Ref`.
    pub fn depends_on(mut self, resource: &LogicalId) -> Self {
        if !self.depends_on.iter().any(|name| name == resource.as_str()) {
            self.depends_on.push(resource.as_str().to_string());
        }
        self
    }

    pub fn metadata(mut self, metadata: ResourceMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn properties(&self) -> &Value {
        &self.properties
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub(crate) fn validate(&self) -> Result<(), TemplateError> {
        let Some(metadata) = &self.metadata else {
            return Ok(());
        };
        if let Some(authentication) = metadata.unknown_authentication() {
            return Err(TemplateError::UnknownAuthentication {
                resource: self.name.clone(),
                authentication: authentication.to_string(),
            });
        }
        if let Some(config) = metadata.unknown_init_config() {
            return Err(TemplateError::UnknownInitConfig {
                resource: self.name.clone(),
                config: config.to_string(),
            });
        }
        Ok(())
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(|map| map.is_empty())
}

// A single dependency is written as a plain string.
fn serialize_depends_on<S>(depends_on: &Vec<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match depends_on.as_slice() {
        [single] => serializer.serialize_str(single),
        many => serializer.collect_seq(many),
    }
}
