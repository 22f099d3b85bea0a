use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::{
    is_valid_logical_name, validate_template, LogicalId, Output, Parameter, Resource,
    TemplateError,
};

pub const FORMAT_VERSION: &str = "2010-09-09";
pub const MAX_PARAMETERS: usize = 200;
pub const MAX_RESOURCES: usize = 500;
pub const MAX_OUTPUTS: usize = 200;

/// One stack document. Entities are added once and never changed afterwards.
///
/// Parameters and resources share one namespace since both are targets of
/// `Ref`, outputs have their own.
#[derive(Debug, Clone, Default)]
pub struct Template {
    description: Option<String>,
    parameters: Vec<Parameter>,
    resources: Vec<Resource>,
    outputs: Vec<Output>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Rendered<'a> {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<&'a str, &'a Parameter>,
    resources: BTreeMap<&'a str, &'a Resource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<&'a str, &'a Output>,
}

impl Template {
    pub fn new() -> Self {
        Template::default()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> Result<LogicalId, TemplateError> {
        self.check_ref_target_name(parameter.name(), "Parameter")?;
        if self.parameters.len() >= MAX_PARAMETERS {
            return Err(TemplateError::LimitExceeded {
                kind: "parameters",
                max: MAX_PARAMETERS,
            });
        }
        parameter.validate()?;

        debug!("Adding parameter {}", parameter.name());
        let id = LogicalId::new(parameter.name());
        self.parameters.push(parameter);
        Ok(id)
    }

    pub fn add_resource(&mut self, resource: Resource) -> Result<LogicalId, TemplateError> {
        self.check_ref_target_name(resource.name(), "Resource")?;
        if self.resources.len() >= MAX_RESOURCES {
            return Err(TemplateError::LimitExceeded {
                kind: "resources",
                max: MAX_RESOURCES,
            });
        }
        resource.validate()?;

        debug!(
            "Adding resource {} ({})",
            resource.name(),
            resource.resource_type()
        );
        let id = LogicalId::new(resource.name());
        self.resources.push(resource);
        Ok(id)
    }

    pub fn add_output(&mut self, output: Output) -> Result<LogicalId, TemplateError> {
        if !is_valid_logical_name(output.name()) {
            return Err(TemplateError::InvalidLogicalName(output.name().to_string()));
        }
        if self.output(output.name()).is_some() {
            return Err(TemplateError::DuplicateLogicalName {
                kind: "Output",
                name: output.name().to_string(),
            });
        }
        if self.outputs.len() >= MAX_OUTPUTS {
            return Err(TemplateError::LimitExceeded {
                kind: "outputs",
                max: MAX_OUTPUTS,
            });
        }

        debug!("Adding output {}", output.name());
        let id = LogicalId::new(output.name());
        self.outputs.push(output);
        Ok(id)
    }

    fn check_ref_target_name(&self, name: &str, kind: &'static str) -> Result<(), TemplateError> {
        if !is_valid_logical_name(name) {
            return Err(TemplateError::InvalidLogicalName(name.to_string()));
        }
        if self.parameter(name).is_some() || self.resource(name).is_some() {
            return Err(TemplateError::DuplicateLogicalName {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name() == name)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.name() == name)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter()
    }

    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .iter()
            .filter(move |r| r.resource_type() == resource_type)
    }

    /// Renders the document and resolves every reference in it.
    pub fn to_value(&self) -> Result<Value, TemplateError> {
        let rendered = Rendered {
            format_version: FORMAT_VERSION,
            description: self.description.as_deref(),
            parameters: self.parameters.iter().map(|p| (p.name(), p)).collect(),
            resources: self.resources.iter().map(|r| (r.name(), r)).collect(),
            outputs: self.outputs.iter().map(|o| (o.name(), o)).collect(),
        };
        let value = serde_json::to_value(&rendered)?;
        validate_template(&value)?;

        info!(
            "Rendered template with {} parameters, {} resources and {} outputs",
            self.parameters.len(),
            self.resources.len(),
            self.outputs.len()
        );
        Ok(value)
    }

    /// JSON with sorted keys and four space indentation.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        let value = self.to_value()?;
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        value.serialize(&mut serializer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn to_yaml(&self) -> Result<String, TemplateError> {
        let value = self.to_value()?;
        Ok(serde_yaml::to_string(&value)?)
    }
}
