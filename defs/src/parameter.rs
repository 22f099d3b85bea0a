use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    String,
    Number,
    #[serde(rename = "List<Number>")]
    NumberList,
    CommaDelimitedList,
    #[serde(rename = "AWS::EC2::Image::Id")]
    ImageId,
    #[serde(rename = "AWS::EC2::KeyPair::KeyName")]
    KeyPairName,
    #[serde(rename = "AWS::EC2::VPC::Id")]
    VpcId,
    #[serde(rename = "AWS::EC2::Subnet::Id")]
    SubnetId,
    #[serde(rename = "AWS::EC2::SecurityGroup::Id")]
    SecurityGroupId,
    #[serde(rename = "AWS::SSM::Parameter::Value<String>")]
    SsmString,
}

/// A typed input of the template, substituted by the provisioning service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(skip)]
    name: String,
    #[serde(rename = "Type")]
    parameter_type: ParameterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    allowed_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraint_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_echo: Option<bool>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        Parameter {
            name: name.into(),
            parameter_type,
            default: None,
            description: None,
            allowed_values: vec![],
            allowed_pattern: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            constraint_description: None,
            no_echo: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Parameter::new(name, ParameterType::String)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn allowed_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.allowed_pattern = Some(pattern.into());
        self
    }

    pub fn length(mut self, min: u32, max: u32) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn value_range(mut self, min: i64, max: i64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    pub fn constraint_description(mut self, description: impl Into<String>) -> Self {
        self.constraint_description = Some(description.into());
        self
    }

    pub fn no_echo(mut self) -> Self {
        self.no_echo = Some(true);
        self
    }

    /// Checks the declared default against the type and constraints of the parameter.
    pub(crate) fn validate(&self) -> Result<(), TemplateError> {
        let pattern = match &self.allowed_pattern {
            Some(pattern) => Some(Regex::new(&format!("^(?:{})$", pattern)).map_err(
                |source| TemplateError::InvalidAllowedPattern {
                    name: self.name.clone(),
                    source,
                },
            )?),
            None => None,
        };

        let Some(default) = &self.default else {
            return Ok(());
        };

        let text = match (self.parameter_type, default) {
            (ParameterType::Number, Value::Number(number)) => number.to_string(),
            (ParameterType::Number, Value::String(s)) if s.parse::<f64>().is_ok() => s.clone(),
            (ParameterType::Number, other) => {
                return Err(self.invalid_default(format!("{} is not a number", other)));
            }
            (_, Value::String(s)) => s.clone(),
            (_, other) => {
                return Err(self.invalid_default(format!("{} is not a string", other)));
            }
        };

        if !self.allowed_values.is_empty() && !self.allowed_values.contains(&text) {
            return Err(self.invalid_default(format!(
                "\"{}\" is not one of the allowed values",
                text
            )));
        }

        if self.parameter_type == ParameterType::Number {
            // Parsed above, only the range remains.
            let value: f64 = text.parse().unwrap_or_default();
            if self.min_value.is_some_and(|min| value < min as f64)
                || self.max_value.is_some_and(|max| value > max as f64)
            {
                return Err(self.invalid_default(format!("{} is out of range", text)));
            }
            return Ok(());
        }

        let length = text.chars().count() as u32;
        if self.min_length.is_some_and(|min| length < min)
            || self.max_length.is_some_and(|max| length > max)
        {
            return Err(self.invalid_default(format!(
                "\"{}\" has length {} outside the allowed bounds",
                text, length
            )));
        }

        if let Some(pattern) = pattern {
            if !pattern.is_match(&text) {
                return Err(self.invalid_default(format!(
                    "\"{}\" does not match the allowed pattern",
                    text
                )));
            }
        }

        Ok(())
    }

    fn invalid_default(&self, reason: String) -> TemplateError {
        TemplateError::InvalidParameterDefault {
            name: self.name.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CIDR_PATTERN: &str = r"(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})/(\d{1,2})";

    fn ssh_location() -> Parameter {
        Parameter::string("SSHLocation")
            .description("The IP address range that can be used to SSH to the EC2 instances")
            .length(9, 18)
            .allowed_pattern(CIDR_PATTERN)
            .constraint_description("must be a valid IP CIDR range of the form x.x.x.x/x.")
    }

    #[test]
    fn test_serialize_parameter_skips_unset_fields() {
        let parameter = Parameter::new("AmiIdLinux", ParameterType::ImageId)
            .default("ami-82f4dae7")
            .description("Instances in the DMZ will use this AMI.");

        assert_eq!(
            serde_json::to_value(&parameter).unwrap(),
            json!({
                "Type": "AWS::EC2::Image::Id",
                "Default": "ami-82f4dae7",
                "Description": "Instances in the DMZ will use this AMI."
            })
        );
    }

    #[test]
    fn test_serialize_constraints() {
        let parameter = ssh_location().default("0.0.0.0/0");
        let value = serde_json::to_value(&parameter).unwrap();
        assert_eq!(value["MinLength"], json!(9));
        assert_eq!(value["MaxLength"], json!(18));
        assert_eq!(value["AllowedPattern"], json!(CIDR_PATTERN));
    }

    #[test]
    fn test_valid_cidr_default() {
        assert!(ssh_location().default("0.0.0.0/0").validate().is_ok());
    }

    #[test]
    fn test_default_must_match_pattern() {
        let err = ssh_location().default("everywhere").validate().unwrap_err();
        assert!(matches!(err, TemplateError::InvalidParameterDefault { .. }));
    }

    #[test]
    fn test_default_must_respect_length() {
        assert!(ssh_location().default("1.1.1.1/1").validate().is_ok());
        let err = ssh_location().default("1.1.1/1").validate().unwrap_err();
        assert!(err.to_string().contains("length"));
    }

    #[test]
    fn test_default_must_be_allowed() {
        let parameter = Parameter::string("InstanceType")
            .allowed_values(["t2.nano", "t2.micro"])
            .default("m5.large");
        assert!(parameter.validate().is_err());
    }

    #[test]
    fn test_number_default() {
        let parameter = Parameter::new("Port", ParameterType::Number).default(27015);
        assert!(parameter.validate().is_ok());

        let parameter = Parameter::new("Port", ParameterType::Number).default("27015");
        assert!(parameter.validate().is_ok());

        let parameter = Parameter::new("Port", ParameterType::Number).default("many");
        assert!(parameter.validate().is_err());

        let parameter = Parameter::new("Port", ParameterType::Number)
            .value_range(1, 1024)
            .default(27015);
        assert!(parameter.validate().is_err());
    }

    #[test]
    fn test_string_default_must_be_string() {
        let parameter = Parameter::string("EnvName").default(true);
        assert!(parameter.validate().is_err());
    }

    #[test]
    fn test_invalid_pattern_is_reported_without_default() {
        let parameter = Parameter::string("Broken").allowed_pattern("(unclosed");
        assert!(matches!(
            parameter.validate(),
            Err(TemplateError::InvalidAllowedPattern { .. })
        ));
    }
}
