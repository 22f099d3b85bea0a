use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const AWS_ACCOUNT_ID: &str = "AWS::AccountId";
pub const AWS_NOTIFICATION_ARNS: &str = "AWS::NotificationARNs";
pub const AWS_NO_VALUE: &str = "AWS::NoValue";
pub const AWS_PARTITION: &str = "AWS::Partition";
pub const AWS_REGION: &str = "AWS::Region";
pub const AWS_STACK_ID: &str = "AWS::StackId";
pub const AWS_STACK_NAME: &str = "AWS::StackName";
pub const AWS_URL_SUFFIX: &str = "AWS::URLSuffix";

const PSEUDO_PARAMETERS: [&str; 8] = [
    AWS_ACCOUNT_ID,
    AWS_NOTIFICATION_ARNS,
    AWS_NO_VALUE,
    AWS_PARTITION,
    AWS_REGION,
    AWS_STACK_ID,
    AWS_STACK_NAME,
    AWS_URL_SUFFIX,
];

/// Pseudo parameters are provided by the provisioning service and always resolve.
pub fn is_pseudo_parameter(name: &str) -> bool {
    PSEUDO_PARAMETERS.contains(&name)
}

/// Logical names are restricted to ASCII letters and digits.
pub fn is_valid_logical_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// A value inside a template, either a literal or an intrinsic function.
///
/// References are kept by logical name and only checked when the template is
/// rendered, so renaming a declaration is a change in one place.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    String(String),
    Bool(bool),
    Integer(i64),
    List(Vec<Expr>),
    Ref(String),
    GetAtt(String, String),
    Join(String, Vec<Expr>),
    Base64(Box<Expr>),
    Select(usize, Box<Expr>),
    GetAzs(Box<Expr>),
    Sub(String, BTreeMap<String, Expr>),
}

impl Expr {
    pub fn reference(name: impl Into<String>) -> Self {
        Expr::Ref(name.into())
    }

    pub fn get_att(name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Expr::GetAtt(name.into(), attribute.into())
    }

    pub fn join<I, E>(delimiter: impl Into<String>, parts: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Expr::Join(delimiter.into(), parts.into_iter().map(Into::into).collect())
    }

    pub fn base64(inner: impl Into<Expr>) -> Self {
        Expr::Base64(Box::new(inner.into()))
    }

    pub fn select(index: usize, list: impl Into<Expr>) -> Self {
        Expr::Select(index, Box::new(list.into()))
    }

    pub fn get_azs(region: impl Into<Expr>) -> Self {
        Expr::GetAzs(Box::new(region.into()))
    }

    pub fn sub(template: impl Into<String>) -> Self {
        Expr::Sub(template.into(), BTreeMap::new())
    }

    pub fn sub_with<I, K>(template: impl Into<String>, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, Expr)>,
        K: Into<String>,
    {
        Expr::Sub(
            template.into(),
            variables.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )
    }

    pub fn list<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Expr::List(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Expr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Expr::String(value) => serializer.serialize_str(value),
            Expr::Bool(value) => serializer.serialize_bool(*value),
            Expr::Integer(value) => serializer.serialize_i64(*value),
            Expr::List(items) => serializer.collect_seq(items),
            Expr::Ref(name) => single_entry(serializer, "Ref", name),
            Expr::GetAtt(name, attribute) => {
                single_entry(serializer, "Fn::GetAtt", &[name, attribute])
            }
            Expr::Join(delimiter, parts) => {
                single_entry(serializer, "Fn::Join", &(delimiter, parts))
            }
            Expr::Base64(inner) => single_entry(serializer, "Fn::Base64", inner),
            Expr::Select(index, list) => single_entry(serializer, "Fn::Select", &(index, list)),
            Expr::GetAzs(region) => single_entry(serializer, "Fn::GetAZs", region),
            Expr::Sub(template, variables) if variables.is_empty() => {
                single_entry(serializer, "Fn::Sub", template)
            }
            Expr::Sub(template, variables) => {
                single_entry(serializer, "Fn::Sub", &(template, variables))
            }
        }
    }
}

fn single_entry<S, V>(serializer: S, key: &str, value: &V) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::String(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::String(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Bool(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Integer(value)
    }
}

impl From<Vec<Expr>> for Expr {
    fn from(items: Vec<Expr>) -> Self {
        Expr::List(items)
    }
}

/// Handle returned when a parameter, resource or output is added to a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalId(String);

impl LogicalId {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        LogicalId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Ref` to the declaration behind this handle.
    pub fn reference(&self) -> Expr {
        Expr::Ref(self.0.clone())
    }

    /// `Fn::GetAtt` on the resource behind this handle.
    pub fn attribute(&self, attribute: &str) -> Expr {
        Expr::GetAtt(self.0.clone(), attribute.to_string())
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&LogicalId> for Expr {
    fn from(id: &LogicalId) -> Self {
        id.reference()
    }
}
