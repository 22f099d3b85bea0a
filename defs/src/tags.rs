use std::collections::BTreeMap;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::Expr;

/// Resource tags, rendered as a `[{"Key": .., "Value": ..}]` list sorted by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags(BTreeMap<String, Expr>);

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Tag<'a> {
    key: &'a str,
    value: &'a Expr,
}

impl Tags {
    pub fn new() -> Self {
        Tags(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Tags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            seq.serialize_element(&Tag { key, value })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AWS_STACK_ID;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_tags_are_sorted_by_key() {
        let tags = Tags::new()
            .with("Name", "public-10.0.0.0")
            .with("Application", Expr::reference(AWS_STACK_ID));

        assert_eq!(
            serde_json::to_value(&tags).unwrap(),
            json!([
                {"Key": "Application", "Value": {"Ref": "AWS::StackId"}},
                {"Key": "Name", "Value": "public-10.0.0.0"}
            ])
        );
    }

    #[test]
    fn test_later_value_replaces_earlier() {
        let tags = Tags::new().with("Name", "a").with("Name", "b");
        assert_eq!(tags.get("Name"), Some(&Expr::from("b")));
    }
}
