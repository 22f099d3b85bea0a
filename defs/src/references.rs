use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::{is_pseudo_parameter, TemplateError};

const INTERNET_GATEWAY: &str = "AWS::EC2::InternetGateway";
const GATEWAY_ATTACHMENT: &str = "AWS::EC2::VPCGatewayAttachment";
const ROUTE: &str = "AWS::EC2::Route";

fn interpolation() -> &'static Regex {
    static INTERPOLATION: OnceLock<Regex> = OnceLock::new();
    INTERPOLATION.get_or_init(|| {
        Regex::new(r"\$\{([^}]*)\}").expect("interpolation pattern is valid")
    })
}

struct Declared<'a> {
    parameters: BTreeSet<&'a str>,
    resources: BTreeSet<&'a str>,
}

impl Declared<'_> {
    fn resolves_ref(&self, name: &str) -> bool {
        self.parameters.contains(name) || self.resources.contains(name) || is_pseudo_parameter(name)
    }
}

/// Every problem found in a rendered template, in document order.
///
/// Only a template that is not an object with a `Resources` map is an error
/// of its own, anything else is returned in the list.
pub fn find_template_problems(template: &Value) -> Result<Vec<TemplateError>, TemplateError> {
    let root = template.as_object().ok_or(TemplateError::MalformedTemplate)?;
    let resources = root
        .get("Resources")
        .and_then(Value::as_object)
        .ok_or(TemplateError::MalformedTemplate)?;

    let declared = Declared {
        parameters: section_keys(root, "Parameters"),
        resources: resources.keys().map(String::as_str).collect(),
    };

    let mut problems = vec![];
    if resources.is_empty() {
        problems.push(TemplateError::NoResources);
    }

    for (name, resource) in resources {
        let location = format!("Resources.{}", name);
        for target in dependency_names(resource) {
            if !declared.resources.contains(target) {
                problems.push(unresolved(target, &format!("{}.DependsOn", location)));
            }
        }
        for section in ["Properties", "Metadata"] {
            if let Some(value) = resource.get(section) {
                walk(value, &format!("{}.{}", location, section), &declared, &mut problems);
            }
        }
    }

    if let Some(outputs) = root.get("Outputs").and_then(Value::as_object) {
        for (name, output) in outputs {
            walk(output, &format!("Outputs.{}", name), &declared, &mut problems);
        }
    }

    problems.extend(missing_attachment_dependencies(resources));
    Ok(problems)
}

/// Fails with the first problem of a rendered template.
pub fn validate_template(template: &Value) -> Result<(), TemplateError> {
    match find_template_problems(template)?.into_iter().next() {
        Some(problem) => Err(problem),
        None => Ok(()),
    }
}

fn section_keys<'a>(root: &'a Map<String, Value>, section: &str) -> BTreeSet<&'a str> {
    root.get(section)
        .and_then(Value::as_object)
        .map(|map| map.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

fn dependency_names(resource: &Value) -> Vec<&str> {
    match resource.get("DependsOn") {
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => vec![],
    }
}

fn unresolved(target: &str, location: &str) -> TemplateError {
    TemplateError::UnresolvedReference {
        target: target.to_string(),
        location: location.to_string(),
    }
}

fn ref_target(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get("Ref")?.as_str()
}

fn walk(value: &Value, location: &str, declared: &Declared, problems: &mut Vec<TemplateError>) {
    match value {
        Value::Object(map) if map.len() == 1 && map.contains_key("Ref") => {
            match map["Ref"].as_str() {
                Some(name) if declared.resolves_ref(name) => {}
                Some(name) => problems.push(unresolved(name, location)),
                None => problems.push(unresolved(&map["Ref"].to_string(), location)),
            }
        }
        Value::Object(map) if map.len() == 1 && map.contains_key("Fn::GetAtt") => {
            let target = match &map["Fn::GetAtt"] {
                Value::Array(parts) => parts.first().and_then(Value::as_str),
                Value::String(dotted) => dotted.split('.').next(),
                _ => None,
            };
            match target {
                Some(name) if declared.resources.contains(name) => {}
                Some(name) => problems.push(unresolved(name, location)),
                None => problems.push(unresolved(&map["Fn::GetAtt"].to_string(), location)),
            }
        }
        Value::Object(map) if map.len() == 1 && map.contains_key("Fn::Sub") => {
            walk_sub(&map["Fn::Sub"], location, declared, problems);
        }
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, &format!("{}.{}", location, key), declared, problems);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &format!("{}[{}]", location, index), declared, problems);
            }
        }
        _ => {}
    }
}

fn walk_sub(value: &Value, location: &str, declared: &Declared, problems: &mut Vec<TemplateError>) {
    let (template, variables) = match value {
        Value::String(template) => (template.as_str(), None),
        Value::Array(parts) if parts.len() == 2 => match (&parts[0], parts[1].as_object()) {
            (Value::String(template), Some(variables)) => (template.as_str(), Some(variables)),
            _ => return problems.push(unresolved(&value.to_string(), location)),
        },
        _ => return problems.push(unresolved(&value.to_string(), location)),
    };

    if let Some(variables) = variables {
        for (key, child) in variables {
            walk(child, &format!("{}.Fn::Sub.{}", location, key), declared, problems);
        }
    }

    for capture in interpolation().captures_iter(template) {
        let name = &capture[1];
        if name.starts_with('!') {
            continue;
        }
        if variables.is_some_and(|vars| vars.contains_key(name)) {
            continue;
        }
        // `${Resource.Attribute}` is shorthand for `Fn::GetAtt`.
        let resolved = match name.split_once('.') {
            Some((resource, _)) => declared.resources.contains(resource),
            None => declared.resolves_ref(name),
        };
        if !resolved {
            problems.push(unresolved(name, location));
        }
    }
}

fn resource_type(resource: &Value) -> Option<&str> {
    resource.get("Type").and_then(Value::as_str)
}

fn property_ref(resource: &Value, key: &str) -> Option<String> {
    resource
        .get("Properties")
        .and_then(|properties| properties.get(key))
        .and_then(ref_target)
        .map(str::to_string)
}

// Routes through an internet gateway need the attachment before they can be created.
fn missing_attachment_dependencies(resources: &Map<String, Value>) -> Vec<TemplateError> {
    let mut attachments: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for (name, resource) in resources {
        if resource_type(resource) == Some(GATEWAY_ATTACHMENT) {
            if let Some(gateway) = property_ref(resource, "InternetGatewayId") {
                attachments.entry(gateway).or_default().push(name);
            }
        }
    }

    let mut missing = vec![];
    for (name, resource) in resources {
        if resource_type(resource) != Some(ROUTE) {
            continue;
        }
        let Some(gateway) = property_ref(resource, "GatewayId") else {
            continue;
        };
        let is_internet_gateway = resources
            .get(&gateway)
            .is_some_and(|target| resource_type(target) == Some(INTERNET_GATEWAY));
        if !is_internet_gateway {
            continue;
        }
        let dependencies = dependency_names(resource);
        let attached = attachments
            .get(&gateway)
            .is_some_and(|names| names.iter().any(|attachment| dependencies.contains(attachment)));
        if !attached {
            missing.push(TemplateError::MissingAttachmentDependency {
                resource: name.clone(),
                gateway,
            });
        }
    }
    missing
}
