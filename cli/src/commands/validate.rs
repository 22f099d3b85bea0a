use std::path::Path;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use log::{error, info};
use regex::Regex;
use serde_json::Value;
use stack_defs::{find_template_problems, TemplateError};
use stack_utils::read_input;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|extension| extension.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn short_form_tag() -> &'static Regex {
    static SHORT_FORM_TAG: OnceLock<Regex> = OnceLock::new();
    SHORT_FORM_TAG.get_or_init(|| {
        Regex::new(
            r"(?m)(?:^|[\s\[\{,])!(Ref|Condition|Base64|Cidr|FindInMap|GetAtt|GetAZs|ImportValue|Join|Select|Split|Sub|Transform|And|Equals|If|Not|Or)\b",
        )
        .expect("short form tag pattern is valid")
    })
}

/// The YAML parser drops tags, so `!Ref Server` would be read as the plain
/// string `Server` and pass every check.
fn reject_short_form_tags(path: &Path, content: &str) -> Result<()> {
    if let Some(captures) = short_form_tag().captures(content) {
        let tag = &captures[1];
        let line = content[..captures.get(1).map_or(0, |m| m.start())]
            .matches('\n')
            .count()
            + 1;
        bail!(
            "{} uses the short form !{} on line {}, only long form intrinsics (Ref: or Fn::{}:) can be validated",
            path.display(),
            tag,
            line,
            tag
        );
    }
    Ok(())
}

/// Every problem found in the template at `path`, which may be JSON or YAML.
fn find_problems(path: &Path) -> Result<Vec<TemplateError>> {
    let content = read_input(path)?;
    let value: Value = if is_yaml(path) {
        reject_short_form_tags(path, &content)?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("{} is not a valid YAML document", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not a valid JSON document", path.display()))?
    };
    Ok(find_template_problems(&value)?)
}

pub fn handle_validate(path: &Path) {
    match find_problems(path) {
        Ok(problems) if problems.is_empty() => {
            info!("Template {} validated successfully", path.display());
            println!("{} is valid", path.display());
        }
        Ok(problems) => {
            for problem in &problems {
                println!("{}", problem);
            }
            error!(
                "Template {} has {} problem(s)",
                path.display(),
                problems.len()
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to validate {}: {:?}", path.display(), e);
            std::process::exit(1);
        }
    }
}
