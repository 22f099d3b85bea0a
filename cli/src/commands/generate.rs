use std::path::Path;

use anyhow::{Context, Result};
use log::{error, info};
use stack_templator::StackTemplate;
use stack_utils::write_output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

fn render(template: StackTemplate, format: OutputFormat) -> Result<String> {
    let document = template
        .generate()
        .with_context(|| format!("Failed to build template {}", template))?;
    let content = match format {
        OutputFormat::Json => document.to_json(),
        OutputFormat::Yaml => document.to_yaml(),
    }
    .with_context(|| format!("Failed to render template {}", template))?;
    Ok(content)
}

pub fn handle_generate(template: StackTemplate, format: OutputFormat, output: Option<&Path>) {
    match render(template, format).and_then(|content| write_output(&content, output)) {
        Ok(_) => {
            info!("Template {} generated successfully", template);
        }
        Err(e) => {
            error!("Failed to generate template {}: {:?}", template, e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_formats() {
        let json = render(StackTemplate::MinimalInfrastructure, OutputFormat::Json).unwrap();
        let yaml = render(StackTemplate::MinimalInfrastructure, OutputFormat::Yaml).unwrap();

        let from_json: serde_json::Value = serde_json::from_str(&json).unwrap();
        let from_yaml: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(from_json, from_yaml);
    }
}
