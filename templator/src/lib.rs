mod base_infrastructure;
mod bootstrap;
mod css_server_instance;
mod minimal_infrastructure;
mod network;

use std::fmt;
use std::str::FromStr;

use log::info;
use stack_defs::{Template, TemplateError};

pub use css_server_instance::INSTANCE as CSS_SERVER_INSTANCE;

/// Every stack document this crate knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackTemplate {
    BaseInfrastructure,
    MinimalInfrastructure,
    CssServerInstance,
}

impl StackTemplate {
    pub const ALL: [StackTemplate; 3] = [
        StackTemplate::BaseInfrastructure,
        StackTemplate::MinimalInfrastructure,
        StackTemplate::CssServerInstance,
    ];

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            StackTemplate::BaseInfrastructure => "base-infrastructure",
            StackTemplate::MinimalInfrastructure => "minimal-infrastructure",
            StackTemplate::CssServerInstance => "css-server-instance",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StackTemplate::BaseInfrastructure => base_infrastructure::DESCRIPTION,
            StackTemplate::MinimalInfrastructure => minimal_infrastructure::DESCRIPTION,
            StackTemplate::CssServerInstance => css_server_instance::DESCRIPTION,
        }
    }

    pub fn generate(&self) -> Result<Template, TemplateError> {
        info!("Generating template {}", self.name());
        match self {
            StackTemplate::BaseInfrastructure => base_infrastructure::generate_template(),
            StackTemplate::MinimalInfrastructure => minimal_infrastructure::generate_template(),
            StackTemplate::CssServerInstance => css_server_instance::generate_template(),
        }
    }
}

impl fmt::Display for StackTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StackTemplate {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        StackTemplate::ALL
            .into_iter()
            .find(|template| template.name() == name)
            .ok_or_else(|| format!("Unknown template: {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_names_round_trip() {
        for template in StackTemplate::ALL {
            assert_eq!(template.name().parse::<StackTemplate>(), Ok(template));
        }
        assert!("vpc".parse::<StackTemplate>().is_err());
    }

    #[test]
    fn test_document_description_matches_registry() {
        for template in StackTemplate::ALL {
            let document = template.generate().unwrap();
            assert_eq!(document.description(), Some(template.description()));
        }
    }
}
