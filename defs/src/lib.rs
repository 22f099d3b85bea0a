pub mod ec2;
mod errors;
mod expression;
mod metadata;
mod output;
mod parameter;
mod references;
mod resource;
mod tags;
mod template;

pub use errors::TemplateError;
pub use expression::{
    is_pseudo_parameter, is_valid_logical_name, Expr, LogicalId, AWS_ACCOUNT_ID,
    AWS_NOTIFICATION_ARNS, AWS_NO_VALUE, AWS_PARTITION, AWS_REGION, AWS_STACK_ID,
    AWS_STACK_NAME, AWS_URL_SUFFIX,
};
pub use metadata::{
    AuthenticationBlock, AuthenticationType, Init, InitCommand, InitConfig, InitFile,
    InitService, ResourceMetadata,
};
pub use output::Output;
pub use parameter::{Parameter, ParameterType};
pub use references::{find_template_problems, validate_template};
pub use resource::{DeletionPolicy, Resource, ResourceProperties};
pub use tags::Tags;
pub use template::{Template, FORMAT_VERSION, MAX_OUTPUTS, MAX_PARAMETERS, MAX_RESOURCES};
