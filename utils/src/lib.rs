mod logging;
mod output;

pub use logging::{log_level_from_env, setup_logging};
pub use output::{read_input, write_output};
