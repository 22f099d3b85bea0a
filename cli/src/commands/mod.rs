mod generate;
mod list;
mod validate;

pub use generate::{handle_generate, OutputFormat};
pub use list::handle_list;
pub use validate::handle_validate;
