mod date_format;
mod model;
mod project;
mod search;
mod timezone;

pub use date_format::{DateFormat, parse_format};
pub use model::{CONFIG_FILE, Config, NavEntry};
pub use project::find_project_root;
pub use search::SearchConfig;
pub use timezone::parse_timezone;
