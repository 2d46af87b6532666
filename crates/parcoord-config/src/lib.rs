mod error;
mod model;
mod parse;

pub use crate::error::ConfigError;
pub use crate::model::Config;
pub use crate::parse::{interpolate, load_config, parse_bool, parse_config};
