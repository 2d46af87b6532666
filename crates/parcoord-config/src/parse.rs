use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::model::Config;

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Config::from_raw(parse_config(&content)?)
}

pub fn parse_config(content: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut values: HashMap<String, String> = HashMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, raw_value) = line.split_once('=').ok_or(ConfigError::SyntaxError {
            line: line_num + 1,
            message: "expected Key=Value".into(),
        })?;

        let key = key.trim().to_string();
        let value = interpolate(raw_value.trim(), &values)?;
        values.insert(key, value);
    }

    Ok(values)
}

pub fn interpolate(value: &str, resolved: &HashMap<String, String>) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '~' && result.is_empty() {
            if let Some(home) = dirs::home_dir() {
                result.push_str(&home.to_string_lossy());
            } else {
                result.push(ch);
            }
        } else if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let var_name: String = chars.by_ref().take_while(|&c| c != '}').collect();
            if let Some(var_value) = resolved.get(&var_name) {
                result.push_str(var_value);
            } else {
                return Err(ConfigError::UnknownVariable(var_name));
            }
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}
