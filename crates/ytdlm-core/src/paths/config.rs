//! Configuration file utilities.
//!
//! The configuration file is a dotenv-style `KEY=value` file so the same
//! keys can also be supplied through the process environment.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use super::error::PathError;
use super::platform::config_root;

/// File name of the configuration file inside the config root.
pub const CONFIG_FILE_NAME: &str = "config.env";

/// Location of the configuration file.
pub fn config_file_path() -> Result<PathBuf, PathError> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Render `value` so that dotenv parsing yields it back unchanged.
///
/// Plain values are written bare; anything with whitespace, quotes or a
/// `#` is quoted.
pub fn quote_env_value(value: &str) -> String {
    let plain = !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '#' | '\\' | '$'));
    if plain {
        return value.to_string();
    }
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{escaped}\"")
}

/// Persist a key=value pair into the configuration file.
///
/// If the key already exists, its value is updated in place.
/// If the key doesn't exist, it is appended. The config directory
/// is created when missing.
pub fn persist_env_value(key: &str, value: &str) -> Result<(), PathError> {
    let path = config_file_path()?;
    let file_error = |e: std::io::Error| PathError::ConfigFileError {
        path: path.clone(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PathError::CreateFailed {
            path: parent.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    let lines: Vec<String> = if path.exists() {
        fs::read_to_string(&path)
            .map_err(file_error)?
            .lines()
            .map(std::string::ToString::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let mut updated = false;
    let mut output: Vec<String> = Vec::with_capacity(lines.len() + 1);

    for line in lines {
        match line.split_once('=') {
            Some((lhs, _)) if lhs.trim() == key => {
                if !updated {
                    output.push(format!("{key}={}", quote_env_value(value)));
                    updated = true;
                }
            }
            _ => output.push(line),
        }
    }

    if !updated {
        output.push(format!("{key}={}", quote_env_value(value)));
    }

    let mut content = output.join("\n");
    content.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .map_err(file_error)?;
    file.write_all(content.as_bytes()).map_err(file_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};
    use tempfile::tempdir;

    #[test]
    fn test_persist_env_value_updates_existing_key() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let config_dir = temp.path().join("cfg");
        let _env = EnvVarGuard::set("YTDLM_CONFIG_DIR", config_dir.to_string_lossy().as_ref());

        persist_env_value("YTDLM_MAX_RETRIES", "3").unwrap();
        persist_env_value("YTDLM_POLL_INTERVAL_SECS", "10").unwrap();
        persist_env_value("YTDLM_MAX_RETRIES", "5").unwrap();

        let contents = fs::read_to_string(config_dir.join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(
            contents,
            "YTDLM_MAX_RETRIES=5\nYTDLM_POLL_INTERVAL_SECS=10\n"
        );
    }

    #[test]
    fn test_quote_env_value() {
        assert_eq!(quote_env_value("/srv/media"), "/srv/media");
        assert_eq!(quote_env_value("/home/me/My Videos"), "'/home/me/My Videos'");
        assert_eq!(quote_env_value(""), "''");
        assert_eq!(quote_env_value("it's here"), "\"it's here\"");
    }

    #[test]
    fn test_quoted_values_survive_dotenv_parsing() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        let values = ["/home/me/My Videos", "it's \"odd\" #1", "C:\\media"];
        let content: String = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("K{i}={}\n", quote_env_value(v)))
            .collect();
        fs::write(&path, content).unwrap();

        let parsed: Vec<(String, String)> = dotenvy::from_path_iter(&path)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        let got: Vec<&str> = parsed.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(got, values);
    }
}
