use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Contents of the secrets TOML file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl Secrets {
    /// Load secrets from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No secrets file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read secrets file {}", path.display()))
            }
        };

        toml::from_str(&content).with_context(|| format!("Failed to parse secrets file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = Secrets::load(&dir.path().join("secrets.toml")).unwrap();
        assert_eq!(secrets, Secrets::default());
    }

    #[test]
    fn test_load_keys() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "openai_api_key = \"sk-from-file\"\nmodel = \"gpt-4o-mini\"").unwrap();

        let secrets = Secrets::load(file.path()).unwrap();
        assert_eq!(secrets.openai_api_key.as_deref(), Some("sk-from-file"));
        assert_eq!(secrets.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(secrets.api_url, None);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "openai_api_key = ").unwrap();

        let err = Secrets::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse secrets file"));
    }
}
