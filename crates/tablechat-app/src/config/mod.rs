pub mod secrets;

pub use secrets::Secrets;

/// Environment variable checked after the CLI flag
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Where the API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Cli,
    Environment,
    SecretsFile,
}

impl KeySource {
    pub fn describe(&self) -> &'static str {
        match self {
            KeySource::Cli => "--api-key / TABLECHAT_API_KEY",
            KeySource::Environment => OPENAI_API_KEY_ENV,
            KeySource::SecretsFile => "secrets file",
        }
    }
}

/// Pick the API key. Precedence: CLI flag > OPENAI_API_KEY > secrets file.
/// Blank values are skipped.
pub fn resolve_api_key(
    cli_key: Option<&str>,
    env_key: Option<&str>,
    secrets: &Secrets,
) -> Option<(String, KeySource)> {
    let candidates = [
        (cli_key, KeySource::Cli),
        (env_key, KeySource::Environment),
        (secrets.openai_api_key.as_deref(), KeySource::SecretsFile),
    ];

    candidates.into_iter().find_map(|(key, source)| {
        key.map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| (k.to_string(), source))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(key: Option<&str>) -> Secrets {
        Secrets {
            openai_api_key: key.map(str::to_string),
            ..Secrets::default()
        }
    }

    #[test]
    fn test_cli_key_wins() {
        let resolved = resolve_api_key(Some("sk-cli"), Some("sk-env"), &secrets(Some("sk-file")));
        assert_eq!(resolved, Some(("sk-cli".to_string(), KeySource::Cli)));
    }

    #[test]
    fn test_env_before_secrets_file() {
        let resolved = resolve_api_key(None, Some("sk-env"), &secrets(Some("sk-file")));
        assert_eq!(resolved, Some(("sk-env".to_string(), KeySource::Environment)));
    }

    #[test]
    fn test_secrets_file_fallback_and_blank_values() {
        let resolved = resolve_api_key(Some("  "), Some(""), &secrets(Some("sk-file")));
        assert_eq!(resolved, Some(("sk-file".to_string(), KeySource::SecretsFile)));
        assert_eq!(resolve_api_key(None, None, &secrets(None)), None);
    }
}
