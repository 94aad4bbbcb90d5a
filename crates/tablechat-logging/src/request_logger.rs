use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::file_safe;

/// Show only the first few characters of a credential
pub fn mask_api_key(api_key: &str) -> String {
    format!("{}***", api_key.chars().take(4).collect::<String>())
}

fn describe_url(url: &str) -> String {
    let mut out = String::new();
    if let Ok(parsed_url) = reqwest::Url::parse(url) {
        out.push_str(&format!("URL: {}\n", url));
        out.push_str(&format!("Host: {}\n", parsed_url.host_str().unwrap_or("unknown")));
        out.push_str(&format!(
            "Port: {}\n",
            parsed_url.port().map(|p| p.to_string()).unwrap_or_else(|| {
                if parsed_url.scheme() == "https" {
                    "443 (default)".to_string()
                } else {
                    "80 (default)".to_string()
                }
            })
        ));
        out.push_str(&format!("Scheme: {}\n\n", parsed_url.scheme()));
    } else {
        out.push_str(&format!("URL: {}\n\n", url));
    }
    out
}

/// Write an outgoing chat completion request to `logs_dir`.
///
/// Returns the path written and the timestamp used, which names the
/// matching response log.
pub fn log_request_to_file<T: Serialize + ?Sized>(
    logs_dir: &Path,
    url: &str,
    request: &T,
    model: &str,
    api_key: &str,
) -> Result<(PathBuf, i64)> {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let filename = format!("req-{}-{}.txt", timestamp, file_safe(model));
    let file_path = logs_dir.join(&filename);

    let mut log_content = String::new();
    log_content.push_str("HTTP REQUEST LOG\n");
    log_content.push_str("================\n\n");
    log_content.push_str(&format!("Timestamp: {}\n", timestamp));
    log_content.push_str(&format!("Model: {}\n\n", model));
    log_content.push_str(&describe_url(url));

    log_content.push_str("Headers:\n");
    log_content.push_str("  Content-Type: application/json\n");
    log_content.push_str(&format!("  Authorization: Bearer {}\n\n", mask_api_key(api_key)));

    log_content.push_str("Request Body:\n");
    match serde_json::to_string_pretty(request) {
        Ok(json) => {
            log_content.push_str(&json);
            log_content.push('\n');
        }
        Err(e) => log_content.push_str(&format!("Error serializing request: {}\n", e)),
    }

    fs::write(&file_path, log_content)
        .with_context(|| format!("Failed to write request log to {}", file_path.display()))?;

    log::debug!("Request logged to: {}", file_path.display());
    Ok((file_path, timestamp))
}

/// Write the response paired with a request logged at `request_timestamp`.
pub fn log_response_to_file(
    logs_dir: &Path,
    status: reqwest::StatusCode,
    body: &str,
    request_timestamp: i64,
    model: &str,
) -> Result<PathBuf> {
    let filename = format!("resp-{}-{}.txt", request_timestamp, file_safe(model));
    let file_path = logs_dir.join(&filename);

    let mut log_content = String::new();
    log_content.push_str("HTTP RESPONSE LOG\n");
    log_content.push_str("=================\n\n");
    log_content.push_str(&format!("Timestamp: {}\n", request_timestamp));
    log_content.push_str(&format!("Model: {}\n\n", model));
    log_content.push_str(&format!(
        "Status: {} {}\n\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    ));

    log_content.push_str("Response Body:\n");
    // Pretty-print JSON, fall back to raw text
    match serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
    {
        Some(pretty) => log_content.push_str(&pretty),
        None => log_content.push_str(body),
    }
    log_content.push('\n');

    log_content.push_str("\n---\n");
    log_content.push_str(&format!("Response Size: {} bytes\n", body.len()));

    fs::write(&file_path, log_content)
        .with_context(|| format!("Failed to write response log to {}", file_path.display()))?;

    log::debug!("Response logged to: {}", file_path.display());
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("sk-abcdef123"), "sk-a***");
        assert_eq!(mask_api_key(""), "***");
    }

    #[test]
    fn test_request_and_response_logs_pair_up() {
        let dir = TempDir::new().unwrap();
        let body = serde_json::json!({ "model": "gpt-4o", "temperature": 0.5 });

        let (req_path, ts) = log_request_to_file(
            dir.path(),
            "https://api.openai.com/v1/chat/completions",
            &body,
            "openai/gpt-4o",
            "sk-secret-key",
        )
        .unwrap();
        let logged = std::fs::read_to_string(&req_path).unwrap();
        assert!(logged.contains("Host: api.openai.com"));
        assert!(logged.contains("Port: 443 (default)"));
        assert!(logged.contains("Bearer sk-s***"));
        assert!(!logged.contains("sk-secret-key"));
        assert!(logged.contains("\"temperature\": 0.5"));

        let resp_path = log_response_to_file(
            dir.path(),
            reqwest::StatusCode::OK,
            r#"{"choices":[]}"#,
            ts,
            "openai/gpt-4o",
        )
        .unwrap();
        assert_eq!(
            resp_path.file_name().unwrap().to_string_lossy(),
            format!("resp-{}-openai-gpt-4o.txt", ts)
        );
        let logged = std::fs::read_to_string(&resp_path).unwrap();
        assert!(logged.contains("Status: 200 OK"));
        assert!(logged.contains("\"choices\": []"));
    }
}
