use crate::error::{CoreError, CoreResult};

/// Accepts absolute http(s) URLs with a host. Returns the trimmed input,
/// not the normalized form, so history shows what the user typed.
pub fn validate_check_url(raw: &str) -> CoreResult<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidUrl("url must not be empty".to_string()));
    }
    let url = url::Url::parse(trimmed)
        .map_err(|e| CoreError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CoreError::InvalidUrl(format!(
            "{}: scheme must be http or https",
            trimmed
        )));
    }
    match url.host_str() {
        Some(h) if !h.is_empty() => Ok(trimmed),
        _ => Err(CoreError::InvalidUrl(format!("{}: missing host", trimmed))),
    }
}
