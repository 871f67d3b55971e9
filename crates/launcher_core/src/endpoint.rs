use crate::CollectError;

/// Scheme prefixed to endpoints entered without one.
pub const DEFAULT_SCHEME: &str = "https://";

/// Canonical form of a user-entered endpoint address.
///
/// Trims whitespace, lower-cases, strips trailing slashes and prefixes
/// [`DEFAULT_SCHEME`] unless an http(s) scheme is already present.
pub fn normalize_endpoint(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = lowered.trim_end_matches('/');
    if stripped.starts_with("https://") || stripped.starts_with("http://") {
        stripped.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{stripped}")
    }
}

/// Normalizes `raw` and checks that the result is an absolute URL with a host.
///
/// `field` names the form entry in the returned error.
pub fn validate_endpoint(field: &str, raw: &str) -> Result<String, CollectError> {
    if raw.trim().trim_end_matches('/').is_empty() {
        return Err(CollectError::validation(field, "an endpoint address is required"));
    }
    let normalized = normalize_endpoint(raw);
    let parsed = url::Url::parse(&normalized)
        .map_err(|err| CollectError::validation(field, format!("{normalized}: {err}")))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(CollectError::validation(
            field,
            format!("{normalized} has no host"),
        ));
    }
    Ok(normalized)
}
