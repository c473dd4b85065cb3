//! Logging utilities with credential protection
//!
//! The escalation API key travels in every outbound request. These helpers keep
//! it, and anything that embeds it, out of the diagnostic stream.

/// Obscures a credential string by showing only the first few characters
///
/// # Examples
///
/// ```rust
/// use hitl_mcp::utils::logging::obscure_credential;
///
/// assert_eq!(obscure_credential("amp_live_4f9c2d1e"), "amp_l***");
/// assert_eq!(obscure_credential("abc"), "***");
/// ```
pub fn obscure_credential(credential: &str) -> String {
    let char_count = credential.chars().count();
    if char_count <= 5 {
        "*".repeat(char_count)
    } else {
        format!("{}***", truncate_string(credential, 5))
    }
}

/// Safely truncates a string to a maximum number of characters, respecting UTF-8 boundaries
///
/// # Examples
///
/// ```rust
/// use hitl_mcp::utils::logging::truncate_string;
///
/// assert_eq!(truncate_string("Hello World", 5), "Hello");
/// assert_eq!(truncate_string("Short", 100), "Short");
/// ```
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Replace every occurrence of `secret` in `input` with its obscured form
///
/// Used before logging upstream error bodies, which may echo request params
/// (and with them the embedded `authorization` field of a create call).
pub fn redact_secret(input: &str, secret: &str) -> String {
    if secret.is_empty() {
        return input.to_string();
    }
    input.replace(secret, &obscure_credential(secret))
}
