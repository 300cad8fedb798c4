/// Default base URL for the chat completions API.
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Resolve a base URL (with or without the endpoint suffix) to the full
/// chat completions endpoint.
pub fn normalize_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    let base = if trimmed.is_empty() {
        DEFAULT_CHAT_BASE_URL
    } else {
        trimmed
    };
    let base = base.trim_end_matches('/');

    if base.ends_with(CHAT_COMPLETIONS_PATH) {
        base.to_string()
    } else {
        format!("{base}{CHAT_COMPLETIONS_PATH}")
    }
}
