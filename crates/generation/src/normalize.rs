use once_cell::sync::Lazy;
use regex::Regex;

// Opening fence, optional language tag (only when the line ends after it),
// lazily matched body, closing fence.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z0-9_+#.-]+[ \t]*\r?\n)?\s*(.*?)\s*```")
        .expect("fenced block pattern")
});

/// Extracts the code from a raw model response.
/// （從模型原始回應中擷取程式碼。）
///
/// The first fenced block wins and its markers are stripped. Without a fence
/// (or with an empty one) the whole response is returned trimmed. Running the
/// function on its own output leaves the text unchanged.
pub fn normalize_response(raw: &str) -> String {
    if let Some(body) = FENCED_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .filter(|body| !body.as_str().is_empty())
    {
        return body.as_str().to_string();
    }
    raw.trim().to_string()
}
