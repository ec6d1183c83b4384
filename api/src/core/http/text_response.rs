use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Content type of every relay answer.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// 200 with the provider text as-is.
pub fn text_ok(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
        body,
    )
        .into_response()
}

/// 200 with the provider text as-is, marked as a download named `filename`.
///
/// The body is byte-identical to [`text_ok`]. A filename that sanitizes to
/// nothing falls back to the inline response.
pub fn text_attachment(body: String, filename: &str) -> Response {
    let mut response = text_ok(body);
    if let Some(value) = content_disposition(filename) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// `attachment; filename="<name>"`, or `None` if nothing usable remains.
pub fn content_disposition(filename: &str) -> Option<HeaderValue> {
    let name = sanitize_filename(filename);
    if name.is_empty() {
        return None;
    }
    HeaderValue::from_str(&format!("attachment; filename=\"{name}\"")).ok()
}

/// Drops characters that would break out of the quoted header parameter:
/// control characters, quotes, backslashes and anything outside visible ASCII.
pub fn sanitize_filename(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .filter(|c| !matches!(c, '"' | '\\'))
        .collect::<String>()
        .trim()
        .to_string()
}
