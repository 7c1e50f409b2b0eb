use http::HeaderMap;
use http::header::CONTENT_TYPE;

const MEDIA_TYPE_DELIMITERS: [char; 2] = [';', ','];

/// Extracts the lookup key for the request's `Content-Type`.
///
/// The value is cut at the first `;` or `,`, trimmed and lowercased, so `Application/JSON; charset=utf-8` yields
/// `application/json`. Returns `None` when the header is absent, empty or not visible ASCII.
pub fn media_type(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    if content_type.is_empty() {
        return None;
    }

    let media_type = content_type.split(MEDIA_TYPE_DELIMITERS).next().unwrap_or_default();
    Some(media_type.trim().to_ascii_lowercase())
}
