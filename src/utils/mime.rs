//! Media type helpers for request bodies and multipart parts.

use crate::defaults::media_types;

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME by file name (extension-based)
pub fn guess_mime_from_filename(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first_raw()
        .map(|s| s.to_string())
}

/// Combined guess: prefer bytes, fall back to the file name, otherwise octet-stream
pub fn guess_mime(bytes: Option<&[u8]>, filename: Option<&str>) -> String {
    if let Some(b) = bytes
        && let Some(m) = guess_mime_from_bytes(b)
    {
        return m;
    }
    if let Some(name) = filename
        && let Some(m) = guess_mime_from_filename(name)
    {
        return m;
    }
    media_types::APPLICATION_OCTET_STREAM.to_string()
}

/// Media type without parameters, lowercased (`Text/Plain; charset=x` -> `text/plain`).
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether two media types name the same type, ignoring parameters.
pub fn same_essence(a: &str, b: &str) -> bool {
    essence(a) == essence(b)
}

/// Whether the media type is a JSON flavour (`application/json`, `application/problem+json`).
pub fn is_json(media_type: &str) -> bool {
    let essence = essence(media_type);
    essence == media_types::APPLICATION_JSON || essence.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_prefers_magic_bytes() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(guess_mime(Some(&png), Some("file.txt")), "image/png");
    }

    #[test]
    fn guess_falls_back_to_name_then_octet_stream() {
        assert_eq!(guess_mime(Some(b"plain"), Some("data.json")), "application/json");
        assert_eq!(guess_mime(None, None), "application/octet-stream");
    }

    #[test]
    fn essence_strips_parameters() {
        assert_eq!(essence("Text/Plain; charset=UTF-8"), "text/plain");
        assert!(same_essence(
            "application/x-www-form-urlencoded;charset=UTF-8",
            "application/x-www-form-urlencoded"
        ));
        assert!(is_json("application/problem+json"));
        assert!(!is_json("text/plain"));
    }
}
