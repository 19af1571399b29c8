//! Transport encoding: PNG bytes to a `data:` URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Wrap PNG bytes as a `data:image/png;base64,...` URL.
pub fn data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trips() {
        let bytes = b"\x89PNG\r\n\x1a\nrest";
        let url = data_url(bytes);
        let b64 = url.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(STANDARD.decode(b64).unwrap(), bytes);
    }
}
