//! Format detection for image payloads without a declared content type.

use crate::error::TaskError;

/// Returns the MIME type of the image in `data`.
///
/// Raster formats are recognised by [`image::guess_format`]; SVG documents
/// are matched on their leading markup.
///
/// ```
/// use chainvisor::decode::sniff;
///
/// assert_eq!(sniff(b"GIF89a\x01\x00").unwrap(), "image/gif");
/// assert!(sniff(b"plain text").is_err());
/// ```
pub fn sniff(data: &[u8]) -> Result<&'static str, TaskError> {
    if is_svg(data) {
        return Ok("image/svg+xml");
    }
    image::guess_format(data)
        .map(|format| format.to_mime_type())
        .map_err(|e| TaskError::decode(format!("unrecognized payload format: {e}")))
}

fn is_svg(data: &[u8]) -> bool {
    let text = data.trim_ascii_start();
    text.starts_with(b"<svg")
        || (text.starts_with(b"<?xml") && text.windows(4).any(|w| w == b"<svg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_common_image_formats() {
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n").unwrap(), "image/png");
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap(), "image/jpeg");
        assert_eq!(sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 ").unwrap(), "image/webp");
    }

    #[test]
    fn svg_markup_is_recognised() {
        assert_eq!(
            sniff(b"  <svg xmlns='http://www.w3.org/2000/svg'/>").unwrap(),
            "image/svg+xml"
        );
        assert_eq!(sniff(b"<?xml version='1.0'?><svg/>").unwrap(), "image/svg+xml");
    }

    #[test]
    fn unknown_input_is_a_decode_error() {
        for data in [&b""[..], b"hello", b"<?xml version='1.0'?><note/>"] {
            let err = sniff(data).unwrap_err();
            assert_eq!(err.as_label(), "task_decode");
        }
    }
}
