// src/generator/image.rs

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use super::GenerationError;

/// A decoded image ready to be attached to a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Decodes a base64 upload, optionally given as a `data:<mime>;base64,` URL.
/// The MIME type is taken from the file signature, not from the caller.
pub fn decode_image(encoded: &str) -> Result<ImageInput, GenerationError> {
    let payload = match encoded.trim().split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded.trim(),
    };

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(GenerationError::ImageDecode("image payload is empty".to_string()));
    }

    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| GenerationError::ImageDecode(e.to_string()))?;

    let mime_type = sniff_mime_type(&bytes)
        .ok_or_else(|| GenerationError::ImageDecode("unsupported image format".to_string()))?;

    Ok(ImageInput {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn decodes_raw_base64_png() {
        let encoded = BASE64.encode(PNG_HEADER);
        let image = decode_image(&encoded).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, PNG_HEADER.to_vec());
    }

    #[test]
    fn decodes_data_url_jpeg() {
        let encoded = format!("data:image/jpeg;base64,{}", BASE64.encode([0xFF, 0xD8, 0xFF, 0xE0]));
        let image = decode_image(&encoded).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            decode_image("not base64 at all!!"),
            Err(GenerationError::ImageDecode(_))
        ));
    }

    #[test]
    fn rejects_unknown_signature() {
        let encoded = BASE64.encode(b"plain text, not an image");
        assert!(decode_image(&encoded).is_err());
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(decode_image("  ").is_err());
    }
}
