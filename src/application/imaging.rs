use image::RgbImage;

use crate::domain::errors::{DomainError, DomainResult};

/// Decodes an uploaded image in any format the `image` crate recognises into 8-bit RGB.
pub fn decode_rgb(bytes: &[u8]) -> DomainResult<RgbImage> {
    if bytes.is_empty() {
        return Err(DomainError::Decode("empty upload".into()));
    }
    let img = image::load_from_memory(bytes).map_err(|e| DomainError::Decode(e.to_string()))?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn decodes_png_with_alpha_to_rgb() {
        let img = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 128]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();

        let rgb = decode_rgb(&buf).unwrap();
        assert_eq!(rgb.dimensions(), (8, 4));
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn rejects_non_image_bytes() {
        let err = decode_rgb(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
    }

    #[test]
    fn rejects_empty_upload() {
        assert!(matches!(decode_rgb(&[]), Err(DomainError::Decode(_))));
    }
}
