use std::io::Cursor;

use image::ImageReader;

use crate::error::GltfError;

/// Read the pixel size of an encoded image without decoding its pixels.
pub fn probe_dimensions(name: &str, bytes: &[u8]) -> Result<(u32, u32), GltfError> {
    let failed = |message: String| GltfError::Image {
        name: name.to_string(),
        message,
    };
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| failed(e.to_string()))?
        .into_dimensions()
        .map_err(|e| failed(e.to_string()))
}

#[cfg(test)]
pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_dimensions() {
        assert_eq!(probe_dimensions("a.png", &png(8, 4)).unwrap(), (8, 4));
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = probe_dimensions("a.png", b"not an image").unwrap_err();
        assert!(matches!(err, GltfError::Image { .. }));
    }
}
