//! Screen capture decoding
//!
//! Turns raw pixel buffers pushed by the host and PNGs from `screencap -p`
//! into RGB frames for the locators.

use image::{DynamicImage, ImageBuffer, RgbImage, RgbaImage};

use super::VisionError;

/// Build an RGB frame from raw RGBA or RGB bytes
pub fn decode_raw(frame_data: &[u8], width: u32, height: u32) -> Result<RgbImage, VisionError> {
    let pixels = width as usize * height as usize;

    if frame_data.len() == pixels * 4 {
        let rgba: RgbaImage = ImageBuffer::from_raw(width, height, frame_data.to_vec()).ok_or(
            VisionError::InvalidFrameData {
                expected: pixels * 4,
                actual: frame_data.len(),
            },
        )?;
        return Ok(DynamicImage::ImageRgba8(rgba).into_rgb8());
    }

    if frame_data.len() == pixels * 3 {
        return ImageBuffer::from_raw(width, height, frame_data.to_vec()).ok_or(
            VisionError::InvalidFrameData {
                expected: pixels * 3,
                actual: frame_data.len(),
            },
        );
    }

    Err(VisionError::InvalidFrameData {
        expected: pixels * 4,
        actual: frame_data.len(),
    })
}

/// Decode an encoded screenshot into an RGB frame
pub fn decode_png(bytes: &[u8]) -> Result<RgbImage, VisionError> {
    Ok(image::load_from_memory(bytes)?.into_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    #[test]
    fn test_rgba_frame_data() {
        let width = 10u32;
        let height = 10u32;
        let frame_data = vec![255u8; (width * height * 4) as usize];

        let frame = decode_raw(&frame_data, width, height).unwrap();
        assert_eq!(frame.dimensions(), (width, height));
        assert_eq!(*frame.get_pixel(9, 9), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_rgb_frame_data() {
        let mut frame_data = vec![0u8; 4 * 3 * 3];
        // Pixel (1, 0)
        frame_data[3..6].copy_from_slice(&[55, 55, 95]);

        let frame = decode_raw(&frame_data, 4, 3).unwrap();
        assert_eq!(*frame.get_pixel(1, 0), Rgb([55, 55, 95]));
        assert_eq!(*frame.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let frame_data = [10u8, 20, 30, 255, 40, 50, 60, 0];
        let frame = decode_raw(&frame_data, 2, 1).unwrap();
        assert_eq!(*frame.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*frame.get_pixel(1, 0), Rgb([40, 50, 60]));
    }

    #[test]
    fn test_invalid_frame_data() {
        // Wrong size data
        let frame_data = vec![255u8; 100];
        assert!(matches!(
            decode_raw(&frame_data, 10, 10),
            Err(VisionError::InvalidFrameData {
                expected: 400,
                actual: 100
            })
        ));
    }

    #[test]
    fn test_png_decode() {
        let original: RgbImage = ImageBuffer::from_fn(8, 6, |x, y| Rgb([x as u8, y as u8, 7]));
        let mut bytes = Vec::new();
        original
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        assert_eq!(decode_png(&bytes).unwrap(), original);
    }

    #[test]
    fn test_garbage_png() {
        assert!(decode_png(b"not a png").is_err());
    }
}
