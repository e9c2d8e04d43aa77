use image::{imageops::FilterType, ImageReader};
use ndarray::Array4;
use std::io::Cursor;
use thiserror::Error;

pub const INPUT_HEIGHT: u32 = 64;
pub const INPUT_WIDTH: u32 = 64;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("failed to read image format: {0}")]
    Format(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Converts arbitrary encoded image bytes into the model's input tensor:
/// NHWC `(1, 64, 64, 3)`, RGB, f32 in `[0, 1]`.
///
/// The format is guessed from the magic bytes rather than any filename hint.
/// Grayscale inputs are expanded to three identical channels by `to_rgb8`.
/// The decoder yields RGB natively, so unlike OpenCV-based stacks there is no
/// BGR swap. Resizing is aspect-distorting on purpose: the model was trained
/// on squashed 64x64 frames, not letterboxed ones.
pub fn normalize(bytes: &[u8]) -> Result<Array4<f32>, PreprocessError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let img = reader.decode()?;

    let resized = img.resize_exact(INPUT_WIDTH, INPUT_HEIGHT, FilterType::CatmullRom);
    let rgb = resized.to_rgb8();

    let mut input = Array4::<f32>::zeros((
        1,
        INPUT_HEIGHT as usize,
        INPUT_WIDTH as usize,
        3,
    ));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        input[[0, y as usize, x as usize, 0]] = (r as f32) / 255.;
        input[[0, y as usize, x as usize, 1]] = (g as f32) / 255.;
        input[[0, y as usize, x as usize, 2]] = (b as f32) / 255.;
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};
    use std::io::Cursor;

    fn encode_rgb_png(img: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn encode_gray_png(img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_rgb_image_normalizes_to_fixed_shape_and_range() {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(256, 256, Rgb([255, 0, 0]));
        let bytes = encode_rgb_png(&img);

        let input = normalize(&bytes).unwrap();

        assert_eq!(input.shape(), &[1, 64, 64, 3]);
        assert!(input.iter().all(|&v| (0.0..=1.0).contains(&v)));
        // constant red image stays constant through resizing
        assert_eq!(input[[0, 0, 0, 0]], 1.0);
        assert_eq!(input[[0, 0, 0, 1]], 0.0);
        assert_eq!(input[[0, 0, 0, 2]], 0.0);
    }

    #[test]
    fn test_non_square_image_is_squashed_not_letterboxed() {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(320, 100, Rgb([10, 20, 30]));
        let bytes = encode_rgb_png(&img);

        let input = normalize(&bytes).unwrap();

        assert_eq!(input.shape(), &[1, 64, 64, 3]);
    }

    #[test]
    fn test_grayscale_channels_are_replicated() {
        let img = ImageBuffer::<Luma<u8>, Vec<u8>>::from_fn(128, 128, |x, y| {
            Luma([((x + y) % 256) as u8])
        });
        let bytes = encode_gray_png(&img);

        let input = normalize(&bytes).unwrap();

        for y in 0..64 {
            for x in 0..64 {
                let r = input[[0, y, x, 0]];
                assert_eq!(r, input[[0, y, x, 1]]);
                assert_eq!(r, input[[0, y, x, 2]]);
            }
        }
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_fn(90, 70, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
        });
        let bytes = encode_rgb_png(&img);

        let first = normalize(&bytes).unwrap();
        let second = normalize(&bytes).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_bytes_fail_without_panicking() {
        let result = normalize(b"definitely not an image");
        assert!(result.is_err());

        let result = normalize(&[]);
        assert!(result.is_err());
    }
}
