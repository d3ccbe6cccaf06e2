use image::RgbImage;
use pic_scale_safe::ImageSize;

use crate::{
    crop_err,
    error::{CropError, ErrorKind},
    filter::Filter,
};

/// Resamples opaque RGB pixels to exactly `dst_width × dst_height`.
pub fn resize(
    image: &RgbImage,
    dst_width: u32,
    dst_height: u32,
    filter: Filter,
) -> Result<RgbImage, CropError> {
    if image.width() == dst_width && image.height() == dst_height {
        return Ok(image.clone());
    }
    if dst_width == 0 || dst_height == 0 || image.width() == 0 || image.height() == 0 {
        return Err(crop_err!(
            ErrorKind::Encode,
            "cannot resize {}x{} to {dst_width}x{dst_height}",
            image.width(),
            image.height()
        ));
    }

    let src_size = ImageSize::new(image.width() as usize, image.height() as usize);
    let dst_size = ImageSize::new(dst_width as usize, dst_height as usize);
    let resized = pic_scale_safe::resize_rgb8(
        image.as_raw(),
        src_size,
        dst_size,
        filter.into_resampling(),
    )
    .map_err(|e| crop_err!(ErrorKind::Encode, "resize failed: {e:?}"))?;

    RgbImage::from_raw(dst_width, dst_height, resized).ok_or_else(|| {
        crop_err!(
            ErrorKind::Encode,
            "resizer returned a buffer of unexpected size for {dst_width}x{dst_height}"
        )
    })
}

/// Largest size that fits inside the optional maximum box without upscaling.
/// Never returns a zero dimension.
pub fn fit_within(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    if max_width.is_none() && max_height.is_none() {
        return (width, height);
    }
    let ratio_w = max_width.map_or(1.0, |m| m as f64 / width as f64);
    let ratio_h = max_height.map_or(1.0, |m| m as f64 / height as f64);
    let ratio = ratio_w.min(ratio_h).min(1.0);
    (
        ((width as f64 * ratio).round() as u32).max(1),
        ((height as f64 * ratio).round() as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_resize_constant_color_stays_constant() {
        let image = RgbImage::from_pixel(40, 20, Rgb([30, 160, 90]));
        let resized = resize(&image, 13, 7, Filter::Lanczos).unwrap();
        assert_eq!(resized.dimensions(), (13, 7));
        for pixel in resized.pixels() {
            for (got, want) in pixel.0.iter().zip([30u8, 160, 90]) {
                assert!(got.abs_diff(want) <= 1, "{pixel:?}");
            }
        }
    }

    #[test]
    fn test_resize_to_same_size_is_identity() {
        let image = RgbImage::from_fn(5, 3, |x, y| Rgb([x as u8, y as u8, 7]));
        assert_eq!(resize(&image, 5, 3, Filter::Point).unwrap(), image);
    }

    #[test]
    fn test_resize_to_zero_fails() {
        let image = RgbImage::new(5, 3);
        assert_eq!(
            resize(&image, 0, 3, Filter::Lanczos).unwrap_err().kind(),
            ErrorKind::Encode
        );
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(2400, 1800, Some(600), Some(600)), (600, 450));
        assert_eq!(fit_within(300, 200, Some(600), Some(600)), (300, 200));
        assert_eq!(fit_within(3000, 500, Some(1200), Some(600)), (1200, 200));
        assert_eq!(fit_within(5000, 1, Some(10), None), (10, 1));
        assert_eq!(fit_within(640, 480, None, None), (640, 480));
    }
}
