use image::RgbImage;
use vidthumb_core::frame::VideoFrame;

/// Assert that an image fits a `size` box and touches it on its longer side.
pub fn assert_fits_square(image: &RgbImage, size: u32) {
    let (w, h) = image.dimensions();
    assert!(w <= size && h <= size, "{w}x{h} does not fit in {size}x{size}");
    assert_eq!(w.max(h), size, "longer side of {w}x{h} should be {size}");
}

/// Assert that an image has the aspect ratio `ratio` within `tolerance`.
pub fn assert_aspect_ratio(image: &RgbImage, ratio: f64, tolerance: f64) {
    let (w, h) = image.dimensions();
    let actual = w as f64 / h as f64;
    assert!(
        (actual - ratio).abs() < tolerance,
        "aspect ratio of {w}x{h} is {actual:.3}, expected {ratio:.3} (tolerance {tolerance:.3})"
    );
}

/// Assert that every image row equals the visible prefix of the frame row.
pub fn assert_image_matches_frame(image: &RgbImage, frame: &VideoFrame) {
    assert_eq!(image.dimensions(), (frame.width, frame.height));
    let row_bytes = frame.row_bytes();
    for (y, row) in image.as_raw().chunks_exact(row_bytes).enumerate() {
        assert_eq!(row, frame.row(y), "row {y} differs from frame");
    }
}

/// Assert that an image is not one flat colour.
pub fn assert_not_uniform(image: &RgbImage) {
    let first = image.get_pixel(0, 0);
    assert!(
        image.pixels().any(|p| p != first),
        "image is a single colour {first:?}"
    );
}
