//! Pure calculation functions for thumbnail geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Rectangle, in destination coordinates, that a source image is drawn into.
///
/// Coordinates are fractional; the renderer rounds them when it places pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fit a source image inside a destination box, centered.
///
/// The source is scaled down (never up) by the larger of the two ratios
/// `src_w / dst_w` and `src_h / dst_h`, so the whole image stays visible and
/// the aspect ratio is preserved. A source that already fits is kept at its
/// own size and only centered.
///
/// # Examples
/// ```
/// # use thumbdrop::imaging::{Fit, compute_fit};
/// // 300x150 into 150x150: width-limited, halved, centered vertically
/// assert_eq!(
///     compute_fit(300, 150, 150, 150),
///     Fit { x: 0.0, y: 37.5, width: 150.0, height: 75.0 }
/// );
///
/// // 100x50 already fits: unscaled, only centered
/// assert_eq!(
///     compute_fit(100, 50, 150, 150),
///     Fit { x: 25.0, y: 50.0, width: 100.0, height: 50.0 }
/// );
/// ```
pub fn compute_fit(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Fit {
    let (src_w, src_h) = (src_w as f64, src_h as f64);
    let (dst_w, dst_h) = (dst_w as f64, dst_h as f64);

    let max_ratio = (src_w / dst_w).max(src_h / dst_h);

    let (width, height) = if max_ratio > 1.0 {
        (src_w / max_ratio, src_h / max_ratio)
    } else {
        (src_w, src_h)
    };

    Fit {
        x: (dst_w - width) / 2.0,
        y: (dst_h - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn landscape_is_width_limited() {
        // 1600x900 → 150 wide, 84.375 high
        let fit = compute_fit(1600, 900, 150, 150);
        assert!((fit.width - 150.0).abs() < EPS);
        assert!((fit.height - 84.375).abs() < EPS);
        assert!((fit.x - 0.0).abs() < EPS);
        assert!((fit.y - 32.8125).abs() < EPS);
    }

    #[test]
    fn portrait_is_height_limited() {
        // 600x1200 → 75x150
        let fit = compute_fit(600, 1200, 150, 150);
        assert_eq!(
            fit,
            Fit {
                x: 37.5,
                y: 0.0,
                width: 75.0,
                height: 150.0
            }
        );
    }

    #[test]
    fn square_into_square_fills_box() {
        let fit = compute_fit(500, 500, 150, 150);
        assert_eq!(
            fit,
            Fit {
                x: 0.0,
                y: 0.0,
                width: 150.0,
                height: 150.0
            }
        );
    }

    #[test]
    fn exact_size_is_untouched() {
        let fit = compute_fit(150, 150, 150, 150);
        assert_eq!(fit.width, 150.0);
        assert_eq!(fit.height, 150.0);
        assert_eq!((fit.x, fit.y), (0.0, 0.0));
    }

    #[test]
    fn smaller_source_is_never_upscaled() {
        let fit = compute_fit(40, 20, 150, 150);
        assert_eq!(fit.width, 40.0);
        assert_eq!(fit.height, 20.0);
        assert_eq!(fit.x, 55.0);
        assert_eq!(fit.y, 65.0);
    }

    #[test]
    fn one_side_larger_still_scales() {
        // wide strip: 300x10 into 150x150 → halved
        let fit = compute_fit(300, 10, 150, 150);
        assert_eq!(fit.width, 150.0);
        assert_eq!(fit.height, 5.0);
    }

    #[test]
    fn non_square_destination() {
        // 400x300 into 200x100 → height-limited (3.0 > 2.0)
        let fit = compute_fit(400, 300, 200, 100);
        assert!((fit.height - 100.0).abs() < EPS);
        assert!((fit.width - 400.0 / 3.0).abs() < EPS);
        assert!((fit.x - (200.0 - 400.0 / 3.0) / 2.0).abs() < EPS);
        assert_eq!(fit.y, 0.0);
    }

    #[test]
    fn fits_inside_preserves_aspect_and_centers() {
        let sources = [1, 7, 64, 149, 150, 151, 333, 1024, 4000];
        let dests = [(150, 150), (200, 100), (64, 256)];

        for &(dst_w, dst_h) in &dests {
            for &src_w in &sources {
                for &src_h in &sources {
                    let fit = compute_fit(src_w, src_h, dst_w, dst_h);

                    assert!(fit.width <= dst_w as f64 + EPS, "{src_w}x{src_h}");
                    assert!(fit.height <= dst_h as f64 + EPS, "{src_w}x{src_h}");

                    let src_aspect = src_w as f64 / src_h as f64;
                    let fit_aspect = fit.width / fit.height;
                    assert!(
                        (src_aspect - fit_aspect).abs() / src_aspect < 1e-6,
                        "aspect drift for {src_w}x{src_h}"
                    );

                    assert!((fit.x - (dst_w as f64 - fit.width) / 2.0).abs() < EPS);
                    assert!((fit.y - (dst_h as f64 - fit.height) / 2.0).abs() < EPS);

                    if src_w <= dst_w && src_h <= dst_h {
                        assert_eq!(fit.width, src_w as f64);
                        assert_eq!(fit.height, src_h as f64);
                    }
                }
            }
        }
    }
}
