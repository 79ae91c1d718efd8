//! Time-domain waveform rendering

use super::framebuffer::{Framebuffer, Point};

/// Map samples in `-1.0..=1.0` to a polyline spanning `width` x `height`.
///
/// Sample `i` lands at `x = i * (width - 1) / (n - 1)`; its value is an
/// offset from the horizontal centerline, positive values drawn upwards.
/// Out-of-range and non-finite samples are clamped to the edges / center.
pub fn waveform_points(samples: &[f32], width: usize, height: usize) -> Vec<Point> {
    let n = samples.len();
    if n == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let center = (height - 1) as f32 / 2.0;
    let step = if n > 1 {
        (width - 1) as f32 / (n - 1) as f32
    } else {
        0.0
    };

    samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let s = if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 };
            Point::new(i as f32 * step, center - s * center)
        })
        .collect()
}

/// Redraw the framebuffer from one sample window.
///
/// With no window the framebuffer is only cleared. Returns whether a
/// waveform was drawn.
pub fn render_waveform(framebuffer: &mut Framebuffer, samples: Option<&[f32]>) -> bool {
    framebuffer.clear();
    match samples {
        Some(window) if !window.is_empty() => {
            let points =
                waveform_points(window, framebuffer.width(), framebuffer.height());
            framebuffer.stroke(&points);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_zero_window_draws_centerline() {
        let mut fb = Framebuffer::new(32, 9);
        let drawn = render_waveform(&mut fb, Some(&[0.0; 1024]));
        assert!(drawn);
        for y in 0..9 {
            for x in 0..32 {
                assert_eq!(fb.is_set(x, y), y == 4, "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn no_source_clears_without_drawing() {
        let mut fb = Framebuffer::new(8, 5);
        fb.set(2, 2);
        assert!(!render_waveform(&mut fb, None));
        assert!(fb.is_blank());
        assert!(!render_waveform(&mut fb, Some(&[])));
        assert!(fb.is_blank());
    }

    #[test]
    fn extremes_reach_top_and_bottom() {
        let points = waveform_points(&[1.0, -1.0], 10, 5);
        assert_eq!(points[0], Point::new(0.0, 0.0));
        assert_eq!(points[1], Point::new(9.0, 4.0));
    }

    #[test]
    fn points_span_full_width() {
        let points = waveform_points(&[0.0; 5], 9, 3);
        let xs: Vec<f32> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let points = waveform_points(&[4.0, f32::NAN, -7.0], 3, 5);
        assert_eq!(points[0].y, 0.0);
        assert_eq!(points[1].y, 2.0);
        assert_eq!(points[2].y, 4.0);
    }

    #[test]
    fn single_sample_draws_one_cell() {
        let mut fb = Framebuffer::new(4, 3);
        render_waveform(&mut fb, Some(&[0.0]));
        assert!(fb.is_set(0, 1));
        assert_eq!(fb.rows().concat().chars().filter(|&c| c != ' ').count(), 1);
    }
}
