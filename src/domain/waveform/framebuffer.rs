//! Monochrome framebuffer for waveform drawing

/// Cell drawn for a lit pixel when rendering to text
const LIT: char = '█';
/// Cell drawn for an unlit pixel when rendering to text
const UNLIT: char = ' ';

/// A point in framebuffer coordinates (x right, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Fixed-size grid of on/off cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Framebuffer {
    /// Create a cleared framebuffer; dimensions are at least 1x1
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    pub fn is_blank(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Light one cell; coordinates outside the grid are ignored
    pub fn set(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = true;
        }
    }

    /// Draw a straight segment with Bresenham's algorithm
    pub fn draw_line(&mut self, from: Point, to: Point) {
        let (mut x0, mut y0) = self.to_cell(from);
        let (x1, y1) = self.to_cell(to);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.set(x0, y0);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Draw a connected line through all points
    pub fn stroke(&mut self, points: &[Point]) {
        match points {
            [] => {}
            [only] => {
                let (x, y) = self.to_cell(*only);
                self.set(x, y);
            }
            _ => {
                for pair in points.windows(2) {
                    self.draw_line(pair[0], pair[1]);
                }
            }
        }
    }

    /// One string per row, top to bottom
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|&c| if c { LIT } else { UNLIT }).collect())
            .collect()
    }

    fn to_cell(&self, p: Point) -> (i64, i64) {
        let clamp = |v: f32, max: usize| {
            if v.is_finite() {
                (v.round() as i64).clamp(0, max as i64 - 1)
            } else {
                0
            }
        };
        (clamp(p.x, self.width), clamp(p.y, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_framebuffer_is_blank() {
        let fb = Framebuffer::new(8, 4);
        assert!(fb.is_blank());
        assert_eq!(fb.rows().len(), 4);
        assert!(fb.rows().iter().all(|r| r.chars().count() == 8));
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        let fb = Framebuffer::new(0, 0);
        assert_eq!((fb.width(), fb.height()), (1, 1));
    }

    #[test]
    fn horizontal_line_fills_row() {
        let mut fb = Framebuffer::new(10, 3);
        fb.draw_line(Point::new(0.0, 1.0), Point::new(9.0, 1.0));
        assert!((0..10).all(|x| fb.is_set(x, 1)));
        assert!((0..10).all(|x| !fb.is_set(x, 0) && !fb.is_set(x, 2)));
    }

    #[test]
    fn diagonal_line_is_connected() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw_line(Point::new(0.0, 0.0), Point::new(3.0, 3.0));
        for i in 0..4 {
            assert!(fb.is_set(i, i));
        }
    }

    #[test]
    fn out_of_range_points_are_clamped() {
        let mut fb = Framebuffer::new(4, 4);
        fb.stroke(&[Point::new(-10.0, 50.0)]);
        assert!(fb.is_set(0, 3));
        fb.stroke(&[Point::new(f32::NAN, 1.0)]);
        assert!(fb.is_set(0, 1));
    }

    #[test]
    fn clear_resets_cells() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set(1, 1);
        assert!(!fb.is_blank());
        fb.clear();
        assert!(fb.is_blank());
    }
}
