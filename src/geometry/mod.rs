//! Axis-aligned rectangles and overlap measures.
//!
//! `Rect` uses integer pixel coordinates with an exclusive right/bottom edge,
//! so `Rect::new(0, 0, 2, 2)` covers the four pixels `(0..2, 0..2)`. Areas are
//! widened to `i64` before multiplying.

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from exclusive corner coordinates.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Returns true when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Pixel area; zero for empty or inverted rectangles.
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        self.width as i64 * self.height as i64
    }

    /// Returns the overlap of two rectangles, or `Rect::default()` if disjoint.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 as i64 || y1 <= y0 as i64 || self.is_empty() || other.is_empty() {
            return Rect::default();
        }
        // Both extents are bounded by an i32 width, so they fit back into i32.
        Rect::new(x0, y0, (x1 - x0 as i64) as i32, (y1 - y0 as i64) as i32)
    }

    /// Area covered by either rectangle.
    pub fn union_area(&self, other: &Rect) -> i64 {
        self.area() + other.area() - self.intersection(other).area()
    }
}

/// Intersection over union of two rectangles.
///
/// Returns a value in `[0, 1]`. Two rectangles whose union is empty (both
/// zero-area) have no meaningful overlap ratio and yield `0.0`.
pub fn iou(a: &Rect, b: &Rect) -> f32 {
    let inter = a.intersection(b).area();
    let union = a.area() + b.area() - inter;
    if union <= 0 {
        return 0.0;
    }
    (inter as f64 / union as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::{iou, Rect};

    #[test]
    fn intersection_of_disjoint_rects_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert_eq!(a.intersection(&b), Rect::default());
        assert_eq!(a.union_area(&b), 200);
    }

    #[test]
    fn intersection_matches_overlap() {
        let a = Rect::new(21, 27, 110, 150);
        let b = Rect::new(53, 56, 108, 152);
        assert_eq!(a.intersection(&b), Rect::new(53, 56, 78, 121));
    }

    #[test]
    fn inverted_rect_has_zero_area() {
        let r = Rect::new(5, 5, -3, 4);
        assert!(r.is_empty());
        assert_eq!(r.area(), 0);
    }

    #[test]
    fn iou_of_zero_area_pair_is_zero() {
        let a = Rect::new(0, 0, 0, 0);
        let b = Rect::new(3, 3, 0, 5);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn from_corners_uses_exclusive_edges() {
        let r = Rect::from_corners(2, 3, 7, 11);
        assert_eq!(r, Rect::new(2, 3, 5, 8));
        assert_eq!(r.right(), 7);
        assert_eq!(r.bottom(), 11);
    }
}
