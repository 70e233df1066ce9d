/// Axis-aligned rectangles and the two collision tests the game uses.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Rectangle whose bottom edge is centered on `(cx, bottom)`.
    pub fn from_midbottom(cx: f32, bottom: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, bottom - h, w, h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn centerx(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn centery(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.centerx(), self.centery())
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Strict overlap: rectangles that merely share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Circle test between two centers; touching circles count as a hit.
pub fn circles_collide(a: (f32, f32), ra: f32, b: (f32, f32), rb: f32) -> bool {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    let reach = ra + rb;
    dx * dx + dy * dy <= reach * reach
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_is_not_an_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.translated(-0.5, 0.0)));
    }

    #[test]
    fn contained_rect_overlaps_both_ways() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::from_center(50.0, 50.0, 4.0, 4.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn touching_circles_collide() {
        assert!(circles_collide((0.0, 0.0), 3.0, (5.0, 0.0), 2.0));
        assert!(!circles_collide((0.0, 0.0), 3.0, (5.1, 0.0), 2.0));
    }

    #[test]
    fn midbottom_places_bottom_edge() {
        let r = Rect::from_midbottom(400.0, 600.0, 50.0, 38.0);
        assert_eq!(r.bottom(), 600.0);
        assert_eq!(r.centerx(), 400.0);
        assert_eq!(r.left(), 375.0);
    }
}
