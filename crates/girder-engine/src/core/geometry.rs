use glam::Vec2;

/// Position, size and rotation of an entity, with the edge queries the rules
/// need. Y points up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub center: Vec2,
    pub size: Vec2,
    pub angle: f32,
}

impl Footprint {
    pub fn new(center: Vec2, size: Vec2, angle: f32) -> Self {
        Self { center, size, angle }
    }

    /// Half extents of the axis-aligned box enclosing the rotated shape.
    pub fn half_extents(&self) -> Vec2 {
        let half = self.size * 0.5;
        let (sin, cos) = self.angle.sin_cos();
        Vec2::new(
            half.x * cos.abs() + half.y * sin.abs(),
            half.x * sin.abs() + half.y * cos.abs(),
        )
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_extents().x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_extents().x
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_extents().y
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.half_extents().y
    }

    /// Height of the upper surface at `x`, or `None` when `x` is past either
    /// end. Follows the slope of a rotated rectangle.
    pub fn top_at(&self, x: f32) -> Option<f32> {
        if x < self.left() || x > self.right() {
            return None;
        }
        let cos = self.angle.cos();
        if cos.abs() < 1e-3 {
            return Some(self.top());
        }
        let slope = self.angle.tan();
        Some(self.center.y + (x - self.center.x) * slope + self.size.y * 0.5 / cos.abs())
    }

    /// Whether the horizontal spans overlap.
    pub fn overlaps_x(&self, other: &Footprint) -> bool {
        self.left() < other.right() && other.left() < self.right()
    }

    /// Whether the vertical spans overlap, counting touching within `tolerance`.
    pub fn overlaps_y(&self, other: &Footprint, tolerance: f32) -> bool {
        self.bottom() <= other.top() + tolerance && other.bottom() <= self.top() + tolerance
    }

    /// Whether the bounding boxes overlap.
    pub fn overlaps(&self, other: &Footprint) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other, 0.0)
    }

    /// Whether this footprint's bottom edge sits on `surface`'s top edge:
    /// horizontally overlapping, and the bottom within `tolerance` of the
    /// surface height under the closest overlapping x.
    pub fn rests_on(&self, surface: &Footprint, tolerance: f32) -> bool {
        if !self.overlaps_x(surface) {
            return false;
        }
        let x = self.center.x.clamp(surface.left(), surface.right());
        surface
            .top_at(x)
            .map(|top| (self.bottom() - top).abs() <= tolerance)
            .unwrap_or(false)
    }

    /// Whether `x` is within the horizontal span.
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.left() && x <= self.right()
    }

    /// Vertical midpoint.
    pub fn mid_y(&self) -> f32 {
        self.center.y
    }
}
