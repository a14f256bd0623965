//! Axis-aligned bounding box with the collision-clipping primitives the
//! movement simulation is built on.
//!
//! The clip methods mirror the engine's per-axis collision resolution: a
//! movement component is shortened so the moving box stops flush against the
//! clipping box, with a small contact epsilon so boxes never end up exactly
//! touching (which would re-collide next tick).

use crate::math::Vector3;

/// Contact epsilon left between boxes after clipping.
const CLIP_EPSILON: f64 = 1.0e-7;

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vector3<f64>,
    /// Maximum corner.
    pub max: Vector3<f64>,
}

impl Aabb {
    /// Creates a box from two corners. Components are sorted so the result is
    /// well-formed regardless of argument order.
    #[must_use]
    pub fn new(a: Vector3<f64>, b: Vector3<f64>) -> Self {
        Self {
            min: Vector3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vector3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// A player-style box: `base` is the bottom-center, `half_width` the
    /// horizontal half-extent, `height` the full height.
    #[must_use]
    pub fn from_base(base: Vector3<f64>, half_width: f64, height: f64) -> Self {
        Self {
            min: Vector3::new(base.x - half_width, base.y, base.z - half_width),
            max: Vector3::new(base.x + half_width, base.y + height, base.z + half_width),
        }
    }

    /// The unit cube for the block at the given integer coordinates.
    #[must_use]
    pub fn unit_block(x: i32, y: i32, z: i32) -> Self {
        Self {
            min: Vector3::new(f64::from(x), f64::from(y), f64::from(z)),
            max: Vector3::new(f64::from(x) + 1.0, f64::from(y) + 1.0, f64::from(z) + 1.0),
        }
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Vector3<f64> {
        (self.min + self.max) * 0.5
    }

    /// Volume of the box.
    #[must_use]
    pub fn volume(&self) -> f64 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y) * (self.max.z - self.min.z)
    }

    /// Whether the point lies inside or on the surface of the box.
    #[must_use]
    pub fn contains(&self, p: &Vector3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Whether two boxes overlap on all three axes.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// The point on (or in) the box closest to `p`. Returns `p` unchanged if
    /// `p` is inside the box.
    #[must_use]
    pub fn closest_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Distance from `p` to the box surface; zero iff `p` is inside.
    #[must_use]
    pub fn distance_to_point(&self, p: &Vector3<f64>) -> f64 {
        self.closest_point(p).distance(p)
    }

    /// Box grown by `amount` on every face. Negative amounts shrink.
    #[must_use]
    pub fn grow(&self, amount: f64) -> Self {
        self.grow_xyz(amount, amount, amount)
    }

    /// Box grown per-axis on both faces of each axis.
    #[must_use]
    pub fn grow_xyz(&self, x: f64, y: f64, z: f64) -> Self {
        Self {
            min: Vector3::new(self.min.x - x, self.min.y - y, self.min.z - z),
            max: Vector3::new(self.max.x + x, self.max.y + y, self.max.z + z),
        }
    }

    /// Box shrunk by `amount` on every face.
    #[must_use]
    pub fn shrink(&self, amount: f64) -> Self {
        self.grow(-amount)
    }

    /// Box translated by a delta.
    #[must_use]
    pub fn offset(&self, d: Vector3<f64>) -> Self {
        Self {
            min: self.min + d,
            max: self.max + d,
        }
    }

    /// Box swept along a movement vector: each face is pushed outward in the
    /// direction of travel. Used to gather candidate collision blocks.
    #[must_use]
    pub fn expand_towards(&self, d: Vector3<f64>) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        if d.x < 0.0 {
            min.x += d.x;
        } else {
            max.x += d.x;
        }
        if d.y < 0.0 {
            min.y += d.y;
        } else {
            max.y += d.y;
        }
        if d.z < 0.0 {
            min.z += d.z;
        } else {
            max.z += d.z;
        }
        Self { min, max }
    }

    /// Clips a Y movement of `dy` for `moving` against this box. Returns the
    /// shortened component, or `dy` unchanged when the boxes cannot meet.
    #[must_use]
    pub fn clip_y_collide(&self, moving: &Self, dy: f64) -> f64 {
        if moving.max.x <= self.min.x || moving.min.x >= self.max.x {
            return dy;
        }
        if moving.max.z <= self.min.z || moving.min.z >= self.max.z {
            return dy;
        }
        if dy > 0.0 && moving.max.y <= self.min.y {
            let gap = self.min.y - moving.max.y - CLIP_EPSILON;
            if gap < dy {
                return gap;
            }
        }
        if dy < 0.0 && moving.min.y >= self.max.y {
            let gap = self.max.y - moving.min.y + CLIP_EPSILON;
            if gap > dy {
                return gap;
            }
        }
        dy
    }

    /// Clips an X movement of `dx` for `moving` against this box.
    #[must_use]
    pub fn clip_x_collide(&self, moving: &Self, dx: f64) -> f64 {
        if moving.max.y <= self.min.y || moving.min.y >= self.max.y {
            return dx;
        }
        if moving.max.z <= self.min.z || moving.min.z >= self.max.z {
            return dx;
        }
        if dx > 0.0 && moving.max.x <= self.min.x {
            let gap = self.min.x - moving.max.x - CLIP_EPSILON;
            if gap < dx {
                return gap;
            }
        }
        if dx < 0.0 && moving.min.x >= self.max.x {
            let gap = self.max.x - moving.min.x + CLIP_EPSILON;
            if gap > dx {
                return gap;
            }
        }
        dx
    }

    /// Clips a Z movement of `dz` for `moving` against this box.
    #[must_use]
    pub fn clip_z_collide(&self, moving: &Self, dz: f64) -> f64 {
        if moving.max.x <= self.min.x || moving.min.x >= self.max.x {
            return dz;
        }
        if moving.max.y <= self.min.y || moving.min.y >= self.max.y {
            return dz;
        }
        if dz > 0.0 && moving.max.z <= self.min.z {
            let gap = self.min.z - moving.max.z - CLIP_EPSILON;
            if gap < dz {
                return gap;
            }
        }
        if dz < 0.0 && moving.min.z >= self.max.z {
            let gap = self.max.z - moving.min.z + CLIP_EPSILON;
            if gap > dz {
                return gap;
            }
        }
        dz
    }

    /// Distance along a ray to the nearest intersection with the box, by the
    /// slab method. `direction` does not need to be normalized; the returned
    /// distance is in units of its length. Returns `None` when the ray misses
    /// or the box lies entirely behind the origin.
    #[must_use]
    pub fn ray_distance(&self, origin: &Vector3<f64>, direction: &Vector3<f64>) -> Option<f64> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for (o, d, lo, hi) in [
            (origin.x, direction.x, self.min.x, self.max.x),
            (origin.y, direction.y, self.min.y, self.max.y),
            (origin.z, direction.z, self.min.z, self.max.z),
        ] {
            if d.abs() < 1.0e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = ((lo - o) * inv, (hi - o) * inv);
            t_min = t_min.max(t0.min(t1));
            t_max = t_max.min(t0.max(t1));
        }

        if t_max < t_min || t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::unit_block(0, 0, 0)
    }

    #[test]
    fn closest_point_inside_is_identity() {
        let p = Vector3::new(0.5, 0.5, 0.5);
        assert_eq!(unit().closest_point(&p), p);
        assert!(unit().distance_to_point(&p).abs() < 1e-12);
    }

    #[test]
    fn closest_point_outside_lands_on_surface() {
        let p = Vector3::new(2.0, 0.5, 0.5);
        let c = unit().closest_point(&p);
        assert_eq!(c, Vector3::new(1.0, 0.5, 0.5));
        assert!((unit().distance_to_point(&p) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ray_at_center_hits() {
        let origin = Vector3::new(0.5, 0.5, -2.0);
        let dir = Vector3::new(0.0, 0.0, 1.0);
        let d = unit().ray_distance(&origin, &dir);
        assert!(d.is_some_and(|d| (d - 2.0).abs() < 1e-9));
    }

    #[test]
    fn ray_pointing_away_misses() {
        let origin = Vector3::new(0.5, 0.5, -2.0);
        let dir = Vector3::new(0.0, 0.0, -1.0);
        assert!(unit().ray_distance(&origin, &dir).is_none());
    }

    #[test]
    fn clip_y_stops_fall_on_surface() {
        let floor = unit();
        let player = Aabb::from_base(Vector3::new(0.5, 1.5, 0.5), 0.3, 1.8);
        let dy = floor.clip_y_collide(&player, -1.0);
        assert!(dy > -1.0);
        assert!((dy - (-0.5 + CLIP_EPSILON)).abs() < 1e-9);
    }

    #[test]
    fn clip_x_ignores_non_overlapping_heights() {
        let block = unit();
        let player = Aabb::from_base(Vector3::new(-1.0, 5.0, 0.5), 0.3, 1.8);
        assert!((block.clip_x_collide(&player, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn expand_towards_covers_swept_volume() {
        let swept = unit().expand_towards(Vector3::new(-0.5, 0.25, 0.0));
        assert!((swept.min.x - (-0.5)).abs() < 1e-12);
        assert!((swept.max.y - 1.25).abs() < 1e-12);
        assert!((swept.max.x - 1.0).abs() < 1e-12);
    }
}
