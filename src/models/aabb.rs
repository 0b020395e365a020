use crate::errors::PhysicsError;
use crate::models::Vector3;

/// Axis-aligned bounding box given by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3,
    pub max: Vector3,
}

impl Aabb {
    /// Creates a box from its corners.
    ///
    /// # Errors
    /// Returns `PhysicsError::InvalidBounds` if `min` exceeds `max` on any axis or a
    /// coordinate is not finite.
    pub fn new(min: Vector3, max: Vector3) -> Result<Self, PhysicsError> {
        if !min.is_finite() || !max.is_finite() || min.x > max.x || min.y > max.y || min.z > max.z {
            return Err(PhysicsError::InvalidBounds);
        }
        Ok(Aabb { min, max })
    }

    pub fn from_center_half_extents(center: Vector3, half_extents: Vector3) -> Self {
        let half = half_extents.abs();
        Aabb { min: center - half, max: center + half }
    }

    /// Smallest box containing every point; `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Vector3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (min.component_min(&p), max.component_max(&p))
        });
        Some(Aabb { min, max })
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vector3 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Separating-axis overlap test; touching faces count as overlapping.
    ///
    /// # Example
    /// ```
    /// use rs_rigid_body::models::{Aabb, Vector3};
    ///
    /// let a = Aabb::from_center_half_extents(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0));
    /// let b = Aabb::from_center_half_extents(Vector3::new(1.5, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
    /// let c = Aabb::from_center_half_extents(Vector3::new(5.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
    /// assert!(a.intersects(&b));
    /// assert!(!a.intersects(&c));
    /// ```
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
            self.min.y <= other.max.y && self.max.y >= other.min.y &&
            self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, p: &Vector3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
            p.y >= self.min.y && p.y <= self.max.y &&
            p.z >= self.min.z && p.z <= self.max.z
    }

    /// True if `other` lies entirely inside `self` (boundaries inclusive).
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.component_min(&other.min),
            max: self.max.component_max(&other.max),
        }
    }

    /// Grows the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Aabb {
        let m = Vector3::new(margin, margin, margin);
        Aabb { min: self.min - m, max: self.max + m }
    }

    /// One of the eight boxes obtained by splitting at the midpoint of every axis.
    ///
    /// Bit 0 of `index` selects the upper x half, bit 1 upper y, bit 2 upper z.
    pub fn octant(&self, index: usize) -> Aabb {
        let c = self.center();
        let pick = |bit: usize, lo: f64, mid: f64, hi: f64| {
            if index & bit != 0 { (mid, hi) } else { (lo, mid) }
        };
        let (x0, x1) = pick(1, self.min.x, c.x, self.max.x);
        let (y0, y1) = pick(2, self.min.y, c.y, self.max.y);
        let (z0, z1) = pick(4, self.min.z, c.z, self.max.z);
        Aabb { min: Vector3::new(x0, y0, z0), max: Vector3::new(x1, y1, z1) }
    }

    pub fn closest_point(&self, p: &Vector3) -> Vector3 {
        Vector3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Zero when `p` is inside the box.
    pub fn distance_squared_to_point(&self, p: &Vector3) -> f64 {
        (self.closest_point(p) - *p).length_squared()
    }

    pub fn intersects_sphere(&self, center: &Vector3, radius: f64) -> bool {
        self.distance_squared_to_point(center) <= radius * radius
    }

    /// The eight corner points.
    pub fn corners(&self) -> [Vector3; 8] {
        let mut corners = [Vector3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vector3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            );
        }
        corners
    }
}
