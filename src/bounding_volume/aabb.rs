//! Axis Aligned Bounding Box.

use crate::bounding_volume::BoundingVolume;
use crate::math::{Point, Real, Vector};
use approx::{AbsDiffEq, RelativeEq};
use core::fmt;

/// An Axis-Aligned Bounding Box (AABB).
///
/// An AABB is defined by its minimum and maximum corners. Its edges are always parallel to
/// the coordinate axes, which makes merging two of them a simple component-wise min/max.
///
/// # Structure
///
/// - **mins**: the point with the smallest coordinates on each axis.
/// - **maxs**: the point with the largest coordinates on each axis.
/// - **Invariant**: `mins.x ≤ maxs.x`, `mins.y ≤ maxs.y` and `mins.z ≤ maxs.z`.
///
/// The invariant is expected but never checked: inverted or degenerate boxes are accepted
/// as-is by every operation of this crate.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "f32")] {
/// use simple_bvh3d::bounding_volume::{Aabb, BoundingVolume};
/// use nalgebra::Point3;
///
/// let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let b = Aabb::new(Point3::new(2.0, -1.0, 0.5), Point3::new(3.0, 0.5, 4.0));
/// let ab = a.merged(&b);
///
/// assert_eq!(ab.mins, Point3::new(0.0, -1.0, 0.0));
/// assert_eq!(ab.maxs, Point3::new(3.0, 1.0, 4.0));
/// assert!(ab.contains(&a) && ab.contains(&b));
/// # }
/// ```
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Aabb {
    /// The point with minimum coordinates.
    pub mins: Point<Real>,
    /// The point with maximum coordinates.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB from its minimum and maximum corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with inverted bounds.
    ///
    /// The resulting AABB has `mins` set to maximum values and `maxs` set to
    /// minimum values. Merging it with any other AABB yields that other AABB.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Creates a new AABB from its center and half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates a new AABB that tightly encloses a set of points.
    ///
    /// Returns [`Aabb::new_invalid`] if `pts` is empty.
    pub fn from_points<I>(pts: I) -> Self
    where
        I: IntoIterator<Item = Point<Real>>,
    {
        let mut result = Self::new_invalid();
        for pt in pts {
            result.take_point(pt);
        }
        result
    }

    /// Merges all the AABBs yielded by `aabbs`.
    ///
    /// The merge of an empty set is undefined so this returns `None` if `aabbs` is empty.
    ///
    /// ```rust
    /// # #[cfg(feature = "f32")] {
    /// use simple_bvh3d::bounding_volume::Aabb;
    /// use nalgebra::Point3;
    ///
    /// assert_eq!(Aabb::merge_all(&[] as &[Aabb]), None);
    ///
    /// let boxes = [
    ///     Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
    ///     Aabb::new(Point3::new(-1.0, 2.0, 0.0), Point3::new(0.0, 3.0, 1.0)),
    /// ];
    /// let merged = Aabb::merge_all(&boxes).unwrap();
    /// assert_eq!(merged.mins, Point3::new(-1.0, 0.0, 0.0));
    /// assert_eq!(merged.maxs, Point3::new(1.0, 3.0, 1.0));
    /// # }
    /// ```
    pub fn merge_all<'a, I>(aabbs: I) -> Option<Aabb>
    where
        I: IntoIterator<Item = &'a Aabb>,
    {
        let mut it = aabbs.into_iter();
        let first = *it.next()?;
        Some(it.fold(first, |acc, aabb| acc.merged(aabb)))
    }

    /// Returns the center point of this AABB.
    ///
    /// The center is the midpoint between `mins` and `maxs`.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// Returns the half-extents of this AABB, i.e., `(maxs - mins) / 2`.
    ///
    /// This does not depend on the position of the AABB, only on its size.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        let half: Real = na::convert::<f64, Real>(0.5);
        (self.maxs - self.mins) * half
    }

    /// The extents of this `Aabb`.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// The half area of this `Aabb`.
    pub fn half_area(&self) -> Real {
        let extents = self.extents();
        extents.x * (extents.y + extents.z) + extents.y * extents.z
    }

    /// Enlarges this `Aabb` so it also contains the point `pt`.
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }
}

impl BoundingVolume for Aabb {
    #[inline]
    fn center(&self) -> Point<Real> {
        self.center()
    }

    #[inline]
    fn contains(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.mins) && na::partial_ge(&self.maxs, &other.maxs)
    }

    #[inline]
    fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.inf(&other.mins);
        self.maxs = self.maxs.sup(&other.maxs);
    }

    #[inline]
    fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mins=({}, {}, {}), maxs=({}, {}, {}), half_area={}",
            self.mins.x,
            self.mins.y,
            self.mins.z,
            self.maxs.x,
            self.maxs.y,
            self.maxs.z,
            self.half_area()
        )
    }
}

impl AbsDiffEq for Aabb {
    type Epsilon = Real;

    #[inline]
    fn default_epsilon() -> Self::Epsilon {
        Real::default_epsilon()
    }

    #[inline]
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.mins.abs_diff_eq(&other.mins, epsilon) && self.maxs.abs_diff_eq(&other.maxs, epsilon)
    }
}

impl RelativeEq for Aabb {
    #[inline]
    fn default_max_relative() -> Self::Epsilon {
        Real::default_max_relative()
    }

    #[inline]
    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.mins.relative_eq(&other.mins, epsilon, max_relative)
            && self.maxs.relative_eq(&other.maxs, epsilon, max_relative)
    }
}
