//! Workspace geometry: points, axis-aligned boxes and component footprints.

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::units::{self, Length, QuantityText};
use crate::{Tolerances, nearly_equal};

/// A 2D point on the workspace plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Default for Point {
    fn default() -> Self {
        Self::new(units::m(0.0), units::m(0.0))
    }
}

impl Point {
    pub fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    /// Point from millimetre coordinates.
    pub fn mm(x: f64, y: f64) -> Self {
        Self::new(units::mm(x), units::mm(y))
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn distance(&self, other: &Point) -> Length {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        units::mm(units::length_mm(dx).hypot(units::length_mm(dy)))
    }

    /// Coordinate-wise comparison in millimetres.
    pub fn approx_eq(&self, other: &Point, tol: Tolerances) -> bool {
        nearly_equal(units::length_mm(self.x), units::length_mm(other.x), tol)
            && nearly_equal(units::length_mm(self.y), units::length_mm(other.y), tol)
    }

    fn min_with(self, other: Point) -> Point {
        Point::new(
            if other.x < self.x { other.x } else { self.x },
            if other.y < self.y { other.y } else { self.y },
        )
    }

    fn max_with(self, other: Point) -> Point {
        Point::new(
            if other.x > self.x { other.x } else { self.x },
            if other.y > self.y { other.y } else { self.y },
        )
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        *self = *self - rhs;
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

// Persisted as a two-element array of length text, e.g. `["12.5mm", "3mm"]`.
impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [units::format_length(self.x), units::format_length(self.y)].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y] = <[QuantityText; 2]>::deserialize(deserializer)?;
        let x = x.to_length().map_err(serde::de::Error::custom)?;
        let y = y.to_length().map_err(serde::de::Error::custom)?;
        Ok(Point::new(x, y))
    }
}

/// Axis-aligned bounding box. `min` is component-wise <= `max`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: a.min_with(b),
            max: a.max_with(b),
        }
    }

    /// Degenerate box containing exactly `p`.
    pub fn at(p: Point) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Aabb::at(*iter.next()?);
        for p in iter {
            bounds.expand(*p);
        }
        Some(bounds)
    }

    /// Grow this box so that it contains `p`.
    pub fn expand(&mut self, p: Point) {
        self.min = self.min.min_with(p);
        self.max = self.max.max_with(p);
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        self.min.x <= p.x && self.min.y <= p.y && self.max.x >= p.x && self.max.y >= p.y
    }

    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    pub fn width(&self) -> Length {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Length {
        self.max.y - self.min.y
    }
}

impl Add<Point> for Aabb {
    type Output = Aabb;

    fn add(self, offset: Point) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Outline of a component on the workspace: an ordered list of points, each
/// connected to the one before it, with its bounding box derived on creation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Footprint {
    points: Vec<Point>,
    bounds: Aabb,
}

impl Footprint {
    pub fn new(points: Vec<Point>) -> Self {
        let bounds = Aabb::enclosing(&points).unwrap_or_default();
        Self { points, bounds }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn aabb(&self) -> &Aabb {
        &self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Serialize for Footprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.points.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Footprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Point>::deserialize(deserializer).map(Footprint::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::mm(1.0, 2.0);
        let b = Point::mm(0.5, -1.0);
        assert!((a + b).approx_eq(&Point::mm(1.5, 1.0), Tolerances::default()));
        assert!((a - b).approx_eq(&Point::mm(0.5, 3.0), Tolerances::default()));
        assert!((-a).approx_eq(&Point::mm(-1.0, -2.0), Tolerances::default()));
    }

    #[test]
    fn point_distance() {
        let d = Point::mm(0.0, 0.0).distance(&Point::mm(3.0, 4.0));
        assert!(nearly_equal(units::length_mm(d), 5.0, Tolerances::default()));
    }

    #[test]
    fn point_json_accepts_units_and_numbers() {
        let p: Point = serde_json::from_str(r#"["10mm", 0.02]"#).unwrap();
        assert!(p.approx_eq(&Point::mm(10.0, 20.0), Tolerances::default()));

        let text = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&text).unwrap();
        assert!(back.approx_eq(&p, Tolerances::default()));
    }

    #[test]
    fn point_json_rejects_bad_unit() {
        assert!(serde_json::from_str::<Point>(r#"["10 furlongs", "1mm"]"#).is_err());
        assert!(serde_json::from_str::<Point>(r#"["10mm"]"#).is_err());
    }

    #[test]
    fn aabb_expand_and_contains() {
        let mut bounds = Aabb::at(Point::mm(0.0, 0.0));
        bounds.expand(Point::mm(4.0, -2.0));
        bounds.expand(Point::mm(-1.0, 3.0));
        assert_eq!(bounds.min, Point::mm(-1.0, -2.0));
        assert_eq!(bounds.max, Point::mm(4.0, 3.0));
        assert!(bounds.contains_point(&Point::mm(0.0, 0.0)));
        assert!(!bounds.contains_point(&Point::mm(5.0, 0.0)));
        assert!(bounds.contains(&Aabb::new(Point::mm(0.0, 0.0), Point::mm(1.0, 1.0))));
    }

    #[test]
    fn aabb_offset() {
        let shifted = Aabb::new(Point::mm(0.0, 0.0), Point::mm(2.0, 1.0)) + Point::mm(10.0, 10.0);
        assert!(shifted.min.approx_eq(&Point::mm(10.0, 10.0), Tolerances::default()));
        assert!(shifted.max.approx_eq(&Point::mm(12.0, 11.0), Tolerances::default()));
    }

    #[test]
    fn footprint_derives_bounds() {
        let fp: Footprint =
            serde_json::from_str(r#"[["0mm","0mm"],["20mm","0mm"],["20mm","10mm"],["0mm","10mm"]]"#)
                .unwrap();
        assert_eq!(fp.points().len(), 4);
        assert!(fp.aabb().max.approx_eq(&Point::mm(20.0, 10.0), Tolerances::default()));
        assert!(Footprint::default().is_empty());
    }
}
