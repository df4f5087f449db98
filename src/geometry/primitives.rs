use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Move `amount` along `direction`.
    pub fn offset(self, direction: Point, amount: f32) -> Self {
        Self {
            x: self.x + direction.x * amount,
            y: self.y + direction.y * amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

/// Circular arc, angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    pub center: Point,
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    fn around(center: Point, radius: f32) -> Self {
        let r = radius.abs();
        Self {
            min: Point::new(center.x - r, center.y - r),
            max: Point::new(center.x + r, center.y + r),
        }
    }

    fn union(self, other: Self) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

/// All primitives produced for one stamp. May be empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternGeometry {
    pub lines: Vec<Line>,
    pub circles: Vec<Circle>,
    pub arcs: Vec<Arc>,
    pub polylines: Vec<Polyline>,
}

impl PatternGeometry {
    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }

    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.circles.len() + self.arcs.len() + self.polylines.len()
    }

    /// Append every primitive of `other`.
    pub fn extend(&mut self, other: PatternGeometry) {
        self.lines.extend(other.lines);
        self.circles.extend(other.circles);
        self.arcs.extend(other.arcs);
        self.polylines.extend(other.polylines);
    }

    /// Bounding box of all primitives; arcs count as full circles.
    pub fn bounds(&self) -> Option<Bounds> {
        let points = self
            .lines
            .iter()
            .flat_map(|l| [l.start, l.end])
            .chain(self.polylines.iter().flat_map(|p| p.points.iter().copied()))
            .map(|p| Bounds::around(p, 0.0));
        let round = self
            .circles
            .iter()
            .map(|c| Bounds::around(c.center, c.radius))
            .chain(self.arcs.iter().map(|a| Bounds::around(a.center, a.radius)));

        points.chain(round).reduce(Bounds::union)
    }
}
