use std::f64::consts::{PI, TAU};

use geo::Coord;
use serde::Serialize;

use crate::geom::{argmax_by, distance};

/// Direction in which a pivoting edge sweeps forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// Signed multiplier (-1 clockwise, +1 counter-clockwise).
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Rotation::Clockwise => -1.0,
            Rotation::CounterClockwise => 1.0,
        }
    }

    /// The opposite sweep direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
        }
    }

    /// Rotation implied by a signed angle; undefined and zero angles count as forward.
    #[inline]
    pub(crate) fn from_angle(angle: Option<f64>) -> Self {
        match angle {
            Some(a) if a < 0.0 => Rotation::Clockwise,
            _ => Rotation::CounterClockwise,
        }
    }
}

/// A directional descriptor for an advancing (or retreating) district edge.
///
/// Without a pivot the edge is a straight line through `origin`, perpendicular
/// to `direction`, and blocks are scored by their signed distance along
/// `direction`. With a pivot the edge rotates about `origin` and blocks are
/// scored by their signed angular offset from `direction`; the rotation sign
/// fixes which way round the ±π wrap counts as forward.
///
/// In both modes blocks behind the edge score at or below zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVector {
    pub origin: Coord<f64>,
    pub direction: Coord<f64>,
    pub pivot: Option<Rotation>,
}

impl Default for EdgeVector {
    fn default() -> Self {
        Self {
            origin: Coord { x: 0.0, y: 0.0 },
            direction: Coord { x: 0.0, y: 0.0 },
            pivot: None,
        }
    }
}

impl EdgeVector {
    /// Straight edge through `origin` advancing along `direction`.
    #[inline]
    pub fn new(origin: Coord<f64>, direction: Coord<f64>) -> Self {
        Self { origin, direction, pivot: None }
    }

    /// Straight edge through `from` advancing towards `to`.
    #[inline]
    pub fn towards(from: Coord<f64>, to: Coord<f64>) -> Self {
        Self::new(from, to - from)
    }

    /// Copy of this vector moved to a new origin.
    #[inline]
    pub fn with_origin(self, origin: Coord<f64>) -> Self {
        Self { origin, ..self }
    }

    /// Copy of this vector turned a quarter turn, so the sweep runs along the old edge.
    #[inline]
    pub fn rotated(self) -> Self {
        Self {
            direction: Coord { x: -self.direction.y, y: self.direction.x },
            ..self
        }
    }

    #[inline]
    fn is_degenerate(&self) -> bool {
        self.direction.x == 0.0 && self.direction.y == 0.0
    }

    /// Signed distance of `point` along `direction`, measured from the line through
    /// `origin` perpendicular to it. Falls back to plain distance when the vector has
    /// no direction.
    pub fn perpendicular_distance(&self, point: Coord<f64>) -> f64 {
        if self.is_degenerate() { return distance(point, self.origin) }
        let offset = point - self.origin;
        let norm = self.direction.x.hypot(self.direction.y);
        (self.direction.x * offset.x + self.direction.y * offset.y) / norm
    }

    /// Polar angle from this vector's direction to `other`.
    ///
    /// With a pivot the wrap is resolved by the stored rotation; otherwise the
    /// representative in (-π, π] is chosen. `None` when either direction is zero.
    pub fn angle_to(&self, other: Coord<f64>) -> Option<f64> {
        if self.is_degenerate() || (other.x == 0.0 && other.y == 0.0) { return None }

        let mut delta = other.y.atan2(other.x) - self.direction.y.atan2(self.direction.x);
        match self.pivot {
            Some(Rotation::Clockwise) if delta > 0.0 => delta -= TAU,
            Some(Rotation::CounterClockwise) if delta < 0.0 => delta += TAU,
            Some(_) => {}
            None if delta > PI => delta -= TAU,
            None if delta < -PI => delta += TAU,
            None => {}
        }
        Some(delta)
    }

    /// Forward score of `point`: non-positive behind the edge, positive ahead of it.
    pub fn score(&self, point: Coord<f64>) -> f64 {
        let Some(rotation) = self.pivot else { return self.perpendicular_distance(point) };

        // A point sitting on the pivot has no angle and is treated as straight ahead.
        let angle = self.angle_to(point - self.origin).unwrap_or(0.0);
        let score = rotation.sign() * angle - 0.75 * TAU;
        if score < -PI { score + TAU } else { score }
    }

    /// Approximate length of an edge made of `points`.
    ///
    /// Finds the most extreme point (farthest from the pivot, or farthest along the
    /// edge line for a straight edge), then returns the distance from it to the point
    /// farthest away. `None` for an empty edge.
    pub fn edge_length(&self, points: impl IntoIterator<Item = Coord<f64>>) -> Option<f64> {
        let points = points.into_iter().collect::<Vec<_>>();

        let (start, _) = if self.pivot.is_some() {
            argmax_by(points.iter().map(|&p| (p, distance(p, self.origin))))?
        } else {
            let ruler = self.rotated();
            argmax_by(points.iter().map(|&p| (p, ruler.perpendicular_distance(p))))?
        };

        argmax_by(points.iter().map(|&p| (p, distance(start, p)))).map(|(_, length)| length)
    }
}
