use geo::Coord;

/// An incrementally maintained, area-weighted centroid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    point: Coord<f64>,
    area: f64,
}

impl Default for Centroid {
    fn default() -> Self {
        Self { point: Coord { x: 0.0, y: 0.0 }, area: 0.0 }
    }
}

impl Centroid {
    /// Current weighted centre.
    #[inline] pub fn point(&self) -> Coord<f64> { self.point }

    /// Total weight (area) accumulated so far.
    #[inline] pub fn area(&self) -> f64 { self.area }

    /// Fold a point with the given area into the centroid.
    pub fn add(&mut self, point: Coord<f64>, area: f64) {
        let total = self.area + area;
        if total > 0.0 {
            self.point = (point * area + self.point * self.area) / total;
        } else {
            // Zero-area members still pull an empty centroid onto themselves.
            self.point = point;
        }
        self.area = total;
    }

    /// Remove a previously added point, inverting [`Centroid::add`].
    pub fn remove(&mut self, point: Coord<f64>, area: f64) {
        let remaining = self.area - area;
        if remaining > 0.0 {
            self.point = (self.point * self.area - point * area) / remaining;
            self.area = remaining;
        } else {
            self.area = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Coord<f64>, b: Coord<f64>) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn weights_points_by_area() {
        let mut centroid = Centroid::default();
        centroid.add(Coord { x: 0.0, y: 0.0 }, 1.0);
        centroid.add(Coord { x: 4.0, y: 8.0 }, 3.0);
        assert!(close(centroid.point(), Coord { x: 3.0, y: 6.0 }));
        assert_eq!(centroid.area(), 4.0);
    }

    #[test]
    fn remove_restores_previous_centre() {
        let mut centroid = Centroid::default();
        centroid.add(Coord { x: 1.0, y: 1.0 }, 2.0);
        centroid.add(Coord { x: 5.0, y: -3.0 }, 0.5);
        centroid.remove(Coord { x: 5.0, y: -3.0 }, 0.5);
        assert!(close(centroid.point(), Coord { x: 1.0, y: 1.0 }));
        assert_eq!(centroid.area(), 2.0);
    }

    #[test]
    fn zero_area_member_does_not_divide_by_zero() {
        let mut centroid = Centroid::default();
        centroid.add(Coord { x: 2.0, y: 3.0 }, 0.0);
        assert_eq!(centroid.point(), Coord { x: 2.0, y: 3.0 });
        centroid.remove(Coord { x: 2.0, y: 3.0 }, 0.0);
        assert_eq!(centroid.area(), 0.0);
    }
}
