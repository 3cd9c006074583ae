mod centroid;
mod vector;

pub use centroid::Centroid;
pub use vector::{EdgeVector, Rotation};

use geo::Coord;

/// Planar distance between two points.
#[inline]
pub(crate) fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = a - b;
    d.x.hypot(d.y)
}

/// Entry with the smallest key, keeping the earliest entry on ties.
pub(crate) fn argmin_by<T: Copy>(items: impl IntoIterator<Item = (T, f64)>) -> Option<(T, f64)> {
    items.into_iter().fold(None, |best, (item, key)| match best {
        Some((_, k)) if k <= key => best,
        _ => Some((item, key)),
    })
}

/// Entry with the largest key, keeping the earliest entry on ties.
pub(crate) fn argmax_by<T: Copy>(items: impl IntoIterator<Item = (T, f64)>) -> Option<(T, f64)> {
    items.into_iter().fold(None, |best, (item, key)| match best {
        Some((_, k)) if k >= key => best,
        _ => Some((item, key)),
    })
}
