use geo::{polygon, MultiPolygon};

use crate::geom::{GeographicUnit, Tessellation};

/// EPSG code used by every test tessellation.
pub(crate) const TEST_EPSG: u32 = 6426;

/// Axis-aligned rectangle from (x0, y0) to (x1, y1).
pub(crate) fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
    ]])
}

/// Square with its lower-left corner at (x, y).
pub(crate) fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
    rect(x, y, x + size, y + size)
}

/// Tessellation from (id, geometry) pairs in `TEST_EPSG`.
pub(crate) fn tessellation(units: &[(&str, MultiPolygon<f64>)]) -> Tessellation {
    Tessellation::new(
        units.iter().map(|(id, shape)| GeographicUnit::new(*id, shape.clone())).collect(),
        Some(TEST_EPSG),
    ).unwrap()
}
