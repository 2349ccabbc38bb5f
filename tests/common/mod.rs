// Shared fixtures for the integration tests: square grids in a fixed
// projected CRS and small helpers to build layers from value lists.
#![allow(dead_code)]

use geo::{polygon, MultiPolygon};
use tessera::{AttributeTable, GeoId, GeographicUnit, PanelLayer, Tessellation, Time};

pub const EPSG: u32 = 6426;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
    ]])
}

pub fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
    rect(x, y, x + size, y + size)
}

pub fn tessellation(units: &[(&str, MultiPolygon<f64>)]) -> Tessellation {
    tessellation_in(units, Some(EPSG))
}

pub fn tessellation_in(units: &[(&str, MultiPolygon<f64>)], epsg: Option<u32>) -> Tessellation {
    Tessellation::new(
        units.iter().map(|(id, shape)| GeographicUnit::new(*id, shape.clone())).collect(),
        epsg,
    ).unwrap()
}

/// `cols` × `rows` grid of unit squares named "r{row}c{col}".
pub fn grid(cols: usize, rows: usize) -> Tessellation {
    let units = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (format!("r{r}c{c}"), square(c as f64, r as f64, 1.0))))
        .collect::<Vec<_>>();
    let units = units.iter().map(|(id, shape)| (id.as_str(), shape.clone())).collect::<Vec<_>>();
    tessellation(&units)
}

/// A layer over `tess` with the given named columns.
pub fn layer(time: Time, tess: Tessellation, columns: &[(&str, Vec<Option<f64>>)]) -> PanelLayer {
    let data = AttributeTable::from_columns(tess.len(), columns.iter().map(|(name, values)| (*name, values.clone()))).unwrap();
    PanelLayer::new(time, tess, data).unwrap()
}

pub fn id(s: &str) -> GeoId { GeoId::from(s) }
