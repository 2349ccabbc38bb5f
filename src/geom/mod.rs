mod geom;
mod overlay;
mod raster;
#[cfg(test)]
pub(crate) mod test_support;

pub use geom::{GeographicUnit, Tessellation};
pub(crate) use geom::ensure_same_crs;
pub use overlay::{overlay, Overlay, OverlayCell, AREA_TOLERANCE, COVERAGE_TOLERANCE};
pub(crate) use overlay::snap_to_one;
pub use raster::{MaskedUnit, Raster, RasterMask, NLCD_DEVELOPED};
