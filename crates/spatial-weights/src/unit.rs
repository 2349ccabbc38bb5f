use std::fmt;

/// Identifies a single unit (tract, block group, etc.) within one snapshot.
///
/// Units are assigned contiguous indices starting from `0`, in the order the
/// geometries were handed to the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Row index of this unit in the input geometry slice.
    #[inline] pub fn index(self) -> usize { self.0 as usize }
}

impl From<usize> for UnitId {
    fn from(idx: usize) -> Self { Self(idx as u32) }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}
