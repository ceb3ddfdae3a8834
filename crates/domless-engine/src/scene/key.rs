use super::ZIndex;

/// Paint-order key of one draw item: widget depth first, then the order
/// the item was pushed in, so a widget's outline, fill and text keep the
/// sequence they were painted in.
///
/// Field order matters; the derived ordering compares `z` before `order`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SortKey {
    pub z: ZIndex,
    pub order: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(z: ZIndex, order: u32) -> Self {
        Self { z, order }
    }
}
