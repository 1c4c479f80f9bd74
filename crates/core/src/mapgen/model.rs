//! Public output model of a generation run.

use crate::map::TileMap;
use crate::types::Pos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedDungeon {
    pub map: TileMap,
    /// Cells in the order the corridor carver turned them into `Floor`.
    pub carve_log: Vec<Pos>,
    /// True when the regular pipeline produced no room and the minimal layout was substituted.
    pub used_fallback: bool,
}
