use crate::geometry::all_cids;
use crate::unit::{byte_to_unit, unit_to_byte, Unit};
use tribun_core::{Cid, CoreError};

/// The number of square-grid cells backing the 91 on-board hex tiles.
pub const TILE_COUNT: usize = 121;

/// The full 121-tile board, indexed directly by [`Cid`]. Off-board indices
/// are always `0x00` (empty) and are never iterated by [`Board::units`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    tiles: [u8; TILE_COUNT],
}

impl Board {
    pub fn empty() -> Self {
        Board { tiles: [0; TILE_COUNT] }
    }

    pub fn from_bytes(bytes: [u8; TILE_COUNT]) -> Result<Self, CoreError> {
        for &byte in bytes.iter() {
            // Validates every byte decodes; the result is discarded here and
            // reused lazily by `get`.
            let _ = byte_to_unit(byte)?;
        }
        Ok(Board { tiles: bytes })
    }

    pub fn to_bytes(&self) -> [u8; TILE_COUNT] {
        self.tiles
    }

    pub fn get(&self, cid: Cid) -> Result<Option<Unit>, CoreError> {
        byte_to_unit(self.tiles[cid as usize])
    }

    pub fn set(&mut self, cid: Cid, unit: Option<Unit>) {
        self.tiles[cid as usize] = unit_to_byte(unit);
    }

    /// Every occupied on-board tile, as `(cid, unit)` pairs.
    pub fn units(&self) -> impl Iterator<Item = (Cid, Unit)> + '_ {
        all_cids().filter_map(move |cid| self.get(cid).ok().flatten().map(|u| (cid, u)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribun_core::Color;

    #[test]
    fn empty_board_round_trips() {
        let board = Board::empty();
        assert_eq!(Board::from_bytes(board.to_bytes()).unwrap(), board);
        assert_eq!(board.units().count(), 0);
    }

    #[test]
    fn set_then_get() {
        let mut board = Board::empty();
        let unit = Unit { color: Color::Black, tribun: true, p: 4, s: 0 };
        board.set(60, Some(unit));
        assert_eq!(board.get(60).unwrap(), Some(unit));
        assert_eq!(board.units().count(), 1);
    }

    #[test]
    fn from_bytes_rejects_invalid_unit_byte() {
        let mut bytes = [0u8; TILE_COUNT];
        bytes[0] = 0x07; // reserved primary index
        assert!(Board::from_bytes(bytes).is_err());
    }
}
