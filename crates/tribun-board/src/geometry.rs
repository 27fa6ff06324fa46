use tribun_core::{Cid, CoreError};

/// The six neighbor direction vectors, indexed `0..6`. Direction `d`'s
/// opposite is always `d ^ 3`.
pub const DIRECTIONS: [(i8, i8); 6] = [
    (1, 1),
    (1, 0),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (0, -1),
];

/// The opposite of direction `d`.
pub fn opposite(d: u8) -> u8 {
    d ^ 3
}

/// True if `(x, y)` names one of the 91 on-board hex tiles.
pub fn on_board(x: i8, y: i8) -> bool {
    (-5..=5).contains(&x) && (-5..=5).contains(&y) && (x - y).abs() <= 5
}

/// Packs axial coordinates into a 7-bit tile id.
pub fn encode_cid(x: i8, y: i8) -> Result<Cid, CoreError> {
    if !on_board(x, y) {
        return Err(CoreError::EncodeRange {
            field: "cid_coords",
            value: (x as i64) * 100 + y as i64,
        });
    }
    Ok(((x + 5) as u8) * 11 + (y + 5) as u8)
}

/// Unpacks a tile id into axial coordinates.
pub fn decode_cid(cid: Cid) -> Result<(i8, i8), CoreError> {
    if cid > 120 {
        return Err(CoreError::InvalidCid(cid));
    }
    let x = (cid / 11) as i8 - 5;
    let y = (cid % 11) as i8 - 5;
    if !on_board(x, y) {
        return Err(CoreError::InvalidCid(cid));
    }
    Ok((x, y))
}

/// The tile id adjacent to `cid` along direction `d`, or `None` if off board.
pub fn neighbor_cid(cid: Cid, d: u8) -> Option<Cid> {
    let (x, y) = decode_cid(cid).ok()?;
    let (dx, dy) = DIRECTIONS[(d % 6) as usize];
    encode_cid(x + dx, y + dy).ok()
}

/// All on-board neighbors of `cid`, paired with the direction taken to reach
/// them.
pub fn neighbors(cid: Cid) -> impl Iterator<Item = (u8, Cid)> {
    (0u8..6).filter_map(move |d| neighbor_cid(cid, d).map(|n| (d, n)))
}

pub fn are_adjacent(a: Cid, b: Cid) -> bool {
    neighbors(a).any(|(_, n)| n == b)
}

/// Every valid tile id, in ascending order.
pub fn all_cids() -> impl Iterator<Item = Cid> {
    (0u8..=120).filter(|&cid| decode_cid(cid).is_ok())
}
