/// The set of stored heights a tile's primary or secondary value may hold.
pub const VALID_HEIGHTS: [u8; 7] = [0, 1, 2, 3, 4, 6, 8];

/// Rounds `value` down to the nearest member of [`VALID_HEIGHTS`], or `0` if
/// `value` is non-positive. Values above 8 round down to 8, since 8 is the
/// greatest valid height.
pub fn round_down(value: i32) -> u8 {
    if value <= 0 {
        return 0;
    }
    VALID_HEIGHTS
        .iter()
        .copied()
        .filter(|&h| (h as i32) <= value)
        .max()
        .unwrap_or(0)
}

/// Maps a stored height to its 3-bit wire index. `7` is reserved.
pub fn height_to_index(h: u8) -> Option<u8> {
    match h {
        0 => Some(0),
        1 => Some(1),
        2 => Some(2),
        3 => Some(3),
        4 => Some(4),
        6 => Some(5),
        8 => Some(6),
        _ => None,
    }
}

/// Maps a 3-bit wire index back to a stored height. `7` is reserved.
pub fn index_to_height(i: u8) -> Option<u8> {
    match i {
        0 => Some(0),
        1 => Some(1),
        2 => Some(2),
        3 => Some(3),
        4 => Some(4),
        5 => Some(6),
        6 => Some(8),
        _ => None,
    }
}
