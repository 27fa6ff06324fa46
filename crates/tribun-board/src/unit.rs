use crate::height::{height_to_index, index_to_height, round_down};
use tribun_core::{Color, CoreError};

const P_MASK: u8 = 0x07;
const S_SHIFT: u8 = 3;
const S_MASK: u8 = 0x07;
const COLOR_BIT: u8 = 0x40;
const TRIBUN_BIT: u8 = 0x80;

/// A tile's occupant: a primary height, an optional enslaved secondary
/// height, a color, and a tribun flag.
///
/// Invariants (see [`normalize`]): a tribun unit always has `s == 0`; if
/// `s > 0` then `p <= 4` and `2 * p >= s`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub color: Color,
    pub tribun: bool,
    pub p: u8,
    pub s: u8,
}

impl Unit {
    pub fn is_enslaving(&self) -> bool {
        self.s > 0
    }

    fn satisfies_slave_property(&self) -> bool {
        self.s == 0 || (self.p <= 4 && 2 * self.p >= self.s)
    }
}

/// Packs `Some(unit)` into its 1-byte wire encoding, or `0x00` for an empty
/// tile.
pub fn unit_to_byte(unit: Option<Unit>) -> u8 {
    let Some(unit) = unit else { return 0 };
    let p_idx = height_to_index(unit.p).expect("unit.p is a valid stored height");
    let s_idx = height_to_index(unit.s).expect("unit.s is a valid stored height");
    let color_bit = if unit.color == Color::White { COLOR_BIT } else { 0 };
    let tribun_bit = if unit.tribun { TRIBUN_BIT } else { 0 };
    p_idx | (s_idx << S_SHIFT) | color_bit | tribun_bit
}

/// Unpacks a wire byte into `None` (empty tile) or `Some(unit)`.
///
/// Bytes whose height indices are both zero decode to `None` regardless of
/// the color/tribun bits, since only `0x00` is a canonical empty encoding
/// and no valid state ever produces any other all-zero-height byte.
pub fn byte_to_unit(byte: u8) -> Result<Option<Unit>, CoreError> {
    let p_idx = byte & P_MASK;
    let s_idx = (byte >> S_SHIFT) & S_MASK;
    let p = index_to_height(p_idx).ok_or(CoreError::InvalidUnitByte(byte))?;
    let s = index_to_height(s_idx).ok_or(CoreError::InvalidUnitByte(byte))?;
    if p == 0 && s == 0 {
        return Ok(None);
    }
    let color = Color::from_bit((byte & COLOR_BIT) >> 6);
    let tribun = byte & TRIBUN_BIT != 0;
    Ok(Some(Unit { color, tribun, p, s }))
}

/// A not-yet-normalized candidate unit: `p` and `s` may be out of range or
/// violate the slave property before this pipeline runs.
pub struct RawUnit {
    pub color: Color,
    pub tribun: bool,
    pub p: i32,
    pub s: i32,
}

/// The four-step normalization pipeline: round both heights down to valid
/// stored heights, enforce the slave property by clearing `p`, liberate the
/// secondary into an opposite-color primary if that clears `p` to zero with
/// `s` still standing, then collapse an all-zero result to an empty tile.
pub fn normalize(raw: RawUnit) -> Option<Unit> {
    let tribun = raw.tribun && raw.p > 0;
    let mut p = round_down(raw.p);
    let s = round_down(raw.s);

    let mut unit = Unit { color: raw.color, tribun, p, s };
    if !unit.satisfies_slave_property() {
        p = 0;
        unit.p = 0;
        unit.tribun = false;
    }
    if unit.s > 0 {
        unit.tribun = false;
    }

    if unit.p == 0 && unit.s > 0 {
        log::debug!("liberation: {} slave becomes {} primary", unit.color, !unit.color);
        let freed_p = round_down(unit.s as i32);
        unit = Unit {
            color: !unit.color,
            tribun: false,
            p: freed_p,
            s: 0,
        };
    }

    if unit.p == 0 && unit.s == 0 {
        return None;
    }
    Some(unit)
}

/// The narrower normalization used only by ENSLAVE: if the slave property
/// forces `p` to zero, the action fails outright rather than liberating.
pub fn normalize_no_liberate(raw: RawUnit) -> Option<Unit> {
    let tribun = raw.tribun && raw.p > 0;
    let p = round_down(raw.p);
    let s = round_down(raw.s);
    let mut unit = Unit { color: raw.color, tribun, p, s };
    if !unit.satisfies_slave_property() {
        return None;
    }
    if unit.p == 0 {
        return None;
    }
    if unit.s > 0 {
        unit.tribun = false;
    }
    Some(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_units() -> Vec<Unit> {
        let mut out = Vec::new();
        for &color in &[Color::Black, Color::White] {
            for &p in &[1, 2, 3, 4, 6, 8] {
                out.push(Unit { color, tribun: true, p, s: 0 });
                out.push(Unit { color, tribun: false, p, s: 0 });
                for &s in &[1, 2, 3, 4] {
                    if p <= 4 && 2 * p >= s {
                        out.push(Unit { color, tribun: false, p, s });
                    }
                }
            }
        }
        out
    }

    #[test]
    fn bijective_u8() {
        for unit in sample_units() {
            let byte = unit_to_byte(Some(unit));
            assert_eq!(byte_to_unit(byte).unwrap(), Some(unit));
        }
    }

    #[test]
    fn empty_round_trips_to_zero_byte() {
        assert_eq!(unit_to_byte(None), 0x00);
        assert_eq!(byte_to_unit(0x00).unwrap(), None);
    }

    #[test]
    fn reserved_index_is_rejected() {
        // p index 7 is reserved.
        assert!(byte_to_unit(0x07).is_err());
    }

    #[test]
    fn normalize_rounds_each_height() {
        let raw = RawUnit { color: Color::Black, tribun: false, p: 5, s: 0 };
        let unit = normalize(raw).unwrap();
        assert_eq!(unit.p, 4);
    }

    #[test]
    fn normalize_strips_tribun_when_primary_empties() {
        let raw = RawUnit { color: Color::Black, tribun: true, p: 0, s: 0 };
        assert_eq!(normalize(raw), None);
    }

    #[test]
    fn normalize_enforces_slave_property_then_liberates() {
        // p = 1, s = 4 violates 2p >= s (2 < 4), so p is forced to 0 and the
        // slave liberates into an opposite-color primary of height 4.
        let raw = RawUnit { color: Color::Black, tribun: false, p: 1, s: 4 };
        let unit = normalize(raw).unwrap();
        assert_eq!(unit.color, Color::White);
        assert_eq!(unit.p, 4);
        assert_eq!(unit.s, 0);
        assert!(!unit.tribun);
    }

    #[test]
    fn normalize_keeps_valid_slave_pair() {
        let raw = RawUnit { color: Color::Black, tribun: false, p: 4, s: 4 };
        let unit = normalize(raw).unwrap();
        assert_eq!(unit.p, 4);
        assert_eq!(unit.s, 4);
    }

    #[test]
    fn no_liberate_fails_instead_of_flipping_color() {
        let raw = RawUnit { color: Color::Black, tribun: false, p: 1, s: 4 };
        assert_eq!(normalize_no_liberate(raw), None);
    }

    #[test]
    fn no_liberate_succeeds_when_property_holds() {
        let raw = RawUnit { color: Color::Black, tribun: false, p: 4, s: 4 };
        assert!(normalize_no_liberate(raw).is_some());
    }

    #[test]
    fn tribun_sheds_flag_when_slave_survives() {
        let raw = RawUnit { color: Color::Black, tribun: true, p: 4, s: 4 };
        let unit = normalize(raw).unwrap();
        assert_eq!(unit.s, 4);
        assert!(!unit.tribun);

        let raw = RawUnit { color: Color::Black, tribun: true, p: 4, s: 4 };
        let unit = normalize_no_liberate(raw).unwrap();
        assert_eq!(unit.s, 4);
        assert!(!unit.tribun);
    }

    proptest::proptest! {
        #[test]
        fn normalize_output_always_satisfies_slave_property_and_tribun_invariant(
            tribun in proptest::bool::ANY,
            p in -2i32..10,
            s in -2i32..10,
        ) {
            let raw = RawUnit { color: Color::Black, tribun, p, s };
            if let Some(unit) = normalize(raw) {
                proptest::prop_assert!(unit.satisfies_slave_property());
                proptest::prop_assert!(!(unit.tribun && unit.s > 0));
                proptest::prop_assert!(!(unit.tribun && unit.p == 0));
            }
        }

        #[test]
        fn no_liberate_output_never_changes_color_and_upholds_tribun_invariant(
            tribun in proptest::bool::ANY,
            p in -2i32..10,
            s in -2i32..10,
        ) {
            let raw = RawUnit { color: Color::Black, tribun, p, s };
            if let Some(unit) = normalize_no_liberate(raw) {
                proptest::prop_assert_eq!(unit.color, Color::Black);
                proptest::prop_assert!(unit.satisfies_slave_property());
                proptest::prop_assert!(!(unit.tribun && unit.s > 0));
            }
        }
    }
}
