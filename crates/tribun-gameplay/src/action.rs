use tribun_core::{Cid, Color, CoreError};

const OPCODE_SHIFT: u32 = 28;
const OPCODE_MASK: u32 = 0x0F;
const CID_MASK: u32 = 0x7F;
const PART_MASK: u32 = 0x1;
const HEIGHT_FIELD_MASK: u32 = 0x07;

/// Which opcode-specific draw sub-action this is.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawKind {
    Offer,
    Retract,
    Accept,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    Resign,
    NoLegalMoves,
    TimeoutPlayer,
    TimeoutTie,
}

/// A decoded game action. Each variant's fields are the minimal payload the
/// 32-bit wire format carries for its opcode.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Move { from: Cid, to: Cid, part: u8 },
    Kill { attacker: Cid, target: Cid, part: u8 },
    Liberate { target: Cid },
    Damage { target: Cid, effective: u8 },
    Enslave { attacker: Cid, target: Cid },
    Combine { center: Cid, dir_a: u8, dir_b: u8, donate_a: u8, donate_b: u8 },
    SymCombine { center: Cid, config: u8, donate: u8 },
    Split { actor: Cid, heights: [u8; 6] },
    Backstabb { actor: Cid, dir: u8 },
    AttackTribun { attacker: Cid, tribun: Cid, winner: Color },
    Draw { kind: DrawKind, actor: Color },
    End { reason: EndReason, loser: Color },
}

impl Action {
    pub fn opcode(&self) -> u8 {
        match self {
            Action::Move { .. } => 0,
            Action::Kill { .. } => 1,
            Action::Liberate { .. } => 2,
            Action::Damage { .. } => 3,
            Action::Enslave { .. } => 4,
            Action::Combine { .. } => 5,
            Action::SymCombine { .. } => 6,
            Action::Split { .. } => 7,
            Action::Backstabb { .. } => 8,
            Action::AttackTribun { .. } => 9,
            Action::Draw { .. } => 10,
            Action::End { .. } => 11,
        }
    }

    /// True for an action that ends the game outright. DRAW's own
    /// terminality depends on its `kind` (only `Accept` ends the game), so
    /// it is not `true` here; callers inspect `Draw.kind` directly.
    pub fn is_end(&self) -> bool {
        matches!(self, Action::End { .. })
    }
}

fn field(value: u32, shift: u32, mask: u32) -> u32 {
    (value >> shift) & mask
}

fn cid_field(value: u32, shift: u32) -> Result<Cid, CoreError> {
    let raw = field(value, shift, CID_MASK);
    if raw > 120 {
        return Err(CoreError::InvalidCid(raw as u8));
    }
    Ok(raw as u8)
}

fn check_range(field_name: &'static str, value: i64, max: i64) -> Result<(), CoreError> {
    if value < 0 || value > max {
        return Err(CoreError::EncodeRange { field: field_name, value });
    }
    Ok(())
}

/// Packs an [`Action`] into its 32-bit little-endian wire word.
pub fn encode_action(action: Action) -> Result<u32, CoreError> {
    let opcode = action.opcode() as u32;
    let payload = match action {
        Action::Move { from, to, part } => {
            check_range("part", part as i64, 1)?;
            (from as u32) | ((to as u32) << 7) | ((part as u32) << 14)
        }
        Action::Kill { attacker, target, part } => {
            check_range("part", part as i64, 1)?;
            (attacker as u32) | ((target as u32) << 7) | ((part as u32) << 14)
        }
        Action::Liberate { target } => target as u32,
        Action::Damage { target, effective } => {
            check_range("effective", effective as i64 - 1, 7)?;
            (target as u32) | (((effective - 1) as u32) << 7)
        }
        Action::Enslave { attacker, target } => (attacker as u32) | ((target as u32) << 7),
        Action::Combine { center, dir_a, dir_b, donate_a, donate_b } => {
            check_range("dir_a", dir_a as i64, 7)?;
            check_range("dir_b", dir_b as i64, 7)?;
            check_range("donate_a", donate_a as i64 - 1, 7)?;
            check_range("donate_b", donate_b as i64 - 1, 7)?;
            (center as u32)
                | ((dir_a as u32) << 7)
                | ((dir_b as u32) << 10)
                | (((donate_a - 1) as u32) << 13)
                | (((donate_b - 1) as u32) << 16)
        }
        Action::SymCombine { center, config, donate } => {
            check_range("config", config as i64, 3)?;
            check_range("donate", donate as i64 - 1, 3)?;
            (center as u32) | ((config as u32) << 7) | (((donate - 1) as u32) << 9)
        }
        Action::Split { actor, heights } => {
            let mut word = actor as u32;
            for (i, &h) in heights.iter().enumerate() {
                check_range("split_height", h as i64, 7)?;
                word |= (h as u32) << (7 + 3 * i);
            }
            word
        }
        Action::Backstabb { actor, dir } => {
            check_range("dir", dir as i64, 7)?;
            (actor as u32) | ((dir as u32) << 7)
        }
        Action::AttackTribun { attacker, tribun, winner } => {
            (attacker as u32) | ((tribun as u32) << 7) | ((winner.bit() as u32) << 14)
        }
        Action::Draw { kind, actor } => {
            let kind_bits = match kind {
                DrawKind::Offer => 0,
                DrawKind::Retract => 1,
                DrawKind::Accept => 2,
            };
            kind_bits | ((actor.bit() as u32) << 2)
        }
        Action::End { reason, loser } => {
            let reason_bits = match reason {
                EndReason::Resign => 0,
                EndReason::NoLegalMoves => 1,
                EndReason::TimeoutPlayer => 2,
                EndReason::TimeoutTie => 3,
            };
            reason_bits | ((loser.bit() as u32) << 3)
        }
    };
    Ok((opcode << OPCODE_SHIFT) | payload)
}

/// Unpacks a 32-bit wire word into an [`Action`].
pub fn decode_action(word: u32) -> Result<Action, CoreError> {
    let opcode = field(word, OPCODE_SHIFT, OPCODE_MASK) as u8;
    match opcode {
        0 => Ok(Action::Move {
            from: cid_field(word, 0)?,
            to: cid_field(word, 7)?,
            part: field(word, 14, PART_MASK) as u8,
        }),
        1 => Ok(Action::Kill {
            attacker: cid_field(word, 0)?,
            target: cid_field(word, 7)?,
            part: field(word, 14, PART_MASK) as u8,
        }),
        2 => Ok(Action::Liberate { target: cid_field(word, 0)? }),
        3 => Ok(Action::Damage {
            target: cid_field(word, 0)?,
            effective: field(word, 7, HEIGHT_FIELD_MASK) as u8 + 1,
        }),
        4 => Ok(Action::Enslave {
            attacker: cid_field(word, 0)?,
            target: cid_field(word, 7)?,
        }),
        5 => Ok(Action::Combine {
            center: cid_field(word, 0)?,
            dir_a: field(word, 7, HEIGHT_FIELD_MASK) as u8,
            dir_b: field(word, 10, HEIGHT_FIELD_MASK) as u8,
            donate_a: field(word, 13, HEIGHT_FIELD_MASK) as u8 + 1,
            donate_b: field(word, 16, HEIGHT_FIELD_MASK) as u8 + 1,
        }),
        6 => Ok(Action::SymCombine {
            center: cid_field(word, 0)?,
            config: field(word, 7, 0x3) as u8,
            donate: field(word, 9, 0x3) as u8 + 1,
        }),
        7 => {
            let actor = cid_field(word, 0)?;
            let mut heights = [0u8; 6];
            for (i, h) in heights.iter_mut().enumerate() {
                *h = field(word, 7 + 3 * i as u32, HEIGHT_FIELD_MASK) as u8;
            }
            Ok(Action::Split { actor, heights })
        }
        8 => Ok(Action::Backstabb {
            actor: cid_field(word, 0)?,
            dir: field(word, 7, HEIGHT_FIELD_MASK) as u8,
        }),
        9 => Ok(Action::AttackTribun {
            attacker: cid_field(word, 0)?,
            tribun: cid_field(word, 7)?,
            winner: Color::from_bit(field(word, 14, PART_MASK) as u8),
        }),
        10 => {
            let kind = match field(word, 0, 0x3) {
                0 => DrawKind::Offer,
                1 => DrawKind::Retract,
                2 => DrawKind::Accept,
                _ => return Err(CoreError::EncodeRange { field: "draw_kind", value: field(word, 0, 0x3) as i64 }),
            };
            Ok(Action::Draw { kind, actor: Color::from_bit(field(word, 2, PART_MASK) as u8) })
        }
        11 => {
            let reason = match field(word, 0, 0x7) {
                0 => EndReason::Resign,
                1 => EndReason::NoLegalMoves,
                2 => EndReason::TimeoutPlayer,
                3 => EndReason::TimeoutTie,
                other => return Err(CoreError::EncodeRange { field: "end_reason", value: other as i64 }),
            };
            Ok(Action::End { reason, loser: Color::from_bit(field(word, 3, PART_MASK) as u8) })
        }
        other => Err(CoreError::UnknownOpcode(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_actions() -> Vec<Action> {
        vec![
            Action::Move { from: 5, to: 60, part: 0 },
            Action::Move { from: 5, to: 60, part: 1 },
            Action::Kill { attacker: 10, target: 11, part: 0 },
            Action::Liberate { target: 42 },
            Action::Damage { target: 7, effective: 1 },
            Action::Damage { target: 7, effective: 8 },
            Action::Enslave { attacker: 1, target: 2 },
            Action::Combine { center: 60, dir_a: 0, dir_b: 3, donate_a: 1, donate_b: 8 },
            Action::SymCombine { center: 60, config: 0, donate: 1 },
            Action::SymCombine { center: 60, config: 1, donate: 2 },
            Action::Split { actor: 60, heights: [1, 0, 2, 0, 4, 0] },
            Action::Backstabb { actor: 60, dir: 5 },
            Action::AttackTribun { attacker: 1, tribun: 2, winner: Color::White },
            Action::Draw { kind: DrawKind::Offer, actor: Color::Black },
            Action::Draw { kind: DrawKind::Accept, actor: Color::White },
            Action::End { reason: EndReason::Resign, loser: Color::Black },
            Action::End { reason: EndReason::TimeoutTie, loser: Color::White },
        ]
    }

    #[test]
    fn bijective_u32() {
        for action in sample_actions() {
            let word = encode_action(action).unwrap();
            assert_eq!(decode_action(word).unwrap(), action);
        }
    }

    #[test]
    fn opcode_occupies_top_nibble() {
        let word = encode_action(Action::End { reason: EndReason::Resign, loser: Color::Black }).unwrap();
        assert_eq!(word >> OPCODE_SHIFT, 11);
    }

    #[test]
    fn reserved_opcode_is_rejected() {
        let word = 12u32 << OPCODE_SHIFT;
        assert!(matches!(decode_action(word), Err(CoreError::UnknownOpcode(12))));
    }

    #[test]
    fn donate_zero_is_out_of_range() {
        let result = encode_action(Action::Combine {
            center: 0,
            dir_a: 0,
            dir_b: 1,
            donate_a: 0,
            donate_b: 1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn cid_above_board_is_out_of_range() {
        assert!(matches!(decode_action(121u32 << 0), Err(CoreError::InvalidCid(_))));
    }
}
