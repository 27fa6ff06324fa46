use crate::action::{decode_action, Action, DrawKind, EndReason};
use crate::state::{State, Status};
use tribun_board::{
    height_to_index, neighbor_cid, neighbors, normalize, normalize_no_liberate, reachable_attacks,
    reachable_moves, Board, RawUnit, Unit,
};
use tribun_core::{Cid, Color, CoreError, IllegalReason};

fn illegal(reason: IllegalReason) -> CoreError {
    CoreError::Illegal(reason)
}

fn require_unit(board: &Board, cid: Cid) -> Result<Unit, CoreError> {
    board
        .get(cid)
        .map_err(|_| illegal(IllegalReason::EmptyOrigin))?
        .ok_or_else(|| illegal(IllegalReason::EmptyOrigin))
}

fn require_owned(board: &Board, cid: Cid, color: Color) -> Result<Unit, CoreError> {
    let unit = require_unit(board, cid)?;
    if unit.color != color {
        return Err(illegal(IllegalReason::NotOwned));
    }
    Ok(unit)
}

/// Like [`require_unit`] but for an attack/enslave/liberate/tribun target:
/// an empty or off-board target is `EmptyTarget`, not `EmptyOrigin`.
fn require_target(board: &Board, cid: Cid) -> Result<Unit, CoreError> {
    board
        .get(cid)
        .map_err(|_| illegal(IllegalReason::EmptyTarget))?
        .ok_or_else(|| illegal(IllegalReason::EmptyTarget))
}

/// A COMBINE/SYM_COMBINE donor tile must hold a unit owned by the acting
/// color; empty or enemy-held tiles are both `DonorNotOwned`.
fn require_donor(board: &Board, cid: Cid, color: Color) -> Result<Unit, CoreError> {
    match board.get(cid) {
        Ok(Some(unit)) if unit.color == color => Ok(unit),
        _ => Err(illegal(IllegalReason::DonorNotOwned)),
    }
}

fn require_empty(board: &Board, cid: Cid) -> Result<(), CoreError> {
    match board.get(cid) {
        Ok(None) => Ok(()),
        _ => Err(illegal(IllegalReason::DestinationOccupied)),
    }
}

/// A COMBINE/SYM_COMBINE center tile must be empty; occupied is
/// `CenterOccupied`, distinct from a destination-tile collision.
fn require_center_empty(board: &Board, cid: Cid) -> Result<(), CoreError> {
    match board.get(cid) {
        Ok(None) => Ok(()),
        _ => Err(illegal(IllegalReason::CenterOccupied)),
    }
}

fn require_turn(expected: Color, actual: Color) -> Result<(), CoreError> {
    if expected != actual {
        return Err(illegal(IllegalReason::WrongTurn));
    }
    Ok(())
}

/// Moves or relocates `mover` from `from` to `to`. `part == 0` leaves the
/// secondary behind to normalize (possibly liberating); `part == 1` moves
/// the whole stack atomically.
fn relocate(board: &mut Board, from: Cid, to: Cid, part: u8, mover: Unit) {
    if part == 0 {
        let moved = Unit { color: mover.color, tribun: mover.tribun, p: mover.p, s: 0 };
        board.set(to, Some(moved));
        let raw = RawUnit { color: mover.color, tribun: false, p: 0, s: mover.s as i32 };
        board.set(from, normalize(raw));
    } else {
        board.set(to, Some(mover));
        board.set(from, None);
    }
}

const SYM_CONFIGS: [(u8, &[u8]); 3] = [(0, &[0, 1, 2, 3, 4, 5]), (1, &[0, 4, 5]), (2, &[1, 2, 3])];

/// Decodes and applies one action to `state`, re-validating every
/// precondition. Total on legal inputs; never panics.
pub fn apply(state: &State, word: u32) -> Result<State, CoreError> {
    if !state.is_active() {
        return Err(illegal(IllegalReason::GameEnded));
    }
    let action = decode_action(word)?;
    let mut board = state.board;
    let mut draw_offer_by = state.draw_offer_by;
    let mut status = state.status;
    let mut winner = state.winner;
    let mut turn_flips = true;

    match action {
        Action::Move { from, to, part } => {
            let mover = require_owned(&board, from, state.turn)?;
            let height = if part == 0 { mover.p } else { mover.s };
            if part == 1 && mover.s == 0 {
                return Err(illegal(IllegalReason::UnreachableDestination));
            }
            let tribun = if part == 0 { mover.tribun } else { false };
            let reachable = reachable_moves(&board, from, height, tribun, state.turn);
            if !reachable.contains(&to) {
                return Err(illegal(IllegalReason::UnreachableDestination));
            }
            relocate(&mut board, from, to, part, mover);
        }
        Action::Kill { attacker, target, part } => {
            let mover = require_owned(&board, attacker, state.turn)?;
            let victim = require_target(&board, target)?;
            if victim.color == state.turn {
                return Err(illegal(IllegalReason::TargetNotEnemy));
            }
            if victim.tribun {
                return Err(illegal(IllegalReason::TargetIsTribun));
            }
            let height = if part == 0 { mover.p } else { mover.s };
            if part == 1 && mover.s == 0 {
                return Err(illegal(IllegalReason::UnreachableDestination));
            }
            let tribun = if part == 0 { mover.tribun } else { false };
            let reachable = reachable_attacks(&board, attacker, height, tribun, state.turn);
            if !reachable.contains(&target) {
                return Err(illegal(IllegalReason::UnreachableDestination));
            }
            board.set(target, None);
            relocate(&mut board, attacker, target, part, mover);
        }
        Action::Liberate { target } => {
            let victim = require_target(&board, target)?;
            if victim.s == 0 {
                return Err(illegal(IllegalReason::NothingToLiberate));
            }
            let raw = RawUnit { color: !victim.color, tribun: false, p: victim.s as i32, s: 0 };
            board.set(target, normalize(raw));
        }
        Action::Damage { target, effective } => {
            let mut victim = require_target(&board, target)?;
            if victim.color == state.turn {
                return Err(illegal(IllegalReason::TargetNotEnemy));
            }
            if effective as u32 >= victim.p as u32 {
                return Err(illegal(IllegalReason::InsufficientStrength));
            }
            victim.p -= effective;
            board.set(target, Some(victim));
        }
        Action::Enslave { attacker, target } => {
            let mover = require_owned(&board, attacker, state.turn)?;
            let victim = require_target(&board, target)?;
            if victim.color == state.turn {
                return Err(illegal(IllegalReason::TargetNotEnemy));
            }
            if victim.tribun {
                return Err(illegal(IllegalReason::TargetIsTribun));
            }
            if victim.s > 0 {
                return Err(illegal(IllegalReason::AlreadyEnslaved));
            }
            let reachable = reachable_attacks(&board, attacker, mover.p, mover.tribun, state.turn);
            if !reachable.contains(&target) {
                return Err(illegal(IllegalReason::UnreachableDestination));
            }
            let raw = RawUnit {
                color: mover.color,
                tribun: mover.tribun,
                p: mover.p as i32,
                s: victim.p as i32,
            };
            let enslaved =
                normalize_no_liberate(raw).ok_or_else(|| illegal(IllegalReason::EnslaveNormalizationFailed))?;
            board.set(target, Some(enslaved));
            let raw_origin = RawUnit { color: mover.color, tribun: false, p: 0, s: mover.s as i32 };
            board.set(attacker, normalize(raw_origin));
        }
        Action::Combine { center, dir_a, dir_b, donate_a, donate_b } => {
            require_center_empty(&board, center)?;
            let donor_a = neighbor_cid(center, dir_a).ok_or_else(|| illegal(IllegalReason::DonorNotAdjacent))?;
            let donor_b = neighbor_cid(center, dir_b).ok_or_else(|| illegal(IllegalReason::DonorNotAdjacent))?;
            let unit_a = require_donor(&board, donor_a, state.turn)?;
            let unit_b = require_donor(&board, donor_b, state.turn)?;
            validate_donation(unit_a, donate_a)?;
            validate_donation(unit_b, donate_b)?;

            let center_raw = RawUnit {
                color: state.turn,
                tribun: unit_a.tribun || unit_b.tribun,
                p: donate_a as i32 + donate_b as i32,
                s: 0,
            };
            board.set(center, normalize(center_raw));
            apply_donation(&mut board, donor_a, unit_a, donate_a);
            apply_donation(&mut board, donor_b, unit_b, donate_b);
        }
        Action::SymCombine { center, config, donate } => {
            require_center_empty(&board, center)?;
            let (_, dirs) = SYM_CONFIGS
                .iter()
                .find(|&&(c, _)| c == config)
                .ok_or_else(|| illegal(IllegalReason::SymConfigMismatch))?;
            let mut donor_cids = Vec::with_capacity(dirs.len());
            let mut units = Vec::with_capacity(dirs.len());
            for &d in *dirs {
                let donor = neighbor_cid(center, d).ok_or_else(|| illegal(IllegalReason::SymConfigMismatch))?;
                let unit = require_donor(&board, donor, state.turn)?;
                if unit.tribun {
                    return Err(illegal(IllegalReason::SymConfigMismatch));
                }
                donor_cids.push(donor);
                units.push(unit);
            }
            let first = units[0];
            if !units.iter().all(|&u| u == first) {
                return Err(illegal(IllegalReason::SymConfigMismatch));
            }
            if donate > first.p {
                return Err(illegal(IllegalReason::DonateOutOfRange));
            }
            let center_raw = RawUnit {
                color: state.turn,
                tribun: false,
                p: donate as i32 * dirs.len() as i32,
                s: 0,
            };
            board.set(center, normalize(center_raw));
            for (&donor, unit) in donor_cids.iter().zip(units.iter()) {
                apply_donation(&mut board, donor, *unit, donate);
            }
        }
        Action::Split { actor, heights } => {
            let unit = require_owned(&board, actor, state.turn)?;
            if unit.tribun {
                return Err(illegal(IllegalReason::SplitTribunForbidden));
            }
            let mut sum = 0u32;
            let mut destinations = Vec::new();
            for (dir, &h) in heights.iter().enumerate() {
                if h == 0 {
                    continue;
                }
                if height_to_index(h).is_none() {
                    return Err(illegal(IllegalReason::SplitInvalidHeight));
                }
                let dest = neighbor_cid(actor, dir as u8)
                    .ok_or_else(|| illegal(IllegalReason::SplitDestinationOccupied))?;
                require_empty(&board, dest).map_err(|_| illegal(IllegalReason::SplitDestinationOccupied))?;
                sum += h as u32;
                destinations.push((dest, h));
            }
            if sum > unit.p as u32 {
                return Err(illegal(IllegalReason::SplitCapacityExceeded));
            }
            let remainder = unit.p as u32 - sum;
            let nonzero_neighbors = destinations.len();
            let remainder_nonzero = remainder > 0;
            if nonzero_neighbors + (remainder_nonzero as usize) < 2 {
                return Err(illegal(IllegalReason::SplitInsufficientSlots));
            }
            let raw_origin = RawUnit { color: unit.color, tribun: false, p: remainder as i32, s: unit.s as i32 };
            let normalized_origin = normalize(raw_origin);
            let origin_owned = matches!(normalized_origin, Some(u) if u.color == unit.color);
            if nonzero_neighbors + (origin_owned as usize) < 2 {
                return Err(illegal(IllegalReason::SplitInsufficientSlots));
            }
            for (dest, h) in destinations {
                board.set(dest, Some(Unit { color: unit.color, tribun: false, p: h, s: 0 }));
            }
            board.set(actor, normalized_origin);
        }
        Action::Backstabb { actor, dir } => {
            let unit = require_owned(&board, actor, state.turn)?;
            if unit.s == 0 {
                return Err(illegal(IllegalReason::BackstabbNoSlave));
            }
            let dest = neighbor_cid(actor, dir).ok_or_else(|| illegal(IllegalReason::BackstabbDestinationOccupied))?;
            require_empty(&board, dest).map_err(|_| illegal(IllegalReason::BackstabbDestinationOccupied))?;
            board.set(dest, Some(Unit { color: unit.color, tribun: unit.tribun, p: unit.p, s: 0 }));
            board.set(actor, None);
        }
        Action::AttackTribun { attacker, tribun, winner: w } => {
            require_turn(state.turn, w)?;
            let mover = require_owned(&board, attacker, state.turn)?;
            let victim = require_target(&board, tribun)?;
            if victim.color == state.turn {
                return Err(illegal(IllegalReason::TargetNotEnemy));
            }
            if !victim.tribun {
                return Err(illegal(IllegalReason::TargetNotTribun));
            }
            let mut reaches = reachable_attacks(&board, attacker, mover.p, mover.tribun, state.turn);
            if mover.s > 0 {
                reaches.extend(reachable_attacks(&board, attacker, mover.s, false, state.turn));
            }
            if !reaches.contains(&tribun) {
                return Err(illegal(IllegalReason::NoAttacker));
            }
            status = Status::Ended;
            winner = Some(state.turn);
            turn_flips = false;
        }
        Action::Draw { kind, actor } => {
            require_turn(state.turn, actor)?;
            match kind {
                DrawKind::Offer => {
                    if draw_offer_by.is_some() {
                        return Err(illegal(IllegalReason::DrawOfferPending));
                    }
                    draw_offer_by = Some(actor);
                }
                DrawKind::Retract => match draw_offer_by {
                    Some(c) if c == actor => draw_offer_by = None,
                    _ => return Err(illegal(IllegalReason::NoDrawOffer)),
                },
                DrawKind::Accept => match draw_offer_by {
                    Some(c) if c != actor => {
                        status = Status::Ended;
                        winner = None;
                        turn_flips = false;
                    }
                    Some(_) => return Err(illegal(IllegalReason::CannotAcceptOwnOffer)),
                    None => return Err(illegal(IllegalReason::NoDrawOffer)),
                },
            }
        }
        Action::End { reason, loser } => {
            require_turn(state.turn, loser)?;
            status = Status::Ended;
            winner = if matches!(reason, EndReason::TimeoutTie) { None } else { Some(!loser) };
            turn_flips = false;
        }
    }

    if !matches!(action, Action::Draw { .. }) {
        draw_offer_by = None;
    }

    let turn = if turn_flips { !state.turn } else { state.turn };
    Ok(State { board, turn, ply: state.ply + 1, draw_offer_by, status, winner })
}

fn validate_donation(donor: Unit, donate: u8) -> Result<(), CoreError> {
    if donor.tribun {
        if donate != donor.p {
            return Err(illegal(IllegalReason::TribunPartialDonation));
        }
    } else if donate == 0 || donate > donor.p {
        return Err(illegal(IllegalReason::DonateOutOfRange));
    }
    Ok(())
}

fn apply_donation(board: &mut Board, cid: Cid, donor: Unit, donate: u8) {
    let new_p = donor.p - donate;
    let tribun = donor.tribun && new_p > 0;
    let raw = RawUnit { color: donor.color, tribun, p: new_p as i32, s: donor.s as i32 };
    board.set(cid, normalize(raw));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::encode_action;
    use crate::state::State;
    use tribun_board::encode_cid;

    fn state_with(units: &[(Cid, Unit)], turn: Color) -> State {
        let mut board = Board::empty();
        for &(cid, unit) in units {
            board.set(cid, Some(unit));
        }
        State::new(board, turn)
    }

    #[test]
    fn game_ended_rejects_everything() {
        let mut state = state_with(&[], Color::Black);
        state.status = Status::Ended;
        let word = encode_action(Action::End { reason: EndReason::Resign, loser: Color::Black }).unwrap();
        let err = apply(&state, word).unwrap_err();
        assert_eq!(err, CoreError::Illegal(IllegalReason::GameEnded));
    }

    #[test]
    fn liberation_on_primary_move() {
        let origin = encode_cid(0, 0).unwrap();
        let dest = encode_cid(1, 1).unwrap();
        let unit = Unit { color: Color::Black, tribun: false, p: 4, s: 2 };
        let state = state_with(&[(origin, unit)], Color::Black);
        let word = encode_action(Action::Move { from: origin, to: dest, part: 0 }).unwrap();
        let next = apply(&state, word).unwrap();
        let moved = next.board.get(dest).unwrap().unwrap();
        assert_eq!(moved, Unit { color: Color::Black, tribun: false, p: 4, s: 0 });
        let freed = next.board.get(origin).unwrap().unwrap();
        assert_eq!(freed, Unit { color: Color::White, tribun: false, p: 2, s: 0 });
        assert_eq!(next.turn, Color::White);
        assert_eq!(next.ply, 1);
    }

    #[test]
    fn damage_is_not_normalized() {
        let target = encode_cid(2, 2).unwrap();
        let victim = Unit { color: Color::White, tribun: false, p: 3, s: 0 };
        let state = state_with(&[(target, victim)], Color::Black);
        let word = encode_action(Action::Damage { target, effective: 2 }).unwrap();
        let next = apply(&state, word).unwrap();
        let remaining = next.board.get(target).unwrap().unwrap();
        assert_eq!(remaining.p, 1);
    }

    #[test]
    fn damage_rejects_lethal_effective() {
        let target = encode_cid(2, 2).unwrap();
        let victim = Unit { color: Color::White, tribun: false, p: 3, s: 0 };
        let state = state_with(&[(target, victim)], Color::Black);
        let word = encode_action(Action::Damage { target, effective: 3 }).unwrap();
        assert!(apply(&state, word).is_err());
    }

    #[test]
    fn backstabb_destroys_the_slave() {
        let origin = encode_cid(0, 0).unwrap();
        let (dir, dest) = neighbors(origin).next().unwrap();
        let unit = Unit { color: Color::Black, tribun: true, p: 4, s: 2 };
        let state = state_with(&[(origin, unit)], Color::Black);
        let word = encode_action(Action::Backstabb { actor: origin, dir }).unwrap();
        let next = apply(&state, word).unwrap();
        assert_eq!(next.board.get(origin).unwrap(), None);
        let moved = next.board.get(dest).unwrap().unwrap();
        assert_eq!(moved, Unit { color: Color::Black, tribun: true, p: 4, s: 0 });
    }

    #[test]
    fn attack_tribun_ends_the_game() {
        let black_tribun = encode_cid(0, 0).unwrap();
        let white_tribun = encode_cid(1, 1).unwrap();
        let state = state_with(
            &[
                (black_tribun, Unit { color: Color::Black, tribun: true, p: 1, s: 0 }),
                (white_tribun, Unit { color: Color::White, tribun: true, p: 1, s: 0 }),
            ],
            Color::Black,
        );
        let word = encode_action(Action::AttackTribun {
            attacker: black_tribun,
            tribun: white_tribun,
            winner: Color::Black,
        })
        .unwrap();
        let next = apply(&state, word).unwrap();
        assert_eq!(next.status, Status::Ended);
        assert_eq!(next.winner, Some(Color::Black));
    }

    #[test]
    fn draw_lifecycle() {
        let state = state_with(&[], Color::Black);
        let offer = encode_action(Action::Draw { kind: DrawKind::Offer, actor: Color::Black }).unwrap();
        let after_offer = apply(&state, offer).unwrap();
        assert_eq!(after_offer.draw_offer_by, Some(Color::Black));
        assert_eq!(after_offer.turn, Color::White);

        let accept = encode_action(Action::Draw { kind: DrawKind::Accept, actor: Color::White }).unwrap();
        let after_accept = apply(&after_offer, accept).unwrap();
        assert_eq!(after_accept.status, Status::Ended);
        assert_eq!(after_accept.winner, None);
    }

    #[test]
    fn retract_by_wrong_color_is_illegal() {
        let mut state = state_with(&[], Color::White);
        state.draw_offer_by = Some(Color::Black);
        let retract = encode_action(Action::Draw { kind: DrawKind::Retract, actor: Color::White }).unwrap();
        assert!(apply(&state, retract).is_err());
    }

    #[test]
    fn non_draw_action_clears_pending_offer() {
        let origin = encode_cid(0, 0).unwrap();
        let dest = encode_cid(1, 0).unwrap();
        let unit = Unit { color: Color::Black, tribun: true, p: 1, s: 0 };
        let mut state = state_with(&[(origin, unit)], Color::Black);
        state.draw_offer_by = Some(Color::White);
        let word = encode_action(Action::Move { from: origin, to: dest, part: 0 }).unwrap();
        let next = apply(&state, word).unwrap();
        assert_eq!(next.draw_offer_by, None);
    }

    #[test]
    fn symmetric_combine_empties_donors_and_fills_center() {
        let center = encode_cid(0, 0).unwrap();
        let donor = Unit { color: Color::Black, tribun: false, p: 2, s: 0 };
        let dirs = [0u8, 4, 5];
        let donor_cids: Vec<Cid> = dirs.iter().map(|&d| neighbor_cid(center, d).unwrap()).collect();
        let units: Vec<(Cid, Unit)> = donor_cids.iter().map(|&c| (c, donor)).collect();
        let state = state_with(&units, Color::Black);
        let word = encode_action(Action::SymCombine { center, config: 1, donate: 2 }).unwrap();
        let next = apply(&state, word).unwrap();

        for &cid in &donor_cids {
            assert_eq!(next.board.get(cid).unwrap(), None);
        }
        let combined = next.board.get(center).unwrap().unwrap();
        assert_eq!(combined, Unit { color: Color::Black, tribun: false, p: 6, s: 0 });
    }
}
