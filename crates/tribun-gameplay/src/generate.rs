use crate::action::{encode_action, Action, DrawKind, EndReason};
use crate::state::State;
use std::collections::HashMap;
use tribun_board::{
    all_cids, attack_participation, neighbor_cid, neighbors, normalize_no_liberate, reachable_moves,
    round_down, Board, RawUnit, Unit,
};
use tribun_core::Cid;

const SYM_CONFIGS: [(u8, &[u8]); 3] = [(0, &[0, 1, 2, 3, 4, 5]), (1, &[0, 4, 5]), (2, &[1, 2, 3])];
const SPLIT_VALUES: [u8; 6] = [0, 1, 2, 3, 4, 6];

/// Enumerates every legal action from `state`, sorted ascending and
/// duplicate-free. Returns an empty sequence once the game has ended.
pub fn generate(state: &State) -> Vec<u32> {
    if !state.is_active() {
        return Vec::new();
    }
    let mut actions = Vec::new();
    generate_moves(state, &mut actions);
    generate_attacks(state, &mut actions);
    generate_combine(state, &mut actions);
    generate_sym_combine(state, &mut actions);
    generate_split(state, &mut actions);
    generate_backstabb(state, &mut actions);
    generate_draw(state, &mut actions);
    generate_end(state, &mut actions);
    actions.sort_unstable();
    actions.dedup();
    log::trace!("generated {} legal actions for {}", actions.len(), state.turn);
    actions
}

fn push(out: &mut Vec<u32>, action: Action) {
    out.push(encode_action(action).expect("generator produced an unencodable action"));
}

fn generate_moves(state: &State, out: &mut Vec<u32>) {
    for (origin, unit) in state.board.units() {
        if unit.color != state.turn {
            continue;
        }
        for dest in reachable_moves(&state.board, origin, unit.p, unit.tribun, unit.color) {
            push(out, Action::Move { from: origin, to: dest, part: 0 });
        }
        if unit.s > 0 {
            for dest in reachable_moves(&state.board, origin, unit.s, false, unit.color) {
                push(out, Action::Move { from: origin, to: dest, part: 1 });
            }
        }
    }
}

fn generate_attacks(state: &State, out: &mut Vec<u32>) {
    let participation: HashMap<Cid, Vec<(Cid, u8, u8)>> = attack_participation(&state.board, state.turn);
    for (target, attackers) in participation {
        let Some(target_unit) = state.board.get(target).ok().flatten() else { continue };
        if attackers.is_empty() {
            continue;
        }
        if target_unit.tribun {
            let canonical = attackers.iter().map(|a| a.0).min().unwrap();
            push(
                out,
                Action::AttackTribun { attacker: canonical, tribun: target, winner: state.turn },
            );
            continue;
        }
        let strength: u32 = attackers.iter().map(|&(_, _, h)| h as u32).sum();
        let required = target_unit.p as u32;
        if strength >= required && target_unit.s == 0 {
            for &(attacker, part, _) in attackers.iter().filter(|&&(_, part, _)| part == 0) {
                let Some(mover) = state.board.get(attacker).ok().flatten() else { continue };
                let raw = RawUnit {
                    color: mover.color,
                    tribun: mover.tribun,
                    p: mover.p as i32,
                    s: target_unit.p as i32,
                };
                if normalize_no_liberate(raw).is_some() {
                    push(out, Action::Enslave { attacker, target });
                }
            }
        } else if strength >= required {
            for &(attacker, part, _) in &attackers {
                push(out, Action::Kill { attacker, target, part });
            }
            if target_unit.s > 0 {
                push(out, Action::Liberate { target });
            }
        } else if strength > 0 {
            // Bake the post-normalization decrement here: applying the raw
            // `strength` could leave `target.p` on a value outside
            // VALID_HEIGHTS (e.g. 6 - 1 = 5). Round the post-damage height
            // down to the nearest valid height first, then derive the
            // decrement that lands exactly there.
            let post = round_down(required as i32 - strength as i32);
            let effective = required as u8 - post;
            push(out, Action::Damage { target, effective });
        }
    }
}

fn generate_combine(state: &State, out: &mut Vec<u32>) {
    for center in all_cids() {
        if !matches!(state.board.get(center), Ok(None)) {
            continue;
        }
        let donors: Vec<(u8, Unit)> = neighbors(center)
            .filter_map(|(dir, n)| {
                state
                    .board
                    .get(n)
                    .ok()
                    .flatten()
                    .filter(|u| u.color == state.turn)
                    .map(|u| (dir, u))
            })
            .collect();
        for i in 0..donors.len() {
            for j in (i + 1)..donors.len() {
                let mut pair = [donors[i], donors[j]];
                pair.sort_by_key(|&(d, _)| d);
                let (dir_a, ua) = pair[0];
                let (dir_b, ub) = pair[1];
                let range_a: Vec<u8> = if ua.tribun { vec![ua.p] } else { (1..=ua.p).collect() };
                let range_b: Vec<u8> = if ub.tribun { vec![ub.p] } else { (1..=ub.p).collect() };
                for &donate_a in &range_a {
                    for &donate_b in &range_b {
                        push(
                            out,
                            Action::Combine { center, dir_a, dir_b, donate_a, donate_b },
                        );
                    }
                }
            }
        }
    }
}

fn generate_sym_combine(state: &State, out: &mut Vec<u32>) {
    for center in all_cids() {
        if !matches!(state.board.get(center), Ok(None)) {
            continue;
        }
        for &(config, dirs) in &SYM_CONFIGS {
            let mut units = Vec::with_capacity(dirs.len());
            let mut eligible = true;
            for &d in dirs {
                match neighbor_cid(center, d).and_then(|n| state.board.get(n).ok().flatten()) {
                    Some(u) if u.color == state.turn && !u.tribun => units.push(u),
                    _ => {
                        eligible = false;
                        break;
                    }
                }
            }
            if !eligible {
                continue;
            }
            let first = units[0];
            if !units.iter().all(|&u| u == first) {
                continue;
            }
            let max_donate = if config == 0 { 1 } else { 2 };
            for donate in 1..=max_donate {
                if first.p >= donate {
                    push(out, Action::SymCombine { center, config, donate });
                }
            }
        }
    }
}

fn generate_split(state: &State, out: &mut Vec<u32>) {
    for (origin, unit) in state.board.units() {
        if unit.color != state.turn || unit.tribun {
            continue;
        }
        let mut heights = [0u8; 6];
        split_recurse(state, origin, unit, 0, unit.p as i32, &mut heights, out);
    }
}

fn split_recurse(
    state: &State,
    origin: Cid,
    unit: Unit,
    dir: u8,
    remaining: i32,
    heights: &mut [u8; 6],
    out: &mut Vec<u32>,
) {
    if dir == 6 {
        split_finalize(state, origin, unit, remaining, heights, out);
        return;
    }
    let target_empty = matches!(
        neighbor_cid(origin, dir).map(|n| state.board.get(n)),
        Some(Ok(None))
    );
    if !target_empty {
        heights[dir as usize] = 0;
        split_recurse(state, origin, unit, dir + 1, remaining, heights, out);
        return;
    }
    for &val in &SPLIT_VALUES {
        if val as i32 <= remaining {
            heights[dir as usize] = val;
            split_recurse(state, origin, unit, dir + 1, remaining - val as i32, heights, out);
        }
    }
}

fn split_finalize(state: &State, origin: Cid, unit: Unit, remainder: i32, heights: &[u8; 6], out: &mut Vec<u32>) {
    let nonzero_neighbors = heights.iter().filter(|&&h| h > 0).count();
    let remainder_nonzero = remainder > 0;
    if nonzero_neighbors + (remainder_nonzero as usize) < 2 {
        return;
    }
    let raw_origin = RawUnit { color: unit.color, tribun: false, p: remainder, s: unit.s as i32 };
    let origin_owned = matches!(
        tribun_board::normalize(raw_origin),
        Some(u) if u.color == unit.color
    );
    let owned_count = nonzero_neighbors + (origin_owned as usize);
    if owned_count < 2 {
        return;
    }
    push(out, Action::Split { actor: origin, heights: *heights });
}

fn generate_backstabb(state: &State, out: &mut Vec<u32>) {
    for (origin, unit) in state.board.units() {
        if unit.color != state.turn || unit.s == 0 {
            continue;
        }
        for (dir, n) in neighbors(origin) {
            if matches!(state.board.get(n), Ok(None)) {
                push(out, Action::Backstabb { actor: origin, dir });
            }
        }
    }
}

fn generate_draw(state: &State, out: &mut Vec<u32>) {
    match state.draw_offer_by {
        None => push(out, Action::Draw { kind: DrawKind::Offer, actor: state.turn }),
        Some(c) if c == state.turn => push(out, Action::Draw { kind: DrawKind::Retract, actor: state.turn }),
        Some(_) => push(out, Action::Draw { kind: DrawKind::Accept, actor: state.turn }),
    }
}

fn generate_end(state: &State, out: &mut Vec<u32>) {
    push(out, Action::End { reason: EndReason::Resign, loser: state.turn });
}
