use crate::board::Board;
use crate::geometry::{decode_cid, encode_cid, neighbors, DIRECTIONS};
use std::collections::VecDeque;
use tribun_core::{Cid, Color};

/// Knight-like offsets shared by height 2, the slide base for heights 4/6,
/// and height 8's unconditional ranged attack.
const OFFSETS_H2: [(i8, i8); 6] = [(1, 2), (-1, -2), (-1, 1), (1, -1), (2, 1), (-2, -1)];

const OFFSETS_H3: [(i8, i8); 12] = [
    (3, 2),
    (-3, -2),
    (2, 3),
    (-2, -3),
    (1, 3),
    (-1, -3),
    (3, 1),
    (-3, -1),
    (-1, 2),
    (1, -2),
    (2, -1),
    (-2, 1),
];

fn apply_offset(cid: Cid, offset: (i8, i8), scale: i8) -> Option<Cid> {
    let (x, y) = decode_cid(cid).ok()?;
    encode_cid(x + offset.0 * scale, y + offset.1 * scale).ok()
}

fn color_offset(color: Color, offset: (i8, i8)) -> (i8, i8) {
    match color {
        Color::Black => offset,
        Color::White => (-offset.0, -offset.1),
    }
}

/// Every empty tile the unit at `origin` can move to this turn, using the
/// pattern for `height`/`tribun`/`color`.
pub fn reachable_moves(board: &Board, origin: Cid, height: u8, tribun: bool, color: Color) -> Vec<Cid> {
    let mut out = Vec::new();
    match height {
        1 => {
            if tribun {
                for (_, dest) in neighbors(origin) {
                    if is_empty(board, dest) {
                        out.push(dest);
                    }
                }
            } else {
                let (dx, dy) = color_offset(color, (1, 1));
                if let Ok((x, y)) = decode_cid(origin) {
                    if let Ok(dest) = encode_cid(x + dx, y + dy) {
                        if is_empty(board, dest) {
                            out.push(dest);
                        }
                    }
                }
            }
        }
        2 => push_offset_targets(board, origin, &OFFSETS_H2, 1, TargetKind::Empty, &mut out),
        3 => push_offset_targets(board, origin, &OFFSETS_H3, 1, TargetKind::Empty, &mut out),
        4 | 6 => push_slide_moves(board, origin, &OFFSETS_H2, &mut out),
        8 => {
            for (_, dest) in neighbors(origin) {
                if is_empty(board, dest) {
                    out.push(dest);
                }
            }
            push_h8_jumps(board, origin, color, TargetKind::Empty, &mut out);
        }
        _ => {}
    }
    out
}

/// Every enemy-occupied tile the unit at `origin` can attack this turn.
pub fn reachable_attacks(board: &Board, origin: Cid, height: u8, _tribun: bool, color: Color) -> Vec<Cid> {
    let mut out = Vec::new();
    match height {
        1 => {
            if _tribun {
                for (_, dest) in neighbors(origin) {
                    if holds_enemy(board, dest, color) {
                        out.push(dest);
                    }
                }
            } else {
                for base in [(1, 0), (0, 1)] {
                    let (dx, dy) = color_offset(color, base);
                    if let Ok((x, y)) = decode_cid(origin) {
                        if let Ok(dest) = encode_cid(x + dx, y + dy) {
                            if holds_enemy(board, dest, color) {
                                out.push(dest);
                            }
                        }
                    }
                }
            }
        }
        2 => push_offset_targets(board, origin, &OFFSETS_H2, 1, TargetKind::Enemy(color), &mut out),
        3 => push_offset_targets(board, origin, &OFFSETS_H3, 1, TargetKind::Enemy(color), &mut out),
        4 => push_slide_attack(board, origin, &OFFSETS_H2, color, &mut out),
        6 => push_bfs_attack(board, origin, color, &mut out),
        8 => {
            // Unconditional ranged attack via the h2 knight pattern.
            push_offset_targets(board, origin, &OFFSETS_H2, 1, TargetKind::Enemy(color), &mut out);
            for (_, dest) in neighbors(origin) {
                if holds_enemy(board, dest, color) {
                    out.push(dest);
                }
            }
            push_h8_jumps(board, origin, color, TargetKind::Enemy(color), &mut out);
        }
        _ => {}
    }
    out
}

#[derive(Clone, Copy)]
enum TargetKind {
    Empty,
    Enemy(Color),
}

fn is_empty(board: &Board, cid: Cid) -> bool {
    matches!(board.get(cid), Ok(None))
}

fn holds_enemy(board: &Board, cid: Cid, color: Color) -> bool {
    matches!(board.get(cid), Ok(Some(u)) if u.color != color)
}

fn matches_kind(board: &Board, cid: Cid, kind: TargetKind) -> bool {
    match kind {
        TargetKind::Empty => is_empty(board, cid),
        TargetKind::Enemy(color) => holds_enemy(board, cid, color),
    }
}

fn push_offset_targets(
    board: &Board,
    origin: Cid,
    offsets: &[(i8, i8)],
    scale: i8,
    kind: TargetKind,
    out: &mut Vec<Cid>,
) {
    for &offset in offsets {
        if let Some(dest) = apply_offset(origin, offset, scale) {
            if matches_kind(board, dest, kind) {
                out.push(dest);
            }
        }
    }
}

/// Slides along each offset direction, collecting the empty prefix (stops
/// before the first occupied tile or the board edge).
fn push_slide_moves(board: &Board, origin: Cid, offsets: &[(i8, i8)], out: &mut Vec<Cid>) {
    for &offset in offsets {
        let mut scale = 1;
        while let Some(dest) = apply_offset(origin, offset, scale) {
            if !is_empty(board, dest) {
                break;
            }
            out.push(dest);
            scale += 1;
        }
    }
}

/// Slides to the first occupied tile along each offset direction; counts as
/// an attack only if that tile holds an enemy.
fn push_slide_attack(board: &Board, origin: Cid, offsets: &[(i8, i8)], color: Color, out: &mut Vec<Cid>) {
    for &offset in offsets {
        let mut scale = 1;
        while let Some(dest) = apply_offset(origin, offset, scale) {
            if is_empty(board, dest) {
                scale += 1;
                continue;
            }
            if holds_enemy(board, dest, color) {
                out.push(dest);
            }
            break;
        }
    }
}

/// Breadth-first search over the six-neighbor hex graph; the first occupied
/// tile encountered (at any distance) is the sole attack candidate, and it
/// only counts if it holds an enemy. A friendly unit blocks the search
/// unconditionally, regardless of distance.
fn push_bfs_attack(board: &Board, origin: Cid, color: Color, out: &mut Vec<Cid>) {
    let mut seen = [false; crate::board::TILE_COUNT];
    seen[origin as usize] = true;
    let mut queue: VecDeque<Cid> = neighbors(origin).map(|(_, n)| n).collect();
    for cid in queue.iter() {
        seen[*cid as usize] = true;
    }
    while let Some(cid) = queue.pop_front() {
        match board.get(cid) {
            Ok(None) => {
                for (_, next) in neighbors(cid) {
                    if !seen[next as usize] {
                        seen[next as usize] = true;
                        queue.push_back(next);
                    }
                }
            }
            Ok(Some(unit)) => {
                if unit.color != color {
                    out.push(cid);
                }
                return;
            }
            Err(_) => {}
        }
    }
}

/// Height 8's extended jump: for each of the six neighbor directions, the
/// unit may also reach `2 * direction` provided the intermediate tile is
/// empty or same-color (jumping over an enemy is forbidden).
fn push_h8_jumps(board: &Board, origin: Cid, color: Color, kind: TargetKind, out: &mut Vec<Cid>) {
    for &d in &DIRECTIONS {
        let Some(mid) = apply_offset(origin, d, 1) else { continue };
        let blocked_by_enemy = matches!(board.get(mid), Ok(Some(u)) if u.color != color);
        if blocked_by_enemy {
            continue;
        }
        if let Some(dest) = apply_offset(origin, d, 2) {
            if matches_kind(board, dest, kind) {
                out.push(dest);
            }
        }
    }
}

/// Every enemy tile reachable from `color`'s units this ply, grouped by
/// target, paired with the attacking tile, the part used (`0` primary, `1`
/// secondary), and the height that reached it.
pub fn attack_participation(board: &Board, color: Color) -> std::collections::HashMap<Cid, Vec<(Cid, u8, u8)>> {
    use std::collections::HashMap;
    let mut map: HashMap<Cid, Vec<(Cid, u8, u8)>> = HashMap::new();
    for (origin, unit) in board.units() {
        if unit.color != color {
            continue;
        }
        for target in reachable_attacks(board, origin, unit.p, unit.tribun, unit.color) {
            map.entry(target).or_default().push((origin, 0, unit.p));
        }
        if unit.s > 0 {
            for target in reachable_attacks(board, origin, unit.s, false, unit.color) {
                map.entry(target).or_default().push((origin, 1, unit.s));
            }
        }
    }
    map
}
