use crate::apply::apply;
use crate::state::State;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tribun_board::Board;
use tribun_core::{Color, CoreError};

/// A transportable game snapshot: the board and whose turn it is when the
/// snapshot was taken. Replaying a recorded action sequence from here must
/// reproduce the exact same terminal state every time.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub board: Board,
    pub initial_turn: Color,
}

impl Snapshot {
    pub fn new(board: Board, initial_turn: Color) -> Self {
        Snapshot { board, initial_turn }
    }

    pub fn to_state(&self) -> State {
        State::new(self.board, self.initial_turn)
    }
}

/// Base64-encodes the 121 raw board bytes for a text envelope.
pub fn pack_board(board: &Board) -> String {
    STANDARD.encode(board.to_bytes())
}

/// Decodes a base64-packed board, validating every tile byte.
pub fn unpack_board(encoded: &str) -> Result<Board, CoreError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| CoreError::MalformedSnapshot("not valid base64"))?;
    let array: [u8; tribun_board::TILE_COUNT] = bytes
        .try_into()
        .map_err(|_| CoreError::MalformedSnapshot("expected 121 bytes"))?;
    Board::from_bytes(array)
}

/// Left-folds `apply` over `actions` starting from `snapshot`. Stops and
/// returns the first error encountered; the caller decides whether a replay
/// failure is fatal or merely truncates at the point of divergence.
pub fn replay(snapshot: &Snapshot, actions: &[u32]) -> Result<State, CoreError> {
    let mut state = snapshot.to_state();
    for &action in actions {
        state = apply(&state, action)?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{encode_action, Action};
    use tribun_board::{encode_cid, Unit};

    #[test]
    fn board_round_trips_through_base64() {
        let mut board = Board::empty();
        let cid = encode_cid(0, 0).unwrap();
        board.set(cid, Some(Unit { color: Color::Black, tribun: true, p: 4, s: 0 }));
        let packed = pack_board(&board);
        assert_eq!(unpack_board(&packed).unwrap(), board);
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        let short = STANDARD.encode([0u8; 10]);
        assert!(unpack_board(&short).is_err());
    }

    #[test]
    fn replay_is_deterministic() {
        let origin = encode_cid(0, 0).unwrap();
        let dest = encode_cid(1, 1).unwrap();
        let mut board = Board::empty();
        board.set(origin, Some(Unit { color: Color::Black, tribun: true, p: 1, s: 0 }));
        let snapshot = Snapshot::new(board, Color::Black);
        let actions = vec![encode_action(Action::Move { from: origin, to: dest, part: 0 }).unwrap()];

        let first = replay(&snapshot, &actions).unwrap();
        let second = replay(&snapshot, &actions).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.board.get(dest).unwrap().unwrap().p, 1);
    }

    #[test]
    fn replay_stops_at_first_illegal_action() {
        let snapshot = Snapshot::new(Board::empty(), Color::Black);
        let bogus = encode_action(Action::Liberate { target: 0 }).unwrap();
        assert!(replay(&snapshot, &[bogus]).is_err());
    }

    fn starting_snapshot() -> Snapshot {
        let mut board = Board::empty();
        let black = encode_cid(-2, 0).unwrap();
        let white = encode_cid(2, 0).unwrap();
        board.set(black, Some(Unit { color: Color::Black, tribun: true, p: 4, s: 0 }));
        board.set(white, Some(Unit { color: Color::White, tribun: true, p: 4, s: 0 }));
        Snapshot::new(board, Color::Black)
    }

    /// Walks a fixed number of plies from `snapshot`, at each step picking
    /// the legal action at `indices[i] % legal.len()`. Returns the actions
    /// actually taken, stopping early if the game ends or runs dry.
    fn walk(snapshot: &Snapshot, indices: &[usize]) -> Vec<u32> {
        let mut state = snapshot.to_state();
        let mut taken = Vec::new();
        for &idx in indices {
            if !state.is_active() {
                break;
            }
            let legal = crate::generate::generate(&state);
            if legal.is_empty() {
                break;
            }
            let action = legal[idx % legal.len()];
            state = apply(&state, action).expect("generated action must apply");
            taken.push(action);
        }
        taken
    }

    proptest::proptest! {
        #[test]
        fn replay_is_deterministic_over_generated_action_sequences(
            indices in proptest::collection::vec(0usize..64, 0..8)
        ) {
            let snapshot = starting_snapshot();
            let actions = walk(&snapshot, &indices);

            let first = replay(&snapshot, &actions).unwrap();
            let second = replay(&snapshot, &actions).unwrap();
            proptest::prop_assert_eq!(first, second);
        }
    }
}
