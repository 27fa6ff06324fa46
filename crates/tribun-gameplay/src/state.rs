use tribun_board::Board;
use tribun_core::{Color, Ply};

/// Whether the game is still being played or has concluded.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Active,
    Ended,
}

/// The complete, memoryless present of a game in progress: board, whose
/// turn it is, the ply counter, any pending draw offer, and whether the
/// game has ended.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    pub board: Board,
    pub turn: Color,
    pub ply: Ply,
    pub draw_offer_by: Option<Color>,
    pub status: Status,
    pub winner: Option<Color>,
}

impl State {
    pub fn new(board: Board, turn: Color) -> Self {
        State {
            board,
            turn,
            ply: 0,
            draw_offer_by: None,
            status: Status::Active,
            winner: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}
