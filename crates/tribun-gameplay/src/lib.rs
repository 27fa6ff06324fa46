//! The action codec, legal-move generator, applier, Bloom legality witness,
//! and snapshot/replay driver.
//!
//! ## Actions
//!
//! - [`Action`] — a decoded game action
//! - [`encode_action`] / [`decode_action`] — the 32-bit wire codec
//!
//! ## State
//!
//! - [`State`] — board, turn, ply, and draw-offer/terminal status
//! - [`generate`] — every legal action from the current state
//! - [`apply`] — the pure state transition for one action
//!
//! ## Legality witnesses
//!
//! - [`Bloom`] — a Bloom filter over a legal-move set, for compact
//!   opponent-side legality checks
//!
//! ## Snapshot and replay
//!
//! - [`Snapshot`] — a base64-transportable board snapshot
//! - [`replay`] — folds `apply` over an action sequence from an initial state

mod action;
mod apply;
mod bloom;
mod generate;
mod snapshot;
mod state;

pub use action::*;
pub use apply::*;
pub use bloom::*;
pub use generate::*;
pub use snapshot::*;
pub use state::*;
