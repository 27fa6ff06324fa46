//! The hex board: tile geometry, the unit model, and height-indexed
//! movement and attack reachability.
//!
//! ## Geometry
//!
//! - [`encode_cid`] / [`decode_cid`] — axial coordinate <-> tile id
//! - [`neighbor_cid`] / [`are_adjacent`] — the six-neighbor hex grid
//!
//! ## Units
//!
//! - [`Unit`] — a tile's primary/secondary height pair, color, and tribun flag
//! - [`unit_to_byte`] / [`byte_to_unit`] — the 1-byte wire encoding
//! - [`normalize`] — the four-step rounding/slave-property/liberation pipeline
//!
//! ## Board
//!
//! - [`Board`] — 121 tiles indexed by [`Cid`](tribun_core::Cid)
//!
//! ## Reachability
//!
//! - [`reachable_moves`] / [`reachable_attacks`] — per-height movement and
//!   attack candidate tiles

mod board;
mod geometry;
mod height;
mod patterns;
mod unit;

pub use board::*;
pub use geometry::*;
pub use height::*;
pub use patterns::*;
pub use unit::*;
