//! Board model for dropgrid.
//!
//! This crate is the bottom of the stack and has no async or I/O in it:
//!
//! - **Cells** ([`Cell`], [`Alliance`], [`CellCoord`], [`Placement`]):
//!   what a grid position can hold and how it is addressed.
//! - **Board** ([`BoardState`], [`BoardConfig`]): the gravity grid and its
//!   positional string encoding.
//! - **Lines** ([`WinDetector`], [`WinLine`], [`Evaluation`]): run
//!   detection along the four orientations.
//!
//! ```text
//! Authority (mutates)  →  Board (this crate)  ←  Mirrors (apply placements)
//! ```

mod board;
mod cell;
mod config;
mod error;
mod win;

pub use board::BoardState;
pub use cell::{Alliance, Cell, CellCoord, Placement};
pub use config::BoardConfig;
pub use error::BoardError;
pub use win::{Direction, Evaluation, WinDetector, WinLine};
