//! Falling-block puzzle engine.
//!
//! The crate is a pure state machine: it never renders, plays audio or
//! touches the filesystem. A host feeds it player [`Action`]s and elapsed
//! time through [`GameSession`], then polls [`GameSession::snapshot`] and
//! drains [`GameEvent`]s for presentation.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

mod serde_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece locked with cells above the visible board")]
pub struct PieceOverflowError;
