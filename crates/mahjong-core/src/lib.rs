//! Core engine for layered mahjong-tower solitaire.
//!
//! The engine consumes a 3-D boolean [`Template`] describing tile
//! footprints, builds the tile [`Grid`] with the adjacency relations that
//! removal legality derives from, deals pairing values that are winnable by
//! construction ([`Generator`]), and runs the live match ([`Game`]): pair
//! removal, linear undo/redo, and hints.
//!
//! Rendering, pointer-to-grid mapping, and layout-file parsing are left to
//! frontends; the contract starts at the in-memory template and ends at
//! tile snapshots and move outcomes.

mod error;
mod game;
mod generator;
mod grid;

pub use error::Error;
pub use game::Game;
pub use generator::{Generator, GeneratorConfig};
pub use grid::{Grid, Template, Tile, TileId, TileValue};
