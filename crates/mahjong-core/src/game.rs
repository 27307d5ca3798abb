//! Live match state: pair removal, linear undo/redo history, and hints.

use std::collections::BTreeMap;

use crate::{Error, Generator, Grid, Template, TileId, TileValue};

/// A live solitaire match. Owns the dealt grid, the move history, and the
/// hint cache; callers hold one `Game` per board instead of sharing module
/// state.
pub struct Game {
    grid: Grid,
    /// Removed pairs in order. Entries before `cursor` are done; anything
    /// from `cursor` onward is the redo tail.
    history: Vec<(TileId, TileId)>,
    cursor: usize,
    /// Free same-value groups, rebuilt lazily after any board change.
    hints: Option<Vec<Vec<TileId>>>,
    hint_index: usize,
}

impl Game {
    /// Build the grid from a template and deal a winnable board.
    pub fn new(template: &Template) -> Result<Self, Error> {
        Self::with_generator(template, &mut Generator::new())
    }

    /// Like [`Game::new`], but reproducible.
    pub fn with_seed(template: &Template, seed: u64) -> Result<Self, Error> {
        Self::with_generator(template, &mut Generator::with_seed(seed))
    }

    /// Build and deal with a caller-configured generator.
    pub fn with_generator(template: &Template, generator: &mut Generator) -> Result<Self, Error> {
        let mut grid = Grid::from_template(template);
        generator.deal(&mut grid)?;
        Ok(Self {
            grid,
            history: Vec::new(),
            cursor: 0,
            hints: None,
            hint_index: 0,
        })
    }

    /// The board snapshot: dimensions, per-coordinate lookup, tile state.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Whether a tile is uncovered and open on at least one side.
    pub fn is_free(&self, id: TileId) -> bool {
        self.grid.is_free(id)
    }

    /// Tiles still on the board.
    pub fn remaining(&self) -> usize {
        self.grid.remaining()
    }

    pub fn is_cleared(&self) -> bool {
        self.remaining() == 0
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// Remove a matching pair. Returns `false` with no state change for
    /// unknown ids, a self-pair, an already-removed tile, or differing
    /// values. Freeness is the caller's concern when picking candidates
    /// (e.g. via [`Game::tile_at`] plus [`Game::is_free`]); the value and
    /// identity checks are enforced here regardless.
    pub fn remove_pair(&mut self, a: TileId, b: TileId) -> bool {
        let (Some(tile_a), Some(tile_b)) = (self.grid.get(a), self.grid.get(b)) else {
            return false;
        };
        if a == b || tile_a.removed || tile_b.removed || tile_a.value != tile_b.value {
            return false;
        }
        // A new removal discards whatever was undone past the cursor.
        self.history.truncate(self.cursor);
        self.history.push((a, b));
        self.cursor = self.history.len();
        self.set_pair_removed(a, b, true);
        true
    }

    /// Step the history cursor back and restore that pair. Returns the pair
    /// so the presentation layer can bring it back, or `None` at the start
    /// of the history.
    pub fn undo(&mut self) -> Option<(TileId, TileId)> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let (a, b) = self.history[self.cursor];
        self.set_pair_removed(a, b, false);
        Some((a, b))
    }

    /// Re-remove the pair at the cursor and advance it. Returns the pair,
    /// or `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<(TileId, TileId)> {
        if self.cursor == self.history.len() {
            return None;
        }
        let (a, b) = self.history[self.cursor];
        self.cursor += 1;
        self.set_pair_removed(a, b, true);
        Some((a, b))
    }

    /// Resolve a tile from the grid coordinates of any of its four corners:
    /// tiles span two units per side, so the given point may be a tile's
    /// right column or bottom row (or both). Removed tiles do not resolve.
    pub fn tile_at(&self, x: usize, y: usize, z: usize) -> Option<TileId> {
        self.grid
            .tile_id_at(x, y, z)
            .or_else(|| y.checked_sub(1).and_then(|y| self.grid.tile_id_at(x, y, z)))
            .or_else(|| x.checked_sub(1).and_then(|x| self.grid.tile_id_at(x, y, z)))
            .or_else(|| {
                let (x, y) = (x.checked_sub(1)?, y.checked_sub(1)?);
                self.grid.tile_id_at(x, y, z)
            })
    }

    /// The next group of two or more free tiles sharing a value, cycling
    /// round-robin through all current groups; `None` when nothing is
    /// pairable right now. Groups are recomputed only after a removal,
    /// restoration, or new deal.
    pub fn hint(&mut self) -> Option<&[TileId]> {
        if self.hints.is_none() {
            self.hints = Some(self.compute_hints());
        }
        let groups = self.hints.as_deref()?;
        if groups.is_empty() {
            return None;
        }
        self.hint_index %= groups.len();
        let group = &groups[self.hint_index];
        self.hint_index += 1;
        Some(group)
    }

    fn compute_hints(&self) -> Vec<Vec<TileId>> {
        let mut groups: BTreeMap<TileValue, Vec<TileId>> = BTreeMap::new();
        for (id, tile) in self.grid.tiles() {
            if tile.removed || !self.grid.is_free(id) {
                continue;
            }
            if let Some(value) = tile.value {
                groups.entry(value).or_default().push(id);
            }
        }
        groups.into_values().filter(|group| group.len() > 1).collect()
    }

    fn set_pair_removed(&mut self, a: TileId, b: TileId, removed: bool) {
        self.grid.set_removed(a, removed);
        self.grid.set_removed(b, removed);
        self.hints = None;
        self.hint_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::template_from_art;

    /// Four tiles in a square: every tile has one open side, so all four
    /// are free from the start, and one value covers the whole board.
    fn square() -> Template {
        template_from_art(&[&["#.#", "...", "#.#"]])
    }

    /// Two such squares, far enough apart not to touch: eight free tiles,
    /// two values.
    fn two_squares() -> Template {
        template_from_art(&[&["#.#...#.#", ".........", "#.#...#.#"]])
    }

    fn free_tiles(game: &Game) -> Vec<TileId> {
        game.grid()
            .tiles()
            .filter(|&(id, tile)| !tile.removed && game.is_free(id))
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn minimal_board_clears_with_any_two_pairs() {
        let mut game = Game::with_seed(&square(), 42).unwrap();
        let tiles = free_tiles(&game);
        assert_eq!(tiles.len(), 4);
        assert_eq!(game.remaining(), 4);

        // One value on all four tiles, so any two of them pair.
        assert!(game.remove_pair(tiles[0], tiles[2]));
        assert!(game.remove_pair(tiles[1], tiles[3]));
        assert!(game.is_cleared());
    }

    #[test]
    fn remove_pair_rejects_bad_requests() {
        let mut game = Game::with_seed(&two_squares(), 1).unwrap();
        let tiles: Vec<TileId> = game.grid().tiles().map(|(id, _)| id).collect();

        // Self-pair.
        assert!(!game.remove_pair(tiles[0], tiles[0]));
        // Mismatched values (two values exist, each on four of eight tiles).
        let a = tiles[0];
        let b = *tiles[1..]
            .iter()
            .find(|&&id| game.grid().tile(id).value != game.grid().tile(a).value)
            .unwrap();
        assert!(!game.remove_pair(a, b));
        // Unknown id.
        assert!(!game.remove_pair(a, TileId(999)));
        assert_eq!(game.remaining(), 8);
        assert!(!game.can_undo());

        // Already-removed tiles.
        let c = *tiles[1..]
            .iter()
            .find(|&&id| game.grid().tile(id).value == game.grid().tile(a).value)
            .unwrap();
        assert!(game.remove_pair(a, c));
        assert!(!game.remove_pair(a, c));
        assert_eq!(game.remaining(), 6);
    }

    #[test]
    fn undo_redo_round_trips() {
        let mut game = Game::with_seed(&square(), 7).unwrap();
        let tiles = free_tiles(&game);
        assert!(game.remove_pair(tiles[0], tiles[1]));

        assert_eq!(game.undo(), Some((tiles[0], tiles[1])));
        assert_eq!(game.remaining(), 4);
        assert!(!game.grid().tile(tiles[0]).removed);
        assert!(!game.can_undo());
        assert!(game.can_redo());

        assert_eq!(game.redo(), Some((tiles[0], tiles[1])));
        assert_eq!(game.remaining(), 2);
        assert!(game.grid().tile(tiles[0]).removed);
        assert!(game.can_undo());
        assert!(!game.can_redo());

        // Past either end: no-ops.
        assert_eq!(game.redo(), None);
        game.undo();
        assert_eq!(game.undo(), None);
    }

    #[test]
    fn new_removal_discards_the_redo_tail() {
        let mut game = Game::with_seed(&square(), 3).unwrap();
        let t = free_tiles(&game);
        assert!(game.remove_pair(t[0], t[1]));
        assert!(game.remove_pair(t[2], t[3]));

        assert_eq!(game.undo(), Some((t[2], t[3])));
        // Diverge: a different second pair replaces the undone one.
        assert!(game.remove_pair(t[3], t[2]));
        assert_eq!(game.redo(), None);
        assert!(game.is_cleared());

        // The rewritten history unwinds cleanly.
        assert_eq!(game.undo(), Some((t[3], t[2])));
        assert_eq!(game.undo(), Some((t[0], t[1])));
        assert_eq!(game.undo(), None);
    }

    #[test]
    fn tile_at_resolves_every_corner() {
        // Single tile with its corner at (2, 1).
        let template = template_from_art(&[&["....", "..#.", "...."]]);
        // 1 tile is not dealable; build the board without a deal instead.
        assert!(Game::with_seed(&template, 0).is_err());

        let grid = Grid::from_template(&template);
        let id = grid.tile_id_at(2, 1, 0).unwrap();
        let mut game = Game {
            grid,
            history: Vec::new(),
            cursor: 0,
            hints: None,
            hint_index: 0,
        };

        for (x, y) in [(2, 1), (3, 1), (2, 2), (3, 2)] {
            assert_eq!(game.tile_at(x, y, 0), Some(id), "corner ({x}, {y})");
        }
        assert_eq!(game.tile_at(0, 0, 0), None);
        assert_eq!(game.tile_at(2, 1, 1), None);

        game.grid.set_removed(id, true);
        assert_eq!(game.tile_at(2, 1, 0), None);
    }

    #[test]
    fn hints_cycle_through_all_value_groups() {
        let mut game = Game::with_seed(&two_squares(), 11).unwrap();

        // Eight free tiles over two values: exactly two groups of four.
        let first = game.hint().unwrap().to_vec();
        assert_eq!(first.len(), 4);
        let second = game.hint().unwrap().to_vec();
        assert_ne!(first, second);
        // Wraps around without recomputing.
        assert_eq!(game.hint().unwrap(), &first[..]);
        assert_eq!(game.hint().unwrap(), &second[..]);

        let value_of = |game: &Game, group: &[TileId]| game.grid().tile(group[0]).value;
        assert_ne!(value_of(&game, &first), value_of(&game, &second));
    }

    #[test]
    fn hints_recompute_after_board_changes() {
        let mut game = Game::with_seed(&square(), 5).unwrap();
        let group = game.hint().unwrap().to_vec();
        assert_eq!(group.len(), 4);

        assert!(game.remove_pair(group[0], group[1]));
        let group = game.hint().unwrap().to_vec();
        assert_eq!(group.len(), 2);

        assert!(game.remove_pair(group[0], group[1]));
        assert_eq!(game.hint(), None);

        // Restoration invalidates too.
        game.undo();
        assert_eq!(game.hint().unwrap().len(), 2);
    }

    #[test]
    fn no_hint_when_free_tiles_cannot_pair() {
        // Hand-set values on a two-stack board so that each free top tile's
        // partner starts out covered: tiles remain, but nothing pairs.
        let template = template_from_art(&[&["#.#"], &["#.#"]]);
        let mut grid = Grid::from_template(&template);
        // Arena order: bottom-left, bottom-right, top-left, top-right.
        grid.set_values(&[0, 1, 1, 0]);
        let bottom_right = grid.tile_id_at(2, 0, 0).unwrap();
        let top_left = grid.tile_id_at(0, 0, 1).unwrap();
        let mut game = Game {
            grid,
            history: Vec::new(),
            cursor: 0,
            hints: None,
            hint_index: 0,
        };

        assert_eq!(game.remaining(), 4);
        assert_eq!(game.hint(), None);

        // Value checks alone gate removal, so the covered partner can still
        // come off; afterwards the two 0-valued tiles are both free.
        assert!(game.remove_pair(top_left, bottom_right));
        let group = game.hint().unwrap();
        assert_eq!(group.len(), 2);
    }
}
