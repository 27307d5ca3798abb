//! Tile grid: template validation, tile placement, and the adjacency
//! relations that removal legality derives from.
//!
//! Tiles are two grid units wide and two tall, so a template cell marks a
//! tile's top-left corner, horizontal neighbors sit two columns apart, and a
//! tile in the layer above can cover up to four tiles beneath it.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Pairing value carried by a tile. A dealt board of `n` tiles uses the
/// values `0..n/4`, each on exactly four tiles.
pub type TileValue = u16;

/// Index of a tile in its grid's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub(crate) usize);

impl TileId {
    /// Arena index, for presentation-side lookup tables.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Tile footprint template: a layer-major (`[z][y][x]`) boolean array where
/// `true` marks the top-left corner of a tile. Bottom layer first.
///
/// How such an array is produced (layout files, level editors) is the
/// caller's concern; the engine only checks that the box is rectangular.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Vec<bool>>>", into = "Vec<Vec<Vec<bool>>>")]
pub struct Template {
    layers: Vec<Vec<Vec<bool>>>,
    rows: usize,
    cols: usize,
}

impl Template {
    /// Validate a layer-major boolean array: every layer must have the same
    /// number of rows and every row the same number of columns.
    pub fn new(layers: Vec<Vec<Vec<bool>>>) -> Result<Self, Error> {
        let rows = layers.first().map_or(0, Vec::len);
        let cols = layers.first().and_then(|l| l.first()).map_or(0, Vec::len);
        for (z, layer) in layers.iter().enumerate() {
            if layer.len() != rows {
                return Err(Error::IrregularTemplate {
                    layer: z,
                    detail: format!("expected {rows} rows, found {}", layer.len()),
                });
            }
            for row in layer {
                if row.len() != cols {
                    return Err(Error::IrregularTemplate {
                        layer: z,
                        detail: format!("expected {cols} columns, found {}", row.len()),
                    });
                }
            }
        }
        Ok(Self { layers, rows, cols })
    }

    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Rows per layer.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns per row.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether a tile footprint starts at these coordinates.
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        self.layers
            .get(z)
            .and_then(|layer| layer.get(y))
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// Number of tiles the template places.
    pub fn tile_count(&self) -> usize {
        self.layers
            .iter()
            .flatten()
            .flatten()
            .filter(|&&cell| cell)
            .count()
    }
}

impl TryFrom<Vec<Vec<Vec<bool>>>> for Template {
    type Error = Error;

    fn try_from(layers: Vec<Vec<Vec<bool>>>) -> Result<Self, Error> {
        Self::new(layers)
    }
}

impl From<Template> for Vec<Vec<Vec<bool>>> {
    fn from(template: Template) -> Self {
        template.layers
    }
}

/// A single tile. Coordinates and adjacency are fixed at build time; `value`
/// is assigned once when the board is dealt; `removed` is the only field
/// that changes during play.
#[derive(Debug, Clone, Serialize)]
pub struct Tile {
    /// Column of the top-left corner.
    pub x: usize,
    /// Row of the top-left corner.
    pub y: usize,
    /// Layer.
    pub z: usize,
    /// Pairing value, `None` until the board is dealt.
    pub value: Option<TileValue>,
    /// Tombstone flag. Removed tiles stay in the arena so adjacency lists
    /// remain dereferenceable through undo cycles.
    pub removed: bool,
    #[serde(skip)]
    pub(crate) left: Vec<TileId>,
    #[serde(skip)]
    pub(crate) right: Vec<TileId>,
    #[serde(skip)]
    pub(crate) below: Vec<TileId>,
    #[serde(skip)]
    pub(crate) above: Vec<TileId>,
}

impl Tile {
    fn new(x: usize, y: usize, z: usize) -> Self {
        Self {
            x,
            y,
            z,
            value: None,
            removed: false,
            left: Vec::new(),
            right: Vec::new(),
            below: Vec::new(),
            above: Vec::new(),
        }
    }

    /// Tiles one tile-width to the left, at up to three vertical offsets.
    pub fn left(&self) -> &[TileId] {
        &self.left
    }

    /// Tiles one tile-width to the right, at up to three vertical offsets.
    pub fn right(&self) -> &[TileId] {
        &self.right
    }

    /// Tiles in the layer beneath that this tile at least partly covers.
    pub fn below(&self) -> &[TileId] {
        &self.below
    }

    /// Tiles in the layer above that at least partly cover this tile.
    pub fn above(&self) -> &[TileId] {
        &self.above
    }
}

/// One tile-width left or right, level or half a tile up or down.
const LEFT_OFFSETS: [(isize, isize, isize); 3] = [(-2, -1, 0), (-2, 0, 0), (-2, 1, 0)];
const RIGHT_OFFSETS: [(isize, isize, isize); 3] = [(2, -1, 0), (2, 0, 0), (2, 1, 0)];

/// One layer down: directly underneath, or overlapping by a half or a
/// quarter footprint.
const BELOW_OFFSETS: [(isize, isize, isize); 9] = [
    (-1, -1, -1),
    (-1, 0, -1),
    (-1, 1, -1),
    (0, 1, -1),
    (1, 1, -1),
    (1, 0, -1),
    (1, -1, -1),
    (0, -1, -1),
    (0, 0, -1),
];

/// The built board: a tile arena plus a dense `[z][y][x]` coordinate index.
/// Coordinates never change after construction; removal only flips a tile's
/// tombstone flag.
#[derive(Debug, Clone)]
pub struct Grid {
    tiles: Vec<Tile>,
    index: Vec<Vec<Vec<Option<TileId>>>>,
    depth: usize,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Place a tile for every `true` template cell, then probe the fixed
    /// offsets around each tile to record its adjacency.
    pub fn from_template(template: &Template) -> Self {
        let mut tiles = Vec::with_capacity(template.tile_count());
        let index = (0..template.depth())
            .map(|z| {
                (0..template.rows())
                    .map(|y| {
                        (0..template.cols())
                            .map(|x| {
                                template.contains(x, y, z).then(|| {
                                    let id = TileId(tiles.len());
                                    tiles.push(Tile::new(x, y, z));
                                    id
                                })
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        let mut grid = Self {
            tiles,
            index,
            depth: template.depth(),
            rows: template.rows(),
            cols: template.cols(),
        };
        grid.link_neighbors();
        grid
    }

    fn link_neighbors(&mut self) {
        for i in 0..self.tiles.len() {
            let (x, y, z) = {
                let tile = &self.tiles[i];
                (tile.x, tile.y, tile.z)
            };
            for &offset in &LEFT_OFFSETS {
                if let Some(other) = self.probe(x, y, z, offset) {
                    self.tiles[i].left.push(other);
                }
            }
            for &offset in &RIGHT_OFFSETS {
                if let Some(other) = self.probe(x, y, z, offset) {
                    self.tiles[i].right.push(other);
                }
            }
            for &offset in &BELOW_OFFSETS {
                if let Some(other) = self.probe(x, y, z, offset) {
                    self.tiles[i].below.push(other);
                    self.tiles[other.0].above.push(TileId(i));
                }
            }
        }
    }

    fn probe(&self, x: usize, y: usize, z: usize, (dx, dy, dz): (isize, isize, isize)) -> Option<TileId> {
        let x = x.checked_add_signed(dx)?;
        let y = y.checked_add_signed(dy)?;
        let z = z.checked_add_signed(dz)?;
        *self.index.get(z)?.get(y)?.get(x)?
    }

    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Rows per layer.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns per row.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of tiles, removed ones included.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles still on the board.
    pub fn remaining(&self) -> usize {
        self.tiles.iter().filter(|tile| !tile.removed).count()
    }

    /// The tile for an id. Panics on an id from another grid.
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.0]
    }

    /// Fallible lookup for ids of unknown provenance.
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    /// All tiles with their ids, in arena order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles.iter().enumerate().map(|(i, tile)| (TileId(i), tile))
    }

    /// The tile whose top-left corner is exactly at these coordinates, if it
    /// is still on the board.
    pub fn tile_id_at(&self, x: usize, y: usize, z: usize) -> Option<TileId> {
        let id = (*self.index.get(z)?.get(y)?.get(x)?)?;
        (!self.tiles[id.0].removed).then_some(id)
    }

    /// A tile may be removed when nothing still covers it from above and at
    /// least one horizontal side is completely open. Recomputed from the
    /// tombstone flags on every call, so it is never stale across removals
    /// and restorations.
    pub fn is_free(&self, id: TileId) -> bool {
        let tile = &self.tiles[id.0];
        self.all_removed(&tile.above)
            && (self.all_removed(&tile.left) || self.all_removed(&tile.right))
    }

    fn all_removed(&self, ids: &[TileId]) -> bool {
        ids.iter().all(|&id| self.tiles[id.0].removed)
    }

    pub(crate) fn set_removed(&mut self, id: TileId, removed: bool) {
        self.tiles[id.0].removed = removed;
    }

    pub(crate) fn set_values(&mut self, values: &[TileValue]) {
        for (tile, &value) in self.tiles.iter_mut().zip(values) {
            tile.value = Some(value);
        }
    }
}

/// Test boards are easiest to read as layer art: one string per row, `.` for
/// empty, anything else for a tile corner.
#[cfg(test)]
pub(crate) fn template_from_art(layers: &[&[&str]]) -> Template {
    Template::new(
        layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|row| row.chars().map(|c| c != '.').collect())
                    .collect()
            })
            .collect(),
    )
    .expect("test template should be rectangular")
}
