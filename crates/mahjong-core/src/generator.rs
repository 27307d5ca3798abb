//! Winnable deal generation.
//!
//! Assigns pairing values to a built grid so that at least one removal order
//! clears the board. Pairs are placed bottom-up, and a horizontal run may
//! only fill inward from its ends; undoing the placement order is then a
//! legal removal order. A single attempt can still dead-end (e.g. the last
//! two unfilled tiles are stacked), so the whole attempt retries with fresh
//! randomness, up to a ceiling.

use crate::{Error, Grid, TileId, TileValue};

/// Configuration for deal generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum whole-board attempts before giving up. Dead ends are rare on
    /// well-formed templates; the ceiling keeps un-dealable ones from
    /// looping forever.
    pub max_attempts: usize,
    /// Fisher-Yates passes over the value pool.
    pub shuffle_passes: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            shuffle_passes: 5,
        }
    }
}

/// Winnable deal generator.
pub struct Generator {
    config: GeneratorConfig,
    rng: SimpleRng,
    last_attempts: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a generator with default configuration.
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a generator with custom configuration.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            rng: SimpleRng::new(),
            last_attempts: 0,
        }
    }

    /// Create a generator with a specific seed for reproducibility.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: GeneratorConfig::default(),
            rng: SimpleRng::with_seed(seed),
            last_attempts: 0,
        }
    }

    /// Assign a pairing value to every tile such that the board can be
    /// cleared. Returns the placement order; removing those pairs in reverse
    /// order is always legal, which is the winnability certificate.
    ///
    /// On failure the grid is left without values.
    pub fn deal(&mut self, grid: &mut Grid) -> Result<Vec<(TileId, TileId)>, Error> {
        if grid.len() % 4 != 0 {
            return Err(Error::UnpairableTileCount(grid.len()));
        }
        for attempt in 1..=self.config.max_attempts {
            if let Some((values, order)) = self.try_fill(grid) {
                grid.set_values(&values);
                self.last_attempts = attempt;
                return Ok(order);
            }
        }
        self.last_attempts = self.config.max_attempts;
        Err(Error::DealAttemptsExhausted(self.config.max_attempts))
    }

    /// Attempts consumed by the most recent `deal`.
    pub fn last_attempts(&self) -> usize {
        self.last_attempts
    }

    /// One fill attempt. `None` is a dead end: all provisional state is
    /// discarded and the caller retries from a fresh shuffle.
    fn try_fill(&mut self, grid: &Grid) -> Option<(Vec<TileValue>, Vec<(TileId, TileId)>)> {
        let mut pool = self.value_pool(grid.len());
        let mut state = FillState::new(grid.len());
        let mut values = vec![0; grid.len()];
        let mut order = Vec::with_capacity(grid.len() / 2);

        while let Some(value) = pool.pop() {
            let mut fillable: Vec<TileId> = grid
                .tiles()
                .map(|(id, _)| id)
                .filter(|&id| state.fillable(grid, id))
                .collect();
            if fillable.is_empty() {
                return None;
            }
            let tile1 = fillable[self.rng.next_usize(fillable.len())];
            // Read before filling: filling marks the run in both directions.
            let run_untouched = state.untouched(tile1);
            state.fill(grid, tile1);
            values[tile1.0] = value;

            // Filter the previous set rather than rebuilding it. A rebuild
            // could admit tiles that only became fillable now (e.g. those
            // stacked on tile1), which must wait for a later value.
            fillable.retain(|&id| state.fillable(grid, id));
            if fillable.is_empty() {
                return None;
            }
            if run_untouched {
                // First fill in its run: the pair may also go directly
                // beside it, before the inward-only rule takes hold.
                fillable.extend_from_slice(grid.tile(tile1).left());
                fillable.extend_from_slice(grid.tile(tile1).right());
            }
            let tile2 = fillable[self.rng.next_usize(fillable.len())];
            state.fill(grid, tile2);
            values[tile2.0] = value;
            order.push((tile1, tile2));
        }
        Some((values, order))
    }

    /// `n / 4` sequential values, two copies each: every loop turn places
    /// one pair, and every value is placed twice.
    fn value_pool(&mut self, n: usize) -> Vec<TileValue> {
        let distinct = (n / 4) as TileValue;
        let mut pool: Vec<TileValue> = (0..distinct).chain(0..distinct).collect();
        for _ in 0..self.config.shuffle_passes {
            self.shuffle(&mut pool);
        }
        pool
    }

    /// Shuffle a slice using Fisher-Yates.
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.rng.next_usize(i + 1);
            slice.swap(i, j);
        }
    }
}

/// Transient per-attempt state, discarded on success or dead end.
struct FillState {
    filled: Vec<bool>,
    /// The fill has reached this tile's run from somewhere to its left.
    entered_left: Vec<bool>,
    /// The fill has reached this tile's run from somewhere to its right.
    entered_right: Vec<bool>,
}

impl FillState {
    fn new(n: usize) -> Self {
        Self {
            filled: vec![false; n],
            entered_left: vec![false; n],
            entered_right: vec![false; n],
        }
    }

    /// No fill has reached this tile's run from either direction yet.
    fn untouched(&self, id: TileId) -> bool {
        !self.entered_left[id.0] && !self.entered_right[id.0]
    }

    /// A tile may take the next value once everything beneath it is filled,
    /// and its run either has no fills yet or is filled right up to one of
    /// this tile's sides. Runs only ever fill inward from their ends, so no
    /// gap can become unreachable.
    fn fillable(&self, grid: &Grid, id: TileId) -> bool {
        let tile = grid.tile(id);
        !self.filled[id.0]
            && self.all_filled(tile.below())
            && (self.untouched(id)
                || self.all_filled(tile.left())
                || self.all_filled(tile.right()))
    }

    fn all_filled(&self, ids: &[TileId]) -> bool {
        ids.iter().all(|&id| self.filled[id.0])
    }

    /// Mark a tile filled and sweep the directional flags across its run.
    /// Depth-first with a check-and-set guard: runs branch across the
    /// half-tile offsets, but each tile is visited at most once per sweep.
    fn fill(&mut self, grid: &Grid, id: TileId) {
        self.filled[id.0] = true;
        let mut stack = vec![id];
        while let Some(t) = stack.pop() {
            if self.entered_right[t.0] {
                continue;
            }
            self.entered_right[t.0] = true;
            stack.extend_from_slice(grid.tile(t).left());
        }
        let mut stack = vec![id];
        while let Some(t) = stack.pop() {
            if self.entered_left[t.0] {
                continue;
            }
            self.entered_left[t.0] = true;
            stack.extend_from_slice(grid.tile(t).right());
        }
    }
}

/// Small PCG-style PRNG seeded from the OS, keeping the core crate light and
/// wasm-friendly.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new() -> Self {
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            // Fallback: a static counter still yields distinct deals.
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        Self::with_seed(u64::from_le_bytes(seed_bytes))
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        u64::from(xorshifted.rotate_right(rot))
    }

    /// Uniform draw from the half-open range `[0, bound)`; the result can
    /// never equal `bound`.
    fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}
