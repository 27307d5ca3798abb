//! Basic example of using the mahjong engine

use mahjong_core::{Game, Template};

/// Layer art to template: `.` is empty, anything else is a tile corner.
fn template(layers: &[&[&str]]) -> Template {
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
    .expect("layer art should be rectangular")
}

fn main() {
    // A small two-layer tower: eight tiles on the ground, four on top.
    let template = template(&[
        &["#.#.#.#", ".......", "#.#.#.#"],
        &["..#.#..", ".......", "..#.#.."],
    ]);

    println!("Dealing a {}-tile board...\n", template.tile_count());
    let mut game = Game::new(&template).expect("template should be dealable");

    let grid = game.grid();
    println!(
        "Grid: {} layers, {} rows, {} columns",
        grid.depth(),
        grid.rows(),
        grid.cols()
    );
    for (id, tile) in grid.tiles() {
        let free = if game.is_free(id) { "free" } else { "blocked" };
        println!(
            "  ({}, {}, {})  value {:>2}  {}",
            tile.x,
            tile.y,
            tile.z,
            tile.value.unwrap_or_default(),
            free
        );
    }

    // Play hints until the board is clear.
    println!("\nPlaying out the board from hints:");
    while let Some(group) = game.hint() {
        let (a, b) = (group[0], group[1]);
        if !game.remove_pair(a, b) {
            break;
        }
        let tile = game.grid().tile(a);
        println!(
            "  removed a pair of value {} ({} tiles left)",
            tile.value.unwrap_or_default(),
            game.remaining()
        );
    }
    println!("Cleared: {}", game.is_cleared());

    // The move history is a single timeline: undo twice, redo once.
    game.undo();
    game.undo();
    game.redo();
    println!(
        "After undo x2 and redo x1: {} tiles on the board",
        game.remaining()
    );
}
