//! Translation of pointer clicks into world commands.

use lawn_defence_core::{
    CellCoord, Command, GamePhase, PlantPreference, CELL_HEIGHT, CELL_WIDTH, GRID_TOP,
    PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH,
};

/// Converts a click at pixel `(x, y)` into the command it requests in `phase`.
///
/// A click on the title screen starts the game and a click after the game has
/// ended resets it, wherever it lands. While playing, only clicks inside the
/// plantable area request a defender; everything else is ignored.
#[must_use]
pub fn translate_click(phase: GamePhase, x: f32, y: f32) -> Option<Command> {
    match phase {
        GamePhase::NotStarted => Some(Command::Start),
        GamePhase::GameOver | GamePhase::Victory => Some(Command::Reset),
        GamePhase::Playing => cell_at(x, y).map(|cell| Command::Plant {
            cell,
            preference: PlantPreference::ShooterFirst,
        }),
    }
}

fn cell_at(x: f32, y: f32) -> Option<CellCoord> {
    let inside = (0.0..PLAYFIELD_WIDTH).contains(&x) && (GRID_TOP..PLAYFIELD_HEIGHT).contains(&y);
    if !inside {
        return None;
    }
    let column = (x / CELL_WIDTH).floor() as u32;
    let row = ((y - GRID_TOP) / CELL_HEIGHT).floor() as u32;
    Some(CellCoord::new(column, row))
}
