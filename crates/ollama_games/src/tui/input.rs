//! Keyboard handling for the terminal front-end.

use crossterm::event::KeyCode;

/// What a key press asks the front-end to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Play at a cell.
    Play(usize),
    /// Move the highlight to a cell.
    Cursor(usize),
    /// Start a new game.
    Reset,
    /// Leave the front-end.
    Quit,
    /// Nothing to do.
    None,
}

/// Moves the cursor one cell with the arrow keys, stopping at the edges.
pub fn move_cursor(cursor: usize, key: KeyCode) -> usize {
    let (row, col) = (cursor / 3, cursor % 3);
    match key {
        KeyCode::Right if col < 2 => cursor + 1,
        KeyCode::Left if col > 0 => cursor - 1,
        KeyCode::Down if row < 2 => cursor + 3,
        KeyCode::Up if row > 0 => cursor - 3,
        _ => cursor,
    }
}

/// Maps a key to an action. Keys 1-9 pick cells 0-8 like a keypad read
/// left to right, top to bottom.
pub fn action_for(cursor: usize, key: KeyCode) -> Action {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Play(cursor),
        KeyCode::Char(c) => match c.to_digit(10) {
            Some(digit @ 1..=9) => Action::Play(digit as usize - 1),
            _ => Action::None,
        },
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
            Action::Cursor(move_cursor(cursor, key))
        }
        _ => Action::None,
    }
}
