//! Layout and drawing: bordered playfield, locked cells, falling piece, key hints.

use crate::game::{Cell, GameState};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Each board cell renders as two terminal columns, one row.
const CELL_WIDTH: u16 = 2;

/// Terminal footprint of the playfield (board + border) for a given grid size.
fn playfield_size(width: u16, height: u16) -> (u16, u16) {
    (width * CELL_WIDTH + 2, height + 2)
}

/// Largest board (in grid cells) whose playfield plus footer line fits the
/// given terminal size. Used so --width/--height are clamped at startup.
pub fn board_size_for_terminal(term_cols: u16, term_rows: u16) -> (u16, u16) {
    let w = term_cols.saturating_sub(2) / CELL_WIDTH;
    let h = term_rows.saturating_sub(3);
    (w, h)
}

/// Draw one frame: playfield centred in `area`, key hints underneath.
/// Pure read of the game state; all mutation for the tick happened earlier.
pub fn draw(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let (pw, ph) = playfield_size(state.board.width() as u16, state.board.height() as u16);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(pw),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let playfield_area = vert[1];
    let footer_area = vert[2];

    draw_playfield(frame, state, theme, playfield_area);
    draw_footer(frame, theme, footer_area);
}

fn draw_playfield(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.outline).bg(theme.bg))
        .title(Span::styled(" tetratui ", Style::default().fg(theme.text)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let piece_cells: Vec<(i32, i32)> = state.piece.cells().collect();
    let piece_color = theme.piece_color(state.piece.color_id());

    let buf = frame.buffer_mut();
    for row in 0..state.board.height() {
        for col in 0..state.board.width() {
            let color = if piece_cells.contains(&(row as i32, col as i32)) {
                Some(piece_color)
            } else {
                match state.board.get(row, col) {
                    Some(Cell::Locked(id)) => Some(theme.piece_color(id)),
                    _ => None,
                }
            };

            let rx = inner.x + col as u16 * CELL_WIDTH;
            let ry = inner.y + row as u16;
            if rx + 1 >= inner.x + inner.width || ry >= inner.y + inner.height {
                continue;
            }
            match color {
                Some(c) => {
                    let style = Style::default().fg(c).bg(theme.bg);
                    buf[(rx, ry)].set_symbol("█").set_style(style);
                    buf[(rx + 1, ry)].set_symbol("█").set_style(style);
                }
                None => {
                    let style = Style::default().bg(theme.bg);
                    buf[(rx, ry)].set_symbol(" ").set_style(style);
                    buf[(rx + 1, ry)].set_symbol(" ").set_style(style);
                }
            }
        }
    }
}

fn draw_footer(frame: &mut Frame, theme: &Theme, area: Rect) {
    if area.height == 0 {
        return;
    }
    let hints = Line::from(Span::styled(
        "←/→ move  ↑ rotate  ↓ drop  q quit",
        Style::default().fg(theme.text),
    ));
    Paragraph::new(hints)
        .alignment(Alignment::Center)
        .render(area, frame.buffer_mut());
}
