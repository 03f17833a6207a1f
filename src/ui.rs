//! Terminal UI rendering with ratatui
//!
//! Draws a game [`Snapshot`]; nothing here touches game state.

use crate::board::Cell;
use crate::game::{GameState, Snapshot};
use crate::settings::Settings;
use crate::tetromino::PieceType;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Width of the preview/help column
const SIDE_WIDTH: u16 = 18;

/// Render the whole game screen
pub fn render_game(frame: &mut Frame, snapshot: &Snapshot, settings: &Settings) {
    let area = frame.area();

    // Two terminal columns per board cell; boards are capped at MAX_DIMENSION
    let board_width = (snapshot.board.width() * 2) as u16;
    let board_height = snapshot.board.height() as u16;
    let game_area = center_rect(area, board_width + SIDE_WIDTH, board_height);

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Length(SIDE_WIDTH)])
        .split(game_area);

    render_board(frame, main_layout[0], snapshot, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(4)])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], snapshot.next, settings);
    render_help(frame, right_layout[1], settings);

    if snapshot.state == GameState::GameOver {
        render_overlay(frame, area, "GAME OVER", "R: restart  Q: quit");
    }
}

/// Center a `width` x `height` box inside `area`, clipped to it
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the board, border included, with the active piece on top
fn render_board(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let (block_char, border_char) = settings.visual.block_chars();
    let active = snapshot.active.map(|p| (p.piece_type, p.block_positions()));

    let lines: Vec<Line> = snapshot
        .board
        .rows()
        .enumerate()
        .map(|(y, row)| {
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(x, cell)| {
                    let on_piece = active.and_then(|(piece_type, positions)| {
                        positions
                            .contains(&(x as i32, y as i32))
                            .then_some(piece_type)
                    });
                    match (on_piece, cell) {
                        (Some(piece_type), _) => {
                            Span::styled(block_char, Style::default().fg(piece_type.color()))
                        }
                        (None, Cell::Border) => {
                            Span::styled(border_char, Style::default().fg(Color::DarkGray))
                        }
                        (None, Cell::Filled(piece_type)) => {
                            Span::styled(block_char, Style::default().fg(piece_type.color()))
                        }
                        (None, Cell::Empty) => Span::raw(EMPTY),
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the next piece preview
fn render_next(frame: &mut Frame, area: Rect, next: PieceType, settings: &Settings) {
    let (block_char, _) = settings.visual.block_chars();
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Spawn orientation, trimmed to its filled rows
    let lines: Vec<Line> = next
        .shape(0)
        .iter()
        .filter(|row| row.iter().any(|&v| v != 0))
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&v| {
                    if v != 0 {
                        Span::styled(block_char, Style::default().fg(next.color()))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the controls panel from the active bindings
fn render_help(frame: &mut Frame, area: Rect, settings: &Settings) {
    let keys = &settings.keys;
    let entries = [
        ("Left", &keys.move_left),
        ("Right", &keys.move_right),
        ("Down", &keys.move_down),
        ("Rotate", &keys.rotate),
        ("Next", &keys.force_next),
        ("Quit", &keys.quit),
    ];

    let mut lines = Vec::new();
    for (label, bound) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<7}", label), Style::default().fg(Color::Gray)),
            Span::styled(bound.join("/"), Style::default().fg(Color::Cyan)),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 24u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
