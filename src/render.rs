use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Stdout, Write};
use unicode_width::UnicodeWidthStr;

use crate::grid::{Pos, Tile};
use crate::session::{MoveOutcome, Session};

const CELL_W: usize = 2;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Goal,
    Wall,
    Path,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(size: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Path,
                    color: Color::Reset,
                };
                size * size
            ],
            last_hud: String::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn mark_full(&mut self) {
        self.needs_full = true;
    }
}

pub fn render(
    stdout: &mut Stdout,
    session: &Session,
    renderer: &mut Renderer,
    feedback: Option<MoveOutcome>,
) -> io::Result<()> {
    let size = session.grid().size();
    // One row above for the HUD, one below for move feedback.
    let needed_h = (size + 2) as u16;
    let needed_w = (size * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = format!(
        "Moves: {}  (arrows/hjkl move, n new maze, q quit)",
        session.moves()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for y in 0..size {
        for x in 0..size {
            let cell = cell_for(session, Pos { x, y });
            let idx = y * size + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, y, cell)?;
            }
        }
    }

    let status = status_line(session, feedback);
    if renderer.needs_full || status != renderer.last_status {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y + size as u16))?;
        stdout.queue(SetForegroundColor(if session.won() {
            Color::Green
        } else {
            Color::White
        }))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&status))?;
        stdout.queue(ResetColor)?;
        renderer.last_status = status;
    }

    renderer.needs_full = false;
    stdout.flush()?;
    Ok(())
}

fn status_line(session: &Session, feedback: Option<MoveOutcome>) -> String {
    if session.won() {
        return format!(
            "You reached the goal in {} moves! Press n for a new maze.",
            session.moves()
        );
    }
    match feedback {
        Some(MoveOutcome::Rejected) => "Bump! That way is walled off.".to_string(),
        _ => String::new(),
    }
}

fn cell_for(session: &Session, pos: Pos) -> Cell {
    if pos == session.player() {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if pos == session.goal() {
        return Cell {
            glyph: Glyph::Goal,
            color: Color::Green,
        };
    }
    match session.grid().get(pos) {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::DarkYellow,
        },
        Tile::Path => Cell {
            glyph: Glyph::Path,
            color: Color::Reset,
        },
    }
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: Cell,
) -> io::Result<()> {
    let (text, color) = match cell.glyph {
        Glyph::Player => ("😃", cell.color),
        Glyph::Goal => ("🚩", cell.color),
        Glyph::Wall => ("██", cell.color),
        Glyph::Path => ("  ", cell.color),
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
