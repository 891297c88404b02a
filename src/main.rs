use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use std::io::{self, Stdout};
use std::time::Duration;

mod grid;
mod maze;
mod render;
mod search;
mod session;

use grid::Dir;
use render::Renderer;
use session::{MoveOutcome, Session, DEFAULT_GRID_SIZE};

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout) -> io::Result<()> {
    let mut rng = rand::thread_rng();
    let size = read_grid_size();
    let mut session = Session::new(&mut rng, size);
    let mut renderer = Renderer::new(size);
    let mut feedback: Option<MoveOutcome> = None;
    render::render(stdout, &session, &mut renderer, feedback)?;

    loop {
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('n') => {
                        session.new_game(&mut rng);
                        feedback = None;
                    }
                    code => {
                        if let Some(dir) = key_dir(code) {
                            if !session.won() {
                                feedback = Some(session.try_move(dir));
                            }
                        } else {
                            continue;
                        }
                    }
                }
                render::render(stdout, &session, &mut renderer, feedback)?;
            }
            Event::Resize(_, _) => {
                renderer.mark_full();
                render::render(stdout, &session, &mut renderer, feedback)?;
            }
            _ => {}
        }
    }
}

fn key_dir(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}

fn read_grid_size() -> usize {
    std::env::var("MAZE_SIZE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| (6..=40).contains(v))
        .unwrap_or(DEFAULT_GRID_SIZE)
}
