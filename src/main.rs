mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use display::Viewport;
use spacex_shooter::compute::{init_state, move_player_left, move_player_right, player_shoot, tick};
use spacex_shooter::entities::{GameState, GameStatus};
use spacex_shooter::settings::Settings;
use spacex_shooter::{Error, Result};

/// Smallest terminal the play area still makes sense in.
const MIN_COLS: u16 = 40;
const MIN_ROWS: u16 = 16;

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many milliseconds.  Covers terminals that don't emit key-release
/// events: the OS key-repeat rate is ≥ 15 Hz, so the window is always
/// refreshed before expiry while the key is down.
const HOLD_WINDOW_MS: u64 = 135;

/// Returns true if `key` was seen within the last `window` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64, window: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= window)
        .unwrap_or(false)
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "spacex", about = "Dodge and shoot falling meteors in your terminal")]
struct Args {
    /// TOML file overriding gameplay settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible game.
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per second (overrides the settings file).
    #[arg(long)]
    fps: Option<u32>,

    /// Write logs here; the terminal itself is taken by the game.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(fps) = args.fps {
        settings.fps = fps;
    }
    settings.validate()?;
    Ok(settings)
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    // Without a log file there is nowhere safe to write: stdout and stderr
    // belong to the game screen.
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        builder.json().with_current_span(true).init();
    } else {
        builder.compact().init();
    }
    Ok(())
}

fn restore_terminal<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

// ── Title ─────────────────────────────────────────────────────────────────────

enum TitleResult {
    Start,
    Quit,
}

fn show_title<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &Settings,
    best: u32,
) -> Result<TitleResult> {
    let (cols, rows) = terminal::size()?;
    display::render_title(out, &Viewport::new(cols, rows, settings), best)?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                modifiers,
                ..
            })) => {
                if is_quit(code, modifiers) {
                    return Ok(TitleResult::Quit);
                }
                if code == KeyCode::Char(' ') || code == KeyCode::Enter {
                    return Ok(TitleResult::Start);
                }
            }
            Ok(Event::Resize(cols, rows)) => {
                display::render_title(out, &Viewport::new(cols, rows, settings), best)?;
            }
            Ok(_) => {}
            // Input thread gone: nothing more can be read.
            Err(_) => return Ok(TitleResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to the title screen.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within the hold window) and apply all their effects simultaneously.
/// This allows Space + A/D to be held at the same time with no interference.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    best: u32,
) -> Result<bool> {
    let frame_time = state.settings.frame();
    let hold_window = (HOLD_WINDOW_MS / state.settings.frame_ms()).max(1);
    let (cols, rows) = terminal::size()?;
    let mut view = Viewport::new(cols, rows, &state.settings);

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        if is_quit(code, modifiers) {
                            return Ok(true);
                        }
                        if matches!(code, KeyCode::Char('r') | KeyCode::Char('R'))
                            && state.status == GameStatus::GameOver
                        {
                            return Ok(false);
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Resize(cols, rows) => {
                    tracing::debug!(cols, rows, "terminal resized");
                    view = Viewport::new(cols, rows, &state.settings);
                }
                _ => {}
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if state.status == GameStatus::Playing {
            let held = |keys: &[KeyCode]| {
                keys.iter()
                    .any(|k| is_held(&key_frame, k, frame, hold_window))
            };
            let left = held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]);
            let right = held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]);
            let shoot = held(&[KeyCode::Char(' ')]);

            if left && !right {
                *state = move_player_left(state);
            } else if right && !left {
                *state = move_player_right(state);
            }
            if shoot {
                *state = player_shoot(state);
            }

            *state = tick(state, rng);
        }

        display::render(out, state, &view, best)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;
    let settings = load_settings(&args)?;

    let (cols, rows) = terminal::size()?;
    if cols < MIN_COLS || rows < MIN_ROWS {
        return Err(Error::TerminalTooSmall {
            width: cols,
            height: rows,
            min_width: MIN_COLS,
            min_height: MIN_ROWS,
        });
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    tracing::info!(seed = ?args.seed, fps = settings.fps, "starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // A panic would otherwise leave the shell in raw mode.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal(&mut stdout(), keyboard_enhanced);
        tracing::error!(%info, "panic");
        default_hook(info);
    }));

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &settings, &mut rng);

    // Always restore the terminal
    restore_terminal(&mut out, keyboard_enhanced);

    let scores = result?;
    for (i, score) in scores.iter().enumerate() {
        println!("Game {}: score {}", i + 1, score);
    }
    Ok(())
}

/// Alternate between the title screen and games until the player quits.
/// Returns the score of every game played, in order.
fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &Settings,
    rng: &mut StdRng,
) -> Result<Vec<u32>> {
    let mut scores = Vec::new();
    let mut best = 0;

    loop {
        match show_title(out, rx, settings, best)? {
            TitleResult::Quit => break,
            TitleResult::Start => {
                let mut state = init_state(settings.clone(), rng)?;
                let quit = game_loop(out, &mut state, rx, rng, best)?;

                tracing::info!(score = state.score, "game finished");
                scores.push(state.score);
                best = best.max(state.score);

                if quit {
                    break;
                }
                // Otherwise loop back to the title
            }
        }
    }
    Ok(scores)
}
