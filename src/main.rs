mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{error, info};
use rand::thread_rng;

use survival_shooter::compute::{init_state, resize, tick, world_size};
use survival_shooter::config::GameConfig;
use survival_shooter::entities::InputState;
use survival_shooter::error::GameError;

use display::Viewport;

/// Fallback config location when no path is given on the command line.
const CONFIG_ENV: &str = "SURVIVAL_SHOOTER_CONFIG";

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// Instead of acting on each key event individually, we record the frame of
/// the last press/repeat event for every key.  When the terminal reports
/// releases, a key stays held until its release arrives.  Otherwise it counts
/// as held while it is fresher than `hold_window` frames.
struct InputTracker {
    key_frame: HashMap<KeyCode, u64>,
    mouse_cell: Option<(u16, u16)>,
    hold_window: u64,
    releases_reported: bool,
}

impl InputTracker {
    fn new(hold_window: u64, releases_reported: bool) -> Self {
        Self {
            key_frame: HashMap::new(),
            mouse_cell: None,
            hold_window,
            releases_reported,
        }
    }

    fn press(&mut self, code: KeyCode, frame: u64) {
        self.key_frame.insert(code, frame);
    }

    fn release(&mut self, code: &KeyCode) {
        self.key_frame.remove(code);
    }

    fn mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        match kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                self.mouse_cell = Some((column, row));
            }
            MouseEventKind::Up(MouseButton::Left) => self.mouse_cell = None,
            _ => {}
        }
    }

    fn is_held(&self, key: &KeyCode, frame: u64) -> bool {
        self.key_frame
            .get(key)
            .map(|&last| self.releases_reported || frame.saturating_sub(last) <= self.hold_window)
            .unwrap_or(false)
    }

    fn any_held(&self, keys: &[KeyCode], frame: u64) -> bool {
        keys.iter().any(|k| self.is_held(k, frame))
    }

    fn snapshot(&self, frame: u64, view: &Viewport) -> InputState {
        InputState {
            up: self.any_held(&[KeyCode::Char('w'), KeyCode::Char('W')], frame),
            down: self.any_held(&[KeyCode::Char('s'), KeyCode::Char('S')], frame),
            left: self.any_held(&[KeyCode::Char('a'), KeyCode::Char('A')], frame),
            right: self.any_held(&[KeyCode::Char('d'), KeyCode::Char('D')], frame),
            aim_up: self.is_held(&KeyCode::Up, frame),
            aim_down: self.is_held(&KeyCode::Down, frame),
            aim_left: self.is_held(&KeyCode::Left, frame),
            aim_right: self.is_held(&KeyCode::Right, frame),
            aim_target: self
                .mouse_cell
                .map(|(col, row)| view.cell_to_world(col, row)),
        }
    }
}

/// Simulated time derived from one start instant, so sub-millisecond
/// remainders carry over instead of being dropped every frame.
struct FrameClock {
    last_ms: u64,
}

impl FrameClock {
    fn new() -> Self {
        Self { last_ms: 0 }
    }

    /// Milliseconds to simulate, given the total time since the loop started.
    fn advance(&mut self, since_start: Duration) -> u64 {
        let now_ms = since_start.as_millis() as u64;
        let dt = now_ms.saturating_sub(self.last_ms);
        self.last_ms = now_ms;
        dt
    }
}

fn is_quit(code: &KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_ENV))
        .map(PathBuf::from)
}

/// Logs go to a file: the terminal belongs to the game while it runs.
fn init_logging(config: &GameConfig) -> Result<(), GameError> {
    let path = &config.terminal.log_file;
    if path.is_empty() {
        return Ok(());
    }
    let file = std::fs::File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &GameConfig,
    releases_reported: bool,
) -> Result<(), GameError> {
    let mut rng = thread_rng();
    let frame_time = Duration::from_millis(config.terminal.frame_ms);

    let (cols, rows) = terminal::size()?;
    let mut view = Viewport::new(cols, rows, &config.terminal);
    let (width, height) = world_size(cols, rows, &config.terminal);
    let mut state = init_state(config, width, height);
    info!("playfield {width}x{height} px on a {cols}x{rows} terminal");

    let mut tracker = InputTracker::new(config.terminal.hold_window_frames, releases_reported);
    let mut frame: u64 = 0;
    let started = Instant::now();
    let mut clock = FrameClock::new();

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
                        if is_quit(&code, modifiers) {
                            return Ok(());
                        }
                        tracker.press(code, frame);
                    }
                    KeyEventKind::Repeat => tracker.press(code, frame),
                    KeyEventKind::Release => tracker.release(&code),
                },
                Event::Mouse(MouseEvent {
                    kind, column, row, ..
                }) => tracker.mouse(kind, column, row),
                Event::Resize(cols, rows) => {
                    view = Viewport::new(cols, rows, &config.terminal);
                    let (width, height) = world_size(cols, rows, &config.terminal);
                    state = resize(&state, width, height);
                }
                _ => {}
            }
        }

        let input = tracker.snapshot(frame, &view);
        let dt_ms = clock.advance(started.elapsed());

        state = tick(&state, &input, config, dt_ms, &mut rng);

        let fps = if dt_ms > 0 { (1000 / dt_ms) as u32 } else { 0 };
        display::render(out, &state, &view, fps)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), GameError> {
    // Config errors surface before the terminal switches to raw mode.
    let source = config_path();
    let config = match &source {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    init_logging(&config)?;
    match &source {
        Some(path) => info!("config loaded from {}", path.display()),
        None => info!("using built-in config"),
    }

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to the
    // hold window.
    let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
        && out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();
    info!("key release events: {keyboard_enhanced}");

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

    let result = game_loop(&mut out, &rx, &config, keyboard_enhanced);
    if let Err(e) = &result {
        error!("game loop aborted: {e}");
    }

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!("exiting");
    result
}
