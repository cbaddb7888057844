pub mod config;
pub mod cue;
pub mod engine;
pub mod runtime;
pub mod ui;
pub mod util;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    cue::{Cue, CuePlayer, SilentCue, TerminalBell},
    engine::{EngineConfig, EngineEvent, Phase, TimerEngine},
    runtime::{Event, IntervalTick, TickSource},
    ui::TimerScreen,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    cell::RefCell,
    error::Error,
    io::{self, stdin},
    rc::Rc,
    sync::mpsc,
    time::Duration,
};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// terminal pomodoro timer with work/rest cycles
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal pomodoro timer: work intervals alternate with short rests, with a long rest after every few completed intervals. Durations are read from the config file and can be overridden per run."
)]
pub struct Cli {
    /// work interval length in seconds
    #[clap(short = 'w', long)]
    work_secs: Option<u32>,

    /// short rest length in seconds
    #[clap(short = 's', long)]
    short_rest_secs: Option<u32>,

    /// long rest length in seconds
    #[clap(short = 'l', long)]
    long_rest_secs: Option<u32>,

    /// work intervals per long rest
    #[clap(short = 'c', long)]
    cycles: Option<u32>,

    /// suppress the terminal bell cues for this run
    #[clap(long)]
    mute: bool,

    /// persist the resolved durations as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Stored config overlaid with whatever flags were given.
    fn resolve(&self, stored: Config) -> Config {
        Config {
            work_secs: self.work_secs.unwrap_or(stored.work_secs),
            short_rest_secs: self.short_rest_secs.unwrap_or(stored.short_rest_secs),
            long_rest_secs: self.long_rest_secs.unwrap_or(stored.long_rest_secs),
            cycles_per_long_rest: self.cycles.unwrap_or(stored.cycles_per_long_rest),
        }
    }
}

/// What a keypress asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartWork,
    StartRest { long: bool },
    ToggleRunning,
    Quit,
}

/// Key bindings. The pause binding is withheld while Idle; there is nothing
/// to pause before the first start.
pub fn command_for(key: KeyEvent, phase: Phase) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('w') => Some(Command::StartWork),
        KeyCode::Char('r') => Some(Command::StartRest { long: false }),
        KeyCode::Char('R') => Some(Command::StartRest { long: true }),
        KeyCode::Char(' ') | KeyCode::Char('p') if phase != Phase::Idle => {
            Some(Command::ToggleRunning)
        }
        _ => None,
    }
}

pub struct App {
    pub engine: TimerEngine,
}

impl App {
    /// Wires the cue player to the engine's start notifications: start bell
    /// on work, finish bell on rest, exactly like the source's two audio
    /// elements.
    pub fn new(engine_config: EngineConfig, player: Box<dyn CuePlayer>) -> Self {
        let mut engine = TimerEngine::new(engine_config);
        let player = Rc::new(RefCell::new(player));

        engine.subscribe(move |event| {
            let cue = match event {
                EngineEvent::WorkStarted => Some(Cue::Start),
                EngineEvent::RestStarted { .. } => Some(Cue::Finish),
                _ => None,
            };
            if let Some(cue) = cue {
                player.borrow_mut().play(cue);
            }
        });

        Self { engine }
    }

    /// Applies one presentation command. `Quit` is the caller's concern.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::StartWork => self.engine.start_work(),
            Command::StartRest { long } => self.engine.start_rest(long),
            Command::ToggleRunning => self.engine.toggle_running(),
            Command::Quit => {}
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = cli.resolve(store.load());
    let engine_config = match config.to_engine_config() {
        Ok(engine_config) => engine_config,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
    };
    if cli.save_config {
        store.save(&config)?;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let player: Box<dyn CuePlayer> = if cli.mute {
        Box::new(SilentCue)
    } else {
        Box::new(TerminalBell::new())
    };
    let mut app = App::new(engine_config, player);

    let (tx, rx) = mpsc::channel();
    runtime::spawn_input_thread(tx.clone());
    let tick = IntervalTick::spawn(TICK_PERIOD, tx);

    let res = run_app(&mut terminal, &mut app, &rx, &tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mpsc::Receiver<Event>,
    tick: &dyn TickSource,
) -> Result<(), Box<dyn Error>> {
    let mut current_title = String::new();

    loop {
        let snapshot = app.engine.snapshot();

        // Title sync is skipped when the text is unchanged; mid-interval
        // it changes once per tick.
        let title = ui::window_title(&snapshot);
        if title != current_title {
            execute!(io::stdout(), SetTitle(&title))?;
            current_title = title;
        }

        terminal.draw(|f| f.render_widget(&TimerScreen::new(snapshot), f.area()))?;

        match events.recv()? {
            Event::Tick => app.engine.on_tick(),
            Event::Resize => {}
            Event::Key(key) => match command_for(key, app.engine.phase()) {
                Some(Command::Quit) => break,
                Some(command) => app.apply(command),
                None => {}
            },
        }

        // Gate the clock off whenever the engine is paused or idle, so a
        // paused engine receives zero ticks and resume starts at the next
        // period boundary.
        tick.set_enabled(app.engine.is_running());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clap::Parser;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[derive(Clone, Default)]
    struct RecordingCue(Rc<RefCell<Vec<Cue>>>);

    impl CuePlayer for RecordingCue {
        fn play(&mut self, cue: Cue) {
            self.0.borrow_mut().push(cue);
        }
    }

    fn recording_app(engine_config: EngineConfig) -> (App, Rc<RefCell<Vec<Cue>>>) {
        let recorder = RecordingCue::default();
        let cues = Rc::clone(&recorder.0);
        (App::new(engine_config, Box::new(recorder)), cues)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["pomotime"]);

        assert_eq!(cli.work_secs, None);
        assert_eq!(cli.short_rest_secs, None);
        assert_eq!(cli.long_rest_secs, None);
        assert_eq!(cli.cycles, None);
        assert!(!cli.mute);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_duration_flags() {
        let cli = Cli::parse_from(["pomotime", "-w", "600", "-s", "60", "-l", "300", "-c", "3"]);
        assert_eq!(cli.work_secs, Some(600));
        assert_eq!(cli.short_rest_secs, Some(60));
        assert_eq!(cli.long_rest_secs, Some(300));
        assert_eq!(cli.cycles, Some(3));

        let cli = Cli::parse_from(["pomotime", "--work-secs", "1200", "--cycles", "2"]);
        assert_eq!(cli.work_secs, Some(1200));
        assert_eq!(cli.cycles, Some(2));
    }

    #[test]
    fn test_cli_mute_and_save_config() {
        let cli = Cli::parse_from(["pomotime", "--mute", "--save-config"]);
        assert!(cli.mute);
        assert!(cli.save_config);
    }

    #[test]
    fn test_resolve_keeps_stored_values_without_flags() {
        let cli = Cli::parse_from(["pomotime"]);
        let stored = Config {
            work_secs: 600,
            short_rest_secs: 60,
            long_rest_secs: 300,
            cycles_per_long_rest: 3,
        };
        assert_eq!(cli.resolve(stored), stored);
    }

    #[test]
    fn test_resolve_flags_override_stored_values() {
        let cli = Cli::parse_from(["pomotime", "-w", "900"]);
        let resolved = cli.resolve(Config::default());
        assert_eq!(resolved.work_secs, 900);
        assert_eq!(resolved.short_rest_secs, 300);
        assert_eq!(resolved.cycles_per_long_rest, 4);
    }

    #[test]
    fn test_command_for_work_and_rest_keys() {
        assert_matches!(
            command_for(key(KeyCode::Char('w')), Phase::Idle),
            Some(Command::StartWork)
        );
        assert_matches!(
            command_for(key(KeyCode::Char('r')), Phase::Working),
            Some(Command::StartRest { long: false })
        );
        assert_matches!(
            command_for(key(KeyCode::Char('R')), Phase::Working),
            Some(Command::StartRest { long: true })
        );
    }

    #[test]
    fn test_command_for_pause_keys_outside_idle() {
        assert_matches!(
            command_for(key(KeyCode::Char(' ')), Phase::Working),
            Some(Command::ToggleRunning)
        );
        assert_matches!(
            command_for(key(KeyCode::Char('p')), Phase::LongResting),
            Some(Command::ToggleRunning)
        );
    }

    #[test]
    fn test_command_for_withholds_pause_while_idle() {
        assert_eq!(command_for(key(KeyCode::Char(' ')), Phase::Idle), None);
        assert_eq!(command_for(key(KeyCode::Char('p')), Phase::Idle), None);
    }

    #[test]
    fn test_command_for_quit_keys() {
        assert_matches!(command_for(key(KeyCode::Esc), Phase::Idle), Some(Command::Quit));
        assert_matches!(
            command_for(key(KeyCode::Char('q')), Phase::Working),
            Some(Command::Quit)
        );
        assert_matches!(
            command_for(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                Phase::Working
            ),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_command_for_ignores_unbound_keys() {
        assert_eq!(command_for(key(KeyCode::Char('x')), Phase::Working), None);
        assert_eq!(command_for(key(KeyCode::Enter), Phase::Idle), None);
    }

    #[test]
    fn test_apply_dispatches_to_the_engine() {
        let (mut app, _cues) = recording_app(EngineConfig::default());

        app.apply(Command::StartWork);
        assert_eq!(app.engine.phase(), Phase::Working);

        app.apply(Command::StartRest { long: false });
        assert_eq!(app.engine.phase(), Phase::ShortResting);

        app.apply(Command::ToggleRunning);
        assert!(!app.engine.is_running());

        app.apply(Command::Quit);
        assert_eq!(app.engine.phase(), Phase::ShortResting);
    }

    #[test]
    fn test_cues_ring_on_work_and_rest_starts() {
        let (mut app, cues) = recording_app(EngineConfig::default());

        app.apply(Command::StartWork);
        app.apply(Command::StartRest { long: true });
        assert_eq!(*cues.borrow(), vec![Cue::Start, Cue::Finish]);
    }

    #[test]
    fn test_cues_ring_on_automatic_transitions() {
        let config = EngineConfig::new(2, 1, 2, 2).unwrap();
        let (mut app, cues) = recording_app(config);

        app.apply(Command::StartWork);
        app.engine.on_tick();
        app.engine.on_tick(); // work -> short rest
        app.engine.on_tick(); // short rest -> work

        assert_eq!(
            *cues.borrow(),
            vec![Cue::Start, Cue::Finish, Cue::Start]
        );
    }

    #[test]
    fn test_timer_screen_renders_from_app_snapshot() {
        use ratatui::{backend::TestBackend, Terminal};

        let (mut app, _cues) = recording_app(EngineConfig::default());
        app.apply(Command::StartWork);

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(&TimerScreen::new(app.engine.snapshot()), f.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Time to focus!"));
    }
}
