use crate::audio::{AudioEngine, NullAudioEngine, RodioAudioEngine};
use crate::config;
use crate::core::{Action, Core, Effect};
use crate::library::{DirectorySource, FsSource};
use crate::model::{SkipDirection, Theme};
use crate::player::{Player, PlayerEvent};
use crate::ui::PromptView;
use crate::worker::{self, ScanOutcome, ScanRequest};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{info, warn};

const SEEK_STEP_SECONDS: f64 = 5.0;
const VOLUME_STEP: f32 = 0.05;
const HELP_TEXT: &str = "Commands: open <dir> | theme | volume <0-100> | seek <seconds> | help";

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub library: Option<PathBuf>,
    pub theme: Theme,
    pub volume: f32,
    pub null_audio: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    OpenFolder(String),
    Command(String),
}

pub struct App {
    core: Core,
    player: Player,
    source: Arc<dyn DirectorySource>,
    scan_tx: Sender<ScanRequest>,
    outcome_rx: Receiver<ScanOutcome>,
    input: Option<InputMode>,
    quit: bool,
}

impl App {
    pub fn new(
        source: Arc<dyn DirectorySource>,
        engine: Box<dyn AudioEngine>,
        options: &LaunchOptions,
    ) -> Self {
        let (scan_tx, request_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        worker::spawn_scan_worker(Arc::clone(&source), request_rx, outcome_tx);

        let mut player = Player::new(engine);
        player.set_volume(options.volume);

        let mut app = Self {
            core: Core::new(options.theme),
            player,
            source,
            scan_tx,
            outcome_rx,
            input: None,
            quit: false,
        };
        if let Some(library) = &options.library {
            app.open_folder(library);
        }
        app
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn dispatch(&mut self, action: Action) {
        if let Some(effect) = self.core.update(action) {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Scan(request) => {
                if self.scan_tx.send(request).is_err() {
                    warn!("scan worker is gone");
                    self.core
                        .update(Action::SetStatus(String::from("scan worker stopped")));
                }
            }
            Effect::Play(now_playing) => {
                match self.player.load(self.source.as_ref(), &now_playing.track) {
                    Ok(()) => {
                        self.core.update(Action::PlaybackStarted(now_playing));
                    }
                    Err(err) => {
                        self.core
                            .update(Action::PlaybackFailed(format!("playback error: {err:#}")));
                    }
                }
            }
        }
    }

    /// Applies finished scans and reacts to the end of a track.
    pub fn tick(&mut self) {
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => self.dispatch(Action::ScanFinished(outcome)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("scan worker disconnected");
                    break;
                }
            }
        }

        if self.player.poll() == Some(PlayerEvent::Ended) {
            match self.core.update(Action::Skip(SkipDirection::Next)) {
                Some(effect) => self.run_effect(effect),
                None => {
                    self.core
                        .update(Action::SetStatus(String::from("Playback finished")));
                }
            }
        }
    }

    fn open_folder(&mut self, dir: &Path) {
        let dir = config::normalize_path(dir);
        info!(dir = %dir.display(), "opening library");
        self.dispatch(Action::PickLibrary(dir));
    }

    fn prompt(&self) -> Option<PromptView> {
        match self.input.as_ref()? {
            InputMode::OpenFolder(input) => Some(PromptView {
                title: String::from("Open music folder"),
                hint: String::from("Enter open, Esc cancel"),
                input: input.clone(),
            }),
            InputMode::Command(input) => Some(PromptView {
                title: String::from("Command"),
                hint: String::from("Enter run, Esc cancel, help lists commands"),
                input: input.clone(),
            }),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        if let Some(input) = self.input.take() {
            self.handle_input_key(input, key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.dispatch(Action::CursorNext),
            KeyCode::Up | KeyCode::Char('k') => self.dispatch(Action::CursorPrev),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                self.dispatch(Action::Activate)
            }
            KeyCode::Left | KeyCode::Backspace | KeyCode::Esc | KeyCode::Char('h') => {
                self.dispatch(Action::Back)
            }
            KeyCode::Char(' ') => self.toggle_play_pause(),
            KeyCode::Char('n') => self.dispatch(Action::Skip(SkipDirection::Next)),
            KeyCode::Char('p') => self.dispatch(Action::Skip(SkipDirection::Previous)),
            KeyCode::Char(',') => self.seek_by(-SEEK_STEP_SECONDS),
            KeyCode::Char('.') => self.seek_by(SEEK_STEP_SECONDS),
            KeyCode::Char('-') => self.change_volume(-VOLUME_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_volume(VOLUME_STEP),
            KeyCode::Char('t') => self.dispatch(Action::CycleTheme),
            KeyCode::Char('o') => {
                let current = self
                    .core
                    .library_root
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                self.input = Some(InputMode::OpenFolder(current));
                self.core.dirty = true;
            }
            KeyCode::Char(':') => {
                self.input = Some(InputMode::Command(String::new()));
                self.core.dirty = true;
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, input: InputMode, code: KeyCode) {
        self.core.dirty = true;
        let (mut buffer, is_command) = match input {
            InputMode::OpenFolder(buffer) => (buffer, false),
            InputMode::Command(buffer) => (buffer, true),
        };

        match code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                if is_command {
                    self.run_command(&buffer);
                } else if buffer.trim().is_empty() {
                    self.dispatch(Action::SetStatus(String::from("No folder given")));
                } else {
                    self.open_folder(Path::new(buffer.trim()));
                }
                return;
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(ch) => buffer.push(ch),
            _ => {}
        }

        self.input = Some(if is_command {
            InputMode::Command(buffer)
        } else {
            InputMode::OpenFolder(buffer)
        });
    }

    pub fn run_command(&mut self, raw: &str) {
        let input = raw.trim();
        if input.is_empty() {
            self.dispatch(Action::SetStatus(String::from("No command")));
            return;
        }

        let mut command_split = input.splitn(2, char::is_whitespace);
        let command = command_split.next().unwrap_or_default();
        let rest = command_split.next().unwrap_or("").trim();

        match command {
            "help" => self.dispatch(Action::SetStatus(String::from(HELP_TEXT))),
            "open" => {
                if rest.is_empty() {
                    self.dispatch(Action::SetStatus(String::from("Usage: open <dir>")));
                } else {
                    self.open_folder(Path::new(rest));
                }
            }
            "theme" => self.dispatch(Action::CycleTheme),
            "volume" => match rest.parse::<u8>() {
                Ok(percent) if percent <= 100 => {
                    self.player.set_volume(f32::from(percent) / 100.0);
                    self.report_volume();
                }
                _ => self.dispatch(Action::SetStatus(String::from("Usage: volume <0-100>"))),
            },
            "seek" => match rest.parse::<f64>() {
                Ok(seconds) if seconds.is_finite() => self.seek_to(seconds),
                _ => self.dispatch(Action::SetStatus(String::from("Usage: seek <seconds>"))),
            },
            _ => self.dispatch(Action::SetStatus(String::from(
                "Unknown command. Use :help",
            ))),
        }
    }

    fn toggle_play_pause(&mut self) {
        if !self.player.has_track() {
            self.dispatch(Action::SetStatus(String::from("Nothing is playing")));
            return;
        }
        self.player.toggle_play_pause();
        let status = if self.player.is_playing() {
            "Resumed"
        } else {
            "Paused"
        };
        self.dispatch(Action::SetStatus(String::from(status)));
    }

    fn seek_by(&mut self, delta: f64) {
        self.seek_to(self.player.position() + delta);
    }

    fn seek_to(&mut self, seconds: f64) {
        if let Err(err) = self.player.seek(seconds) {
            warn!("seek failed: {err:#}");
            self.dispatch(Action::SetStatus(format!("seek error: {err:#}")));
        } else {
            self.core.dirty = true;
        }
    }

    fn change_volume(&mut self, delta: f32) {
        let next = (self.player.volume() + delta).clamp(0.0, 1.0);
        self.player.set_volume(next);
        self.report_volume();
    }

    fn report_volume(&mut self) {
        let percent = (self.player.volume() * 100.0).round() as u16;
        self.dispatch(Action::SetStatus(format!("Volume: {percent}%")));
    }
}

fn build_engine(null_audio: bool) -> Box<dyn AudioEngine> {
    if null_audio {
        return Box::new(NullAudioEngine::new());
    }
    match RodioAudioEngine::new() {
        Ok(engine) => Box::new(engine),
        Err(err) => {
            warn!("no audio output, falling back to silent playback: {err:#}");
            Box::new(NullAudioEngine::new())
        }
    }
}

pub fn run(options: LaunchOptions) -> Result<()> {
    let engine = build_engine(options.null_audio);
    let mut app = App::new(Arc::new(FsSource), engine, &options);
    if let Some(output) = app.player().output_name() {
        info!(output = %output, "audio output ready");
    }

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut last_tick = Instant::now();

    let result: Result<()> = loop {
        app.tick();
        if app.should_quit() {
            break Ok(());
        }

        if app.core.dirty || last_tick.elapsed() > Duration::from_millis(250) {
            let prompt = app.prompt();
            if let Err(err) = terminal.draw(|frame| {
                crate::ui::draw(frame, &app.core, &app.player, prompt.as_ref())
            }) {
                break Err(err.into());
            }
            app.core.dirty = false;
            last_tick = Instant::now();
        }

        match event::poll(Duration::from_millis(33)) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(err) => break Err(err.into()),
        }

        match event::read() {
            Ok(Event::Key(key)) => app.handle_key(key),
            Ok(Event::Resize(_, _)) => app.core.dirty = true,
            Ok(_) => {}
            Err(err) => break Err(err.into()),
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("shutting down");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::View;
    use crate::library::MemorySource;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Shared {
        played: RefCell<Vec<PathBuf>>,
        finished: Cell<bool>,
    }

    struct TestAudioEngine {
        shared: Rc<Shared>,
        current: Option<PathBuf>,
        paused: bool,
        volume: f32,
    }

    impl AudioEngine for TestAudioEngine {
        fn play(&mut self, path: &Path) -> Result<()> {
            self.current = Some(path.to_path_buf());
            self.paused = false;
            self.shared.finished.set(false);
            self.shared.played.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn stop(&mut self) {
            self.current = None;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn current_track(&self) -> Option<&Path> {
            self.current.as_deref()
        }

        fn position(&self) -> Option<Duration> {
            None
        }

        fn duration(&self) -> Option<Duration> {
            None
        }

        fn seek_to(&mut self, _position: Duration) -> Result<()> {
            Ok(())
        }

        fn volume(&self) -> f32 {
            self.volume
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }

        fn output_name(&self) -> Option<String> {
            Some(String::from("test"))
        }

        fn is_finished(&self) -> bool {
            self.shared.finished.get()
        }
    }

    fn source() -> Arc<dyn DirectorySource> {
        Arc::new(
            MemorySource::new()
                .with_file("/music/Low/Things We Lost/01 Whore.mp3")
                .with_file("/music/Low/Things We Lost/02 Sunflower.mp3")
                .with_file("/music/Low/Things We Lost/03 Embrace.mp3")
                .with_dir("/music/Mogwai"),
        )
    }

    fn app_with(options: LaunchOptions) -> (App, Rc<Shared>) {
        let shared = Rc::new(Shared::default());
        let engine = TestAudioEngine {
            shared: Rc::clone(&shared),
            current: None,
            paused: false,
            volume: 1.0,
        };
        (App::new(source(), Box::new(engine), &options), shared)
    }

    fn options() -> LaunchOptions {
        LaunchOptions {
            library: Some(PathBuf::from("/music")),
            theme: Theme::Dark,
            volume: 0.8,
            null_audio: true,
        }
    }

    fn settle(app: &mut App) {
        while app.core.is_scanning() {
            let outcome = app
                .outcome_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("scan outcome");
            app.dispatch(Action::ScanFinished(outcome));
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
        settle(app);
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn open_album(app: &mut App) {
        settle(app);
        press(app, KeyCode::Enter);
        press(app, KeyCode::Enter);
        assert_eq!(app.core.view(), View::Tracks);
    }

    #[test]
    fn launch_library_is_scanned() {
        let (mut app, _) = app_with(options());
        settle(&mut app);
        assert_eq!(app.core.view(), View::Artists);
        assert_eq!(app.core.artists.len(), 2);
        assert_eq!(app.player.volume(), 0.8);
    }

    #[test]
    fn keys_walk_down_and_back() {
        let (mut app, _) = app_with(options());
        open_album(&mut app);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.core.view(), View::Albums);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.core.view(), View::Artists);
    }

    #[test]
    fn enter_on_track_plays_it() {
        let (mut app, shared) = app_with(options());
        open_album(&mut app);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            shared.played.borrow().as_slice(),
            [PathBuf::from("/music/Low/Things We Lost/02 Sunflower.mp3")]
        );
        assert_eq!(app.core.status, "Playing 02 Sunflower");
    }

    #[test]
    fn auto_advance_plays_next_track_when_finished() {
        let (mut app, shared) = app_with(options());
        open_album(&mut app);
        press(&mut app, KeyCode::Enter);

        shared.finished.set(true);
        app.tick();

        assert_eq!(
            shared.played.borrow().last(),
            Some(&PathBuf::from("/music/Low/Things We Lost/02 Sunflower.mp3"))
        );
    }

    #[test]
    fn auto_advance_stops_at_album_end() {
        let (mut app, shared) = app_with(options());
        open_album(&mut app);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        shared.finished.set(true);
        app.tick();

        assert_eq!(shared.played.borrow().len(), 1);
        assert_eq!(app.core.status, "Playback finished");
    }

    #[test]
    fn track_ending_after_leaving_album_reports_playback_finished() {
        let (mut app, shared) = app_with(options());
        open_album(&mut app);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.core.view(), View::Albums);

        shared.finished.set(true);
        app.tick();

        assert_eq!(shared.played.borrow().len(), 1);
        assert_eq!(app.core.status, "Playback finished");
    }

    #[test]
    fn out_of_range_seek_command_is_reported() {
        let (mut app, _) = app_with(options());
        open_album(&mut app);
        press(&mut app, KeyCode::Enter);

        app.run_command("seek 1e30");
        assert!(app.core.status.starts_with("seek error"));
        assert!(app.player.has_track());

        app.run_command("seek 30");
        assert_eq!(app.player.position(), 30.0);
    }

    #[test]
    fn space_without_track_reports_nothing_playing() {
        let (mut app, _) = app_with(options());
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.core.status, "Nothing is playing");
    }

    #[test]
    fn volume_keys_step_and_clamp() {
        let (mut app, _) = app_with(options());
        for _ in 0..10 {
            press(&mut app, KeyCode::Char('+'));
        }
        assert_eq!(app.player.volume(), 1.0);
        assert_eq!(app.core.status, "Volume: 100%");
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.core.status, "Volume: 95%");
    }

    #[test]
    fn open_prompt_switches_library() {
        let (mut app, _) = app_with(LaunchOptions {
            library: None,
            ..options()
        });
        assert_eq!(app.core.view(), View::Empty);

        press(&mut app, KeyCode::Char('o'));
        type_text(&mut app, "/music");
        press(&mut app, KeyCode::Enter);

        assert!(app.input.is_none());
        assert_eq!(app.core.library_root, Some(PathBuf::from("/music")));
        assert_eq!(app.core.view(), View::Artists);
    }

    #[test]
    fn escape_cancels_prompt_without_navigating() {
        let (mut app, _) = app_with(options());
        open_album(&mut app);
        press(&mut app, KeyCode::Char(':'));
        type_text(&mut app, "the");
        press(&mut app, KeyCode::Esc);

        assert!(app.input.is_none());
        assert_eq!(app.core.view(), View::Tracks);
    }

    #[test]
    fn command_line_runs_commands() {
        let (mut app, _) = app_with(options());
        press(&mut app, KeyCode::Char(':'));
        type_text(&mut app, "volume 40");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.player.volume(), 0.4);

        app.run_command("theme");
        assert_eq!(app.core.theme, Theme::Amoled);

        app.run_command("volume 140");
        assert_eq!(app.core.status, "Usage: volume <0-100>");

        app.run_command("help");
        assert_eq!(app.core.status, HELP_TEXT);
    }

    #[test]
    fn unknown_command_is_reported() {
        let (mut app, _) = app_with(options());
        app.run_command("wat");
        assert!(app.core.status.contains("Unknown command"));
    }

    #[test]
    fn open_command_accepts_paths_with_spaces() {
        let (mut app, _) = app_with(options());
        app.run_command("open /music/Low/Things We Lost");
        settle(&mut app);
        assert_eq!(
            app.core.library_root,
            Some(PathBuf::from("/music/Low/Things We Lost"))
        );
        assert_eq!(app.core.view(), View::Empty);
    }

    #[test]
    fn ctrl_c_and_q_quit() {
        let (mut app, _) = app_with(options());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());

        let (mut app, _) = app_with(options());
        press(&mut app, KeyCode::Char(':'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit(), "q is text inside the command line");
    }
}
