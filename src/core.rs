use crate::library::ScanLevel;
use crate::model::{Entry, NowPlaying, SkipDirection, Theme};
use crate::worker::{ScanOutcome, ScanRequest, ScanTicket};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Empty,
    Artists,
    Albums,
    Tracks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumView {
    pub album: Entry,
    pub tracks: Vec<Entry>,
    pub cursor: usize,
    pending: Option<u64>,
}

/// Navigation below the root. An album can only be open inside an artist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistView {
    pub artist: Entry,
    pub albums: Vec<Entry>,
    pub cursor: usize,
    pub album: Option<AlbumView>,
    pending: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PickLibrary(PathBuf),
    ScanFinished(ScanOutcome),
    SelectArtist(usize),
    SelectAlbum(usize),
    BackFromAlbums,
    BackFromTracks,
    Back,
    CursorNext,
    CursorPrev,
    Activate,
    PlayTrack(usize),
    Skip(SkipDirection),
    PlaybackStarted(NowPlaying),
    PlaybackFailed(String),
    CycleTheme,
    SetStatus(String),
}

/// Work the caller has to carry out after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Scan(ScanRequest),
    Play(NowPlaying),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Core {
    pub library_root: Option<PathBuf>,
    pub artists: Vec<Entry>,
    pub cursor: usize,
    pub artist: Option<ArtistView>,
    pub now_playing: Option<NowPlaying>,
    pub theme: Theme,
    pub status: String,
    #[serde(skip)]
    pub dirty: bool,
    artists_pending: Option<u64>,
    generation: u64,
}

impl Core {
    pub fn new(theme: Theme) -> Self {
        Self {
            library_root: None,
            artists: Vec::new(),
            cursor: 0,
            artist: None,
            now_playing: None,
            theme,
            status: String::from("Press o to open a music folder"),
            dirty: true,
            artists_pending: None,
            generation: 0,
        }
    }

    pub fn view(&self) -> View {
        if self.artists.is_empty() {
            return View::Empty;
        }
        match &self.artist {
            Some(artist) if artist.album.is_some() => View::Tracks,
            Some(_) => View::Albums,
            None => View::Artists,
        }
    }

    pub fn selected_artist(&self) -> Option<&Entry> {
        self.artist.as_ref().map(|view| &view.artist)
    }

    pub fn selected_album(&self) -> Option<&Entry> {
        self.album_view().map(|view| &view.album)
    }

    pub fn albums(&self) -> &[Entry] {
        self.artist.as_ref().map_or(&[], |view| view.albums.as_slice())
    }

    pub fn tracks(&self) -> &[Entry] {
        self.album_view().map_or(&[], |view| view.tracks.as_slice())
    }

    /// The list the current view shows, with its cursor.
    pub fn visible(&self) -> (&[Entry], usize) {
        match self.view() {
            View::Empty => (&[], 0),
            View::Artists => (&self.artists, self.cursor),
            View::Albums => match &self.artist {
                Some(view) => (&view.albums, view.cursor),
                None => (&[], 0),
            },
            View::Tracks => match self.album_view() {
                Some(view) => (&view.tracks, view.cursor),
                None => (&[], 0),
            },
        }
    }

    pub fn is_now_playing(&self, entry: &Entry) -> bool {
        self.now_playing
            .as_ref()
            .is_some_and(|playing| playing.track.name == entry.name)
    }

    pub fn is_scanning(&self) -> bool {
        self.artists_pending.is_some()
            || self.artist.as_ref().is_some_and(|view| {
                view.pending.is_some()
                    || view.album.as_ref().is_some_and(|album| album.pending.is_some())
            })
    }

    pub fn update(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::PickLibrary(dir) => Some(self.pick_library(dir)),
            Action::ScanFinished(outcome) => {
                self.apply_scan(outcome);
                None
            }
            Action::SelectArtist(index) => self.select_artist(index),
            Action::SelectAlbum(index) => self.select_album(index),
            Action::BackFromAlbums => {
                self.back_from_albums();
                None
            }
            Action::BackFromTracks => {
                self.back_from_tracks();
                None
            }
            Action::Back => {
                match self.view() {
                    View::Tracks => self.back_from_tracks(),
                    View::Albums => self.back_from_albums(),
                    View::Artists | View::Empty => {}
                }
                None
            }
            Action::CursorNext => {
                self.move_cursor(true);
                None
            }
            Action::CursorPrev => {
                self.move_cursor(false);
                None
            }
            Action::Activate => self.activate(),
            Action::PlayTrack(index) => self.play_track(index),
            Action::Skip(direction) => self.skip(direction),
            Action::PlaybackStarted(now_playing) => {
                info!(track = %now_playing.track.name, "playback started");
                let label = crate::library::remove_file_extension(&now_playing.track.name);
                self.set_status(&format!("Playing {label}"));
                self.now_playing = Some(now_playing);
                None
            }
            Action::PlaybackFailed(message) => {
                self.set_status(&message);
                None
            }
            Action::CycleTheme => {
                self.theme = self.theme.next();
                self.set_status(&format!("Theme: {}", self.theme.label()));
                None
            }
            Action::SetStatus(message) => {
                self.set_status(&message);
                None
            }
        }
    }

    fn pick_library(&mut self, dir: PathBuf) -> Effect {
        let ticket = self.next_ticket(ScanLevel::Artists);
        self.artists.clear();
        self.cursor = 0;
        self.artist = None;
        self.artists_pending = Some(ticket.generation);
        self.library_root = Some(dir.clone());
        self.set_status(&format!("Scanning {}", dir.display()));
        Effect::Scan(ScanRequest { ticket, dir })
    }

    fn select_artist(&mut self, index: usize) -> Option<Effect> {
        if self.view() != View::Artists {
            return None;
        }
        let artist = self.artists.get(index)?.clone();
        let ticket = self.next_ticket(ScanLevel::Albums);
        let dir = artist.handle.path().to_path_buf();

        self.cursor = index;
        self.set_status(&format!("Opened {}", artist.name));
        self.artist = Some(ArtistView {
            artist,
            albums: Vec::new(),
            cursor: 0,
            album: None,
            pending: Some(ticket.generation),
        });
        Some(Effect::Scan(ScanRequest { ticket, dir }))
    }

    fn select_album(&mut self, index: usize) -> Option<Effect> {
        if self.view() != View::Albums {
            return None;
        }
        let album = self.albums().get(index)?.clone();
        let ticket = self.next_ticket(ScanLevel::Tracks);
        let view = self.artist.as_mut()?;
        let dir = album.handle.path().to_path_buf();

        view.cursor = index;
        let status = format!("Opened {} / {}", view.artist.name, album.name);
        view.album = Some(AlbumView {
            album,
            tracks: Vec::new(),
            cursor: 0,
            pending: Some(ticket.generation),
        });
        self.set_status(&status);
        Some(Effect::Scan(ScanRequest { ticket, dir }))
    }

    fn back_from_albums(&mut self) {
        if self.view() != View::Albums {
            return;
        }
        self.artist = None;
        self.dirty = true;
    }

    fn back_from_tracks(&mut self) {
        if self.view() != View::Tracks {
            return;
        }
        if let Some(view) = self.artist.as_mut() {
            view.album = None;
        }
        self.dirty = true;
    }

    fn activate(&mut self) -> Option<Effect> {
        let (_, cursor) = self.visible();
        match self.view() {
            View::Empty => None,
            View::Artists => self.select_artist(cursor),
            View::Albums => self.select_album(cursor),
            View::Tracks => self.play_track(cursor),
        }
    }

    fn play_track(&self, index: usize) -> Option<Effect> {
        let artist = self.artist.as_ref()?;
        let album = artist.album.as_ref()?;
        let track = album.tracks.get(index)?.clone();
        Some(Effect::Play(NowPlaying {
            track,
            artist: artist.artist.name.clone(),
            album: album.album.name.clone(),
        }))
    }

    // Neighbours come from the open album; no wraparound and no crossing into
    // another album.
    fn skip(&self, direction: SkipDirection) -> Option<Effect> {
        let playing = self.now_playing.as_ref()?;
        let tracks = self.tracks();
        let current = tracks
            .iter()
            .position(|track| track.name == playing.track.name)?;
        let neighbour = match direction {
            SkipDirection::Next => current.checked_add(1)?,
            SkipDirection::Previous => current.checked_sub(1)?,
        };
        if neighbour >= tracks.len() {
            return None;
        }
        self.play_track(neighbour)
    }

    fn move_cursor(&mut self, forward: bool) {
        let view = self.view();
        let (entries, _) = self.visible();
        let len = entries.len();
        if len == 0 {
            return;
        }

        let cursor = match view {
            View::Empty => return,
            View::Artists => &mut self.cursor,
            View::Albums => match self.artist.as_mut() {
                Some(artist) => &mut artist.cursor,
                None => return,
            },
            View::Tracks => match self.artist.as_mut().and_then(|artist| artist.album.as_mut()) {
                Some(album) => &mut album.cursor,
                None => return,
            },
        };
        *cursor = if forward {
            (*cursor + 1).min(len - 1)
        } else {
            cursor.saturating_sub(1)
        };
        self.dirty = true;
    }

    fn apply_scan(&mut self, outcome: ScanOutcome) {
        let ScanOutcome { ticket, result } = outcome;
        let count = result.as_ref().map_or(0, Vec::len);
        let failure = result.as_ref().err().map(|err| err.to_string());

        let applied = match ticket.level {
            ScanLevel::Artists => {
                if self.artists_pending == Some(ticket.generation) {
                    self.artists_pending = None;
                    self.artists = result.unwrap_or_default();
                    self.cursor = 0;
                    true
                } else {
                    false
                }
            }
            ScanLevel::Albums => match self.artist.as_mut() {
                Some(view) if view.pending == Some(ticket.generation) => {
                    view.pending = None;
                    view.albums = result.unwrap_or_default();
                    view.cursor = 0;
                    true
                }
                _ => false,
            },
            ScanLevel::Tracks => match self.album_view_mut() {
                Some(view) if view.pending == Some(ticket.generation) => {
                    view.pending = None;
                    view.tracks = result.unwrap_or_default();
                    view.cursor = 0;
                    true
                }
                _ => false,
            },
        };

        if !applied {
            debug!(
                level = ticket.level.label(),
                generation = ticket.generation,
                "dropping stale scan result"
            );
            return;
        }

        match failure {
            Some(message) => self.set_status(&format!(
                "Could not list {}: {message}",
                ticket.level.label()
            )),
            None => self.set_status(&format!("Found {count} {}", ticket.level.label())),
        }
    }

    fn album_view(&self) -> Option<&AlbumView> {
        self.artist.as_ref()?.album.as_ref()
    }

    fn album_view_mut(&mut self) -> Option<&mut AlbumView> {
        self.artist.as_mut()?.album.as_mut()
    }

    fn next_ticket(&mut self, level: ScanLevel) -> ScanTicket {
        self.generation += 1;
        ScanTicket {
            level,
            generation: self.generation,
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{DirectorySource, MemorySource, ScanError};
    use proptest::prop_assert;
    use std::path::Path;

    fn library() -> MemorySource {
        MemorySource::new()
            .with_file("/lib/Björk/Post/02 Hyperballad.mp3")
            .with_file("/lib/Björk/Post/01 Army of Me.flac")
            .with_file("/lib/Björk/Post/03 The Modern Things.ogg")
            .with_file("/lib/Björk/Post/cover.jpg")
            .with_file("/lib/Björk/Debut/01 Human Behaviour.mp3")
            .with_dir("/lib/Air")
            .with_file("/lib/readme.txt")
    }

    /// Applies an action and completes any effect synchronously.
    fn drive(core: &mut Core, source: &dyn DirectorySource, action: Action) {
        match core.update(action) {
            Some(Effect::Scan(request)) => {
                let outcome = request.run(source);
                core.update(Action::ScanFinished(outcome));
            }
            Some(Effect::Play(now_playing)) => {
                core.update(Action::PlaybackStarted(now_playing));
            }
            None => {}
        }
    }

    fn opened_post(source: &MemorySource) -> Core {
        let mut core = Core::new(Theme::default());
        drive(&mut core, source, Action::PickLibrary(PathBuf::from("/lib")));
        drive(&mut core, source, Action::SelectArtist(1));
        drive(&mut core, source, Action::SelectAlbum(1));
        core
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[test]
    fn new_core_shows_empty_view() {
        let core = Core::new(Theme::Dark);
        assert_eq!(core.view(), View::Empty);
        assert_eq!(core.visible().0.len(), 0);
    }

    #[test]
    fn picking_library_lists_artists() {
        let source = library();
        let mut core = Core::new(Theme::default());
        drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/lib")));

        assert_eq!(core.view(), View::Artists);
        assert_eq!(names(&core.artists), vec!["Air", "Björk"]);
        assert_eq!(core.status, "Found 2 artists");
    }

    #[test]
    fn walks_down_to_tracks() {
        let source = library();
        let core = opened_post(&source);

        assert_eq!(core.view(), View::Tracks);
        assert_eq!(core.selected_artist().map(|e| e.name.as_str()), Some("Björk"));
        assert_eq!(core.selected_album().map(|e| e.name.as_str()), Some("Post"));
        assert_eq!(
            names(core.tracks()),
            vec![
                "01 Army of Me.flac",
                "02 Hyperballad.mp3",
                "03 The Modern Things.ogg"
            ]
        );
    }

    #[test]
    fn select_album_from_root_is_ignored() {
        let source = library();
        let mut core = Core::new(Theme::default());
        drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/lib")));
        let before = core.clone();

        assert_eq!(core.update(Action::SelectAlbum(0)), None);
        assert_eq!(core, before);
    }

    #[test]
    fn select_artist_clears_deeper_lists() {
        let source = library();
        let mut core = opened_post(&source);
        core.update(Action::Back);
        core.update(Action::Back);
        assert_eq!(core.view(), View::Artists);
        assert!(core.albums().is_empty());
        assert!(core.tracks().is_empty());

        let effect = core.update(Action::SelectArtist(0));
        assert!(matches!(effect, Some(Effect::Scan(ref request)) if request.ticket.level == ScanLevel::Albums));
        assert_eq!(core.view(), View::Albums);
        assert!(core.albums().is_empty());
        assert!(core.selected_album().is_none());
    }

    #[test]
    fn back_from_tracks_keeps_artist() {
        let source = library();
        let mut core = opened_post(&source);

        core.update(Action::BackFromTracks);
        assert_eq!(core.view(), View::Albums);
        assert_eq!(core.selected_artist().map(|e| e.name.as_str()), Some("Björk"));
        assert!(core.tracks().is_empty());
        assert_eq!(names(core.albums()), vec!["Debut", "Post"]);
    }

    #[test]
    fn back_from_albums_returns_to_root() {
        let source = library();
        let mut core = opened_post(&source);

        core.update(Action::BackFromAlbums);
        assert_eq!(core.view(), View::Tracks, "artist level is mandatory on the way back");

        core.update(Action::BackFromTracks);
        core.update(Action::BackFromAlbums);
        assert_eq!(core.view(), View::Artists);
        assert!(core.selected_artist().is_none());
        assert!(core.albums().is_empty());
    }

    #[test]
    fn cursor_is_clamped_and_activate_follows_it() {
        let source = library();
        let mut core = Core::new(Theme::default());
        drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/lib")));

        core.update(Action::CursorPrev);
        assert_eq!(core.cursor, 0);
        for _ in 0..5 {
            core.update(Action::CursorNext);
        }
        assert_eq!(core.cursor, 1);

        drive(&mut core, &source, Action::Activate);
        assert_eq!(core.selected_artist().map(|e| e.name.as_str()), Some("Björk"));
    }

    #[test]
    fn activate_on_track_starts_playback_with_context() {
        let source = library();
        let mut core = opened_post(&source);
        core.update(Action::CursorNext);

        let effect = core.update(Action::Activate).expect("play effect");
        let Effect::Play(now_playing) = effect else {
            panic!("expected play effect");
        };
        assert_eq!(now_playing.track.name, "02 Hyperballad.mp3");
        assert_eq!(now_playing.artist, "Björk");
        assert_eq!(now_playing.album, "Post");
        assert!(core.now_playing.is_none(), "only set once playback starts");
    }

    #[test]
    fn skip_next_moves_to_neighbour() {
        let source = library();
        let mut core = opened_post(&source);
        drive(&mut core, &source, Action::PlayTrack(0));

        drive(&mut core, &source, Action::Skip(SkipDirection::Next));
        assert_eq!(
            core.now_playing.as_ref().map(|np| np.track.name.as_str()),
            Some("02 Hyperballad.mp3")
        );

        drive(&mut core, &source, Action::Skip(SkipDirection::Previous));
        assert_eq!(
            core.now_playing.as_ref().map(|np| np.track.name.as_str()),
            Some("01 Army of Me.flac")
        );
    }

    #[test]
    fn skip_next_on_last_track_is_noop() {
        let source = library();
        let mut core = opened_post(&source);
        drive(&mut core, &source, Action::PlayTrack(2));
        let before = core.clone();

        assert_eq!(core.update(Action::Skip(SkipDirection::Next)), None);
        assert_eq!(core, before);
    }

    #[test]
    fn skip_previous_on_first_track_is_noop() {
        let source = library();
        let mut core = opened_post(&source);
        drive(&mut core, &source, Action::PlayTrack(0));

        assert_eq!(core.update(Action::Skip(SkipDirection::Previous)), None);
    }

    #[test]
    fn skip_does_not_cross_into_other_album() {
        let source = library();
        let mut core = opened_post(&source);
        drive(&mut core, &source, Action::PlayTrack(0));

        core.update(Action::Back);
        drive(&mut core, &source, Action::SelectAlbum(0));
        assert_eq!(names(core.tracks()), vec!["01 Human Behaviour.mp3"]);

        assert_eq!(core.update(Action::Skip(SkipDirection::Next)), None);
        assert_eq!(
            core.now_playing.as_ref().map(|np| np.album.as_str()),
            Some("Post")
        );
    }

    #[test]
    fn now_playing_survives_navigation() {
        let source = library();
        let mut core = opened_post(&source);
        drive(&mut core, &source, Action::PlayTrack(1));
        core.update(Action::Back);
        core.update(Action::Back);

        assert_eq!(core.view(), View::Artists);
        assert_eq!(
            core.now_playing.as_ref().map(|np| np.track.name.as_str()),
            Some("02 Hyperballad.mp3")
        );
    }

    #[test]
    fn failed_playback_keeps_previous_track() {
        let source = library();
        let mut core = opened_post(&source);
        drive(&mut core, &source, Action::PlayTrack(0));
        let playing = core.now_playing.clone();

        core.update(Action::PlaybackFailed(String::from("playback error: boom")));
        assert_eq!(core.now_playing, playing);
        assert_eq!(core.status, "playback error: boom");
    }

    #[test]
    fn stale_album_scan_does_not_overwrite_newer_state() {
        let source = library();
        let mut core = Core::new(Theme::default());
        drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/lib")));

        let Some(Effect::Scan(slow)) = core.update(Action::SelectArtist(1)) else {
            panic!("expected album scan");
        };
        core.update(Action::Back);
        let Some(Effect::Scan(fresh)) = core.update(Action::SelectArtist(0)) else {
            panic!("expected album scan");
        };

        core.update(Action::ScanFinished(fresh.run(&source)));
        let settled = core.clone();
        core.update(Action::ScanFinished(slow.run(&source)));

        assert_eq!(core, settled);
        assert_eq!(core.selected_artist().map(|e| e.name.as_str()), Some("Air"));
        assert!(core.albums().is_empty());
    }

    #[test]
    fn stale_track_scan_after_back_is_dropped() {
        let source = library();
        let mut core = Core::new(Theme::default());
        drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/lib")));
        drive(&mut core, &source, Action::SelectArtist(1));

        let Some(Effect::Scan(slow)) = core.update(Action::SelectAlbum(1)) else {
            panic!("expected track scan");
        };
        core.update(Action::Back);
        core.update(Action::ScanFinished(slow.run(&source)));

        assert_eq!(core.view(), View::Albums);
        assert!(core.tracks().is_empty());
    }

    #[test]
    fn repicking_library_drops_old_artist_scan() {
        let source = library().with_dir("/other/Zappa");
        let mut core = Core::new(Theme::default());

        let Some(Effect::Scan(first)) = core.update(Action::PickLibrary(PathBuf::from("/lib")))
        else {
            panic!("expected artist scan");
        };
        drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/other")));
        core.update(Action::ScanFinished(first.run(&source)));

        assert_eq!(names(&core.artists), vec!["Zappa"]);
        assert_eq!(core.library_root, Some(PathBuf::from("/other")));
    }

    #[test]
    fn failed_scan_yields_empty_list_and_status() {
        let source = library().deny("/lib/Björk");
        let mut core = Core::new(Theme::default());
        drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/lib")));
        drive(&mut core, &source, Action::SelectArtist(1));

        assert_eq!(core.view(), View::Albums);
        assert!(core.albums().is_empty());
        assert_eq!(
            core.status,
            format!(
                "Could not list albums: {}",
                ScanError::Denied(PathBuf::from("/lib/Björk"))
            )
        );
        assert!(!core.is_scanning());
    }

    #[test]
    fn missing_library_shows_empty_view() {
        let source = library();
        let mut core = Core::new(Theme::default());
        drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/nowhere")));

        assert_eq!(core.view(), View::Empty);
        assert!(core.status.starts_with("Could not list artists"));
    }

    #[test]
    fn theme_cycles_back_after_three_presses() {
        let mut core = Core::new(Theme::Amoled);
        for _ in 0..3 {
            core.update(Action::CycleTheme);
        }
        assert_eq!(core.theme, Theme::Amoled);
    }

    #[test]
    fn state_round_trips_through_json() {
        let source = library();
        let core = opened_post(&source);
        let json = serde_json::to_string(&core).expect("serialize");
        let mut restored: Core = serde_json::from_str(&json).expect("deserialize");
        restored.dirty = core.dirty;
        assert_eq!(restored, core);
    }

    proptest::proptest! {
        #[test]
        fn navigation_invariants_hold_after_random_actions(ops in proptest::collection::vec(0u8..10, 1..200)) {
            let source = library();
            let mut core = Core::new(Theme::default());
            drive(&mut core, &source, Action::PickLibrary(PathBuf::from("/lib")));

            for op in ops {
                let action = match op {
                    0 => Action::CursorNext,
                    1 => Action::CursorPrev,
                    2 => Action::Activate,
                    3 => Action::Back,
                    4 => Action::SelectArtist(1),
                    5 => Action::SelectAlbum(0),
                    6 => Action::Skip(SkipDirection::Next),
                    7 => Action::Skip(SkipDirection::Previous),
                    8 => Action::BackFromAlbums,
                    _ => Action::CycleTheme,
                };
                drive(&mut core, &source, action);

                let (entries, cursor) = core.visible();
                if !entries.is_empty() {
                    prop_assert!(cursor < entries.len());
                }
                match core.view() {
                    View::Tracks => prop_assert!(core.selected_artist().is_some() && core.selected_album().is_some()),
                    View::Albums => prop_assert!(core.selected_artist().is_some() && core.selected_album().is_none()),
                    View::Artists => prop_assert!(core.selected_artist().is_none()),
                    View::Empty => prop_assert!(core.artists.is_empty()),
                }
                if core.selected_album().is_none() {
                    prop_assert!(core.tracks().is_empty());
                }
                if let Some(playing) = &core.now_playing {
                    prop_assert!(Path::new(playing.track.handle.path()).starts_with("/lib/Björk"));
                }
            }
        }
    }
}
