use crate::audio::AudioEngine;
use crate::library::DirectorySource;
use crate::model::{Entry, Handle};
use anyhow::{Context, Result, bail};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Ended,
}

/// Single playback slot over an [`AudioEngine`], with the position, duration
/// and play state mirrored for rendering.
pub struct Player {
    engine: Box<dyn AudioEngine>,
    position: f64,
    duration: Option<f64>,
    playing: bool,
    ended_reported: bool,
}

impl Player {
    pub fn new(engine: Box<dyn AudioEngine>) -> Self {
        Self {
            engine,
            position: 0.0,
            duration: None,
            playing: false,
            ended_reported: false,
        }
    }

    /// Starts `track` from zero. On error nothing changes and the previous
    /// track, if any, keeps playing.
    pub fn load(&mut self, source: &dyn DirectorySource, track: &Entry) -> Result<()> {
        let Handle::File(path) = &track.handle else {
            bail!("{} is not a track", track.name);
        };

        let bytes = source
            .byte_source(path)
            .with_context(|| format!("cannot open {}", track.name))
            .inspect_err(|err| warn!("playback error: {err:#}"))?;
        self.engine
            .play(&bytes)
            .with_context(|| format!("cannot play {}", track.name))
            .inspect_err(|err| warn!("playback error: {err:#}"))?;

        info!(path = %bytes.display(), "track started");
        self.position = 0.0;
        self.duration = self.engine.duration().map(|duration| duration.as_secs_f64());
        self.playing = true;
        self.ended_reported = false;
        Ok(())
    }

    pub fn toggle_play_pause(&mut self) {
        if self.engine.current_track().is_none() {
            return;
        }
        if self.engine.is_paused() {
            self.engine.resume();
            self.playing = true;
        } else {
            self.engine.pause();
            self.playing = false;
        }
    }

    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        if self.engine.current_track().is_none() {
            return Ok(());
        }

        let mut target = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        if let Some(duration) = self.duration {
            target = target.min(duration);
        }

        let position = Duration::try_from_secs_f64(target)
            .with_context(|| format!("cannot seek to {target} seconds"))?;
        self.engine.seek_to(position)?;
        self.position = target;
        Ok(())
    }

    pub fn seek_by(&mut self, delta: f64) -> Result<()> {
        self.seek(self.position + delta)
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    /// Refreshes the mirrored fields. Reports [`PlayerEvent::Ended`] once per
    /// loaded track.
    pub fn poll(&mut self) -> Option<PlayerEvent> {
        if let Some(position) = self.engine.position() {
            self.position = position.as_secs_f64();
        }
        if let Some(duration) = self.engine.duration() {
            self.duration = Some(duration.as_secs_f64());
        }

        if self.ended_reported || !self.engine.is_finished() {
            return None;
        }
        self.ended_reported = true;
        self.playing = false;
        Some(PlayerEvent::Ended)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn has_track(&self) -> bool {
        self.engine.current_track().is_some()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn output_name(&self) -> Option<String> {
        self.engine.output_name()
    }

    pub fn engine(&self) -> &dyn AudioEngine {
        self.engine.as_ref()
    }
}
