use anyhow::{Context, Result};
use rodio::Source;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::time::Instant;
use tracing::debug;

fn open_decoder(path: &Path) -> Result<impl Source + Send + 'static> {
    let file =
        File::open(path).with_context(|| format!("failed to open track {}", path.display()))?;
    Decoder::try_from(file).with_context(|| format!("failed to decode {}", path.display()))
}

pub trait AudioEngine {
    /// Starts `path` from the beginning. On error the previous track keeps
    /// playing.
    fn play(&mut self, path: &Path) -> Result<()>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn is_paused(&self) -> bool;
    fn current_track(&self) -> Option<&Path>;
    fn position(&self) -> Option<Duration>;
    fn duration(&self) -> Option<Duration>;
    fn seek_to(&mut self, position: Duration) -> Result<()>;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn output_name(&self) -> Option<String>;
    fn is_finished(&self) -> bool;
}

pub struct RodioAudioEngine {
    stream: OutputStream,
    sink: Sink,
    current: Option<PathBuf>,
    track_duration: Option<Duration>,
    volume: f32,
}

impl RodioAudioEngine {
    pub fn new() -> Result<Self> {
        let mut stream = with_silenced_stderr(Self::open_output_stream)?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());

        Ok(Self {
            stream,
            sink,
            current: None,
            track_duration: None,
            volume: 1.0,
        })
    }

    fn open_output_stream() -> Result<OutputStream> {
        let default_err = match OutputStreamBuilder::from_default_device()
            .context("failed to open default system output stream")
            .and_then(|builder| {
                builder
                    .with_error_callback(|_| {})
                    .open_stream_or_fallback()
                    .context("failed to start default output stream")
            }) {
            Ok(stream) => return Ok(stream),
            Err(err) => err,
        };

        let host = rodio::cpal::default_host();
        let mut candidates: Vec<_> = host
            .output_devices()
            .ok()
            .into_iter()
            .flatten()
            .filter_map(|device| device.name().ok().map(|name| (name, device)))
            .collect();
        // Sound servers first, they usually accept any format.
        candidates.sort_by_cached_key(|(name, _)| {
            let lower = name.to_ascii_lowercase();
            let rank = if lower.contains("pulse") {
                0_u8
            } else if lower.contains("pipewire") {
                1_u8
            } else if lower.contains("default") {
                2_u8
            } else {
                3_u8
            };
            (rank, lower)
        });

        for (name, device) in candidates {
            let opened = OutputStreamBuilder::from_device(device)
                .context("failed to open fallback output device")
                .and_then(|builder| {
                    builder
                        .with_error_callback(|_| {})
                        .open_stream_or_fallback()
                        .context("failed to start fallback output stream")
                });
            match opened {
                Ok(stream) => return Ok(stream),
                Err(err) => debug!(device = %name, "output device rejected: {err:#}"),
            }
        }

        Err(default_err.context("unable to start any audio output stream"))
    }
}

impl AudioEngine for RodioAudioEngine {
    fn play(&mut self, path: &Path) -> Result<()> {
        let source = open_decoder(path)?;
        let duration = source.total_duration();

        self.sink.stop();
        self.sink = Sink::connect_new(self.stream.mixer());
        self.sink.set_volume(self.volume);
        self.sink.append(source);
        self.track_duration = duration;
        self.current = Some(path.to_path_buf());
        debug!(path = %path.display(), ?duration, "track loaded");
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.current = None;
        self.track_duration = None;
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn current_track(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    fn position(&self) -> Option<Duration> {
        self.current.as_ref()?;
        Some(self.sink.get_pos())
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        if self.current.is_none() {
            return Err(anyhow::anyhow!("no active track"));
        }

        self.sink
            .try_seek(position)
            .map_err(|err| anyhow::anyhow!("failed to seek current track: {err:?}"))
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    fn output_name(&self) -> Option<String> {
        Some("System default output".to_string())
    }

    fn is_finished(&self) -> bool {
        self.current.is_some() && !self.sink.is_paused() && self.sink.empty()
    }
}

// Device probing in the audio backends writes straight to stderr, which would
// scribble over the alternate screen.
#[cfg(unix)]
struct SilencedStderr {
    saved: libc::c_int,
}

#[cfg(unix)]
impl SilencedStderr {
    fn new() -> Option<Self> {
        let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
        if saved < 0 {
            return None;
        }
        let devnull = unsafe { libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY) };
        if devnull >= 0 {
            unsafe {
                libc::dup2(devnull, libc::STDERR_FILENO);
                libc::close(devnull);
            }
        }
        Some(Self { saved })
    }
}

#[cfg(unix)]
impl Drop for SilencedStderr {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved, libc::STDERR_FILENO);
            libc::close(self.saved);
        }
    }
}

#[cfg(unix)]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    let _restore = SilencedStderr::new();
    operation()
}

#[cfg(not(unix))]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    operation()
}

/// Playback position that advances with wall time while running.
#[derive(Debug, Clone, Copy)]
struct Clock {
    offset: Duration,
    running_since: Option<Instant>,
}

impl Clock {
    fn running() -> Self {
        Self {
            offset: Duration::ZERO,
            running_since: Some(Instant::now()),
        }
    }

    fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    fn now(&self) -> Duration {
        match self.running_since {
            Some(since) => self.offset.saturating_add(since.elapsed()),
            None => self.offset,
        }
    }

    fn halt(&mut self) {
        self.offset = self.now();
        self.running_since = None;
    }

    fn run(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    fn jump(&mut self, to: Duration) {
        self.offset = to;
        if self.is_running() {
            self.running_since = Some(Instant::now());
        }
    }
}

struct SilentTrack {
    path: PathBuf,
    length: Option<Duration>,
    clock: Clock,
}

impl SilentTrack {
    fn position(&self) -> Duration {
        let now = self.clock.now();
        self.length.map_or(now, |length| now.min(length))
    }
}

/// Keeps a logical clock instead of producing sound. Used with `--null-audio`
/// and when no output device can be opened.
pub struct NullAudioEngine {
    track: Option<SilentTrack>,
    volume: f32,
}

impl NullAudioEngine {
    pub fn new() -> Self {
        Self {
            track: None,
            volume: 1.0,
        }
    }
}

impl Default for NullAudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for NullAudioEngine {
    // Files that cannot be decoded still "play", with an unknown length.
    fn play(&mut self, path: &Path) -> Result<()> {
        let length = open_decoder(path)
            .ok()
            .and_then(|source| source.total_duration())
            .filter(|length| !length.is_zero());
        self.track = Some(SilentTrack {
            path: path.to_path_buf(),
            length,
            clock: Clock::running(),
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(track) = self.track.as_mut() {
            track.clock.halt();
        }
    }

    fn resume(&mut self) {
        if let Some(track) = self.track.as_mut() {
            track.clock.run();
        }
    }

    fn stop(&mut self) {
        self.track = None;
    }

    fn is_paused(&self) -> bool {
        self.track
            .as_ref()
            .is_some_and(|track| !track.clock.is_running())
    }

    fn current_track(&self) -> Option<&Path> {
        self.track.as_ref().map(|track| track.path.as_path())
    }

    fn position(&self) -> Option<Duration> {
        self.track.as_ref().map(SilentTrack::position)
    }

    fn duration(&self) -> Option<Duration> {
        self.track.as_ref()?.length
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        let Some(track) = self.track.as_mut() else {
            anyhow::bail!("no active track");
        };
        let target = track.length.map_or(position, |length| position.min(length));
        track.clock.jump(target);
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn output_name(&self) -> Option<String> {
        Some("Null audio engine".to_string())
    }

    fn is_finished(&self) -> bool {
        self.track.as_ref().is_some_and(|track| {
            track.clock.is_running()
                && track
                    .length
                    .is_some_and(|length| track.clock.now() >= length)
        })
    }
}
