#![no_main]

use forky::core::{Action, Core, Effect, View};
use forky::library::MemorySource;
use forky::model::{SkipDirection, Theme};
use libfuzzer_sys::fuzz_target;
use std::path::PathBuf;

fuzz_target!(|data: &[u8]| {
    let source = MemorySource::new()
        .with_file("/lib/A/One/1.mp3")
        .with_file("/lib/A/One/2.mp3")
        .with_file("/lib/A/Two/1.flac")
        .with_dir("/lib/B/Empty")
        .deny("/lib/B/Empty");
    let mut core = Core::new(Theme::default());
    let mut held = Vec::new();

    if let Some(Effect::Scan(request)) = core.update(Action::PickLibrary(PathBuf::from("/lib"))) {
        core.update(Action::ScanFinished(request.run(&source)));
    }

    for byte in data {
        let index = usize::from(byte >> 4);
        let action = match byte % 12 {
            0 => Action::CursorNext,
            1 => Action::CursorPrev,
            2 => Action::Activate,
            3 => Action::Back,
            4 => Action::SelectArtist(index),
            5 => Action::SelectAlbum(index),
            6 => Action::PlayTrack(index),
            7 => Action::Skip(SkipDirection::Next),
            8 => Action::Skip(SkipDirection::Previous),
            9 => Action::BackFromAlbums,
            10 => Action::CycleTheme,
            // Deliver a scan that was held back, possibly long after it went stale.
            _ => match held.pop() {
                Some(outcome) => Action::ScanFinished(outcome),
                None => Action::BackFromTracks,
            },
        };

        match core.update(action) {
            Some(Effect::Scan(request)) if byte & 0x80 != 0 => held.push(request.run(&source)),
            Some(Effect::Scan(request)) => {
                core.update(Action::ScanFinished(request.run(&source)));
            }
            Some(Effect::Play(now_playing)) => {
                core.update(Action::PlaybackStarted(now_playing));
            }
            None => {}
        }

        let (entries, cursor) = core.visible();
        assert!(entries.is_empty() || cursor < entries.len());
        if core.view() == View::Tracks {
            assert!(core.selected_artist().is_some());
        }
    }
});
