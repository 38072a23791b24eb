//! Playlist loading
//!
//! The playlist is a newline-delimited file of track paths, read once at
//! startup. A missing or empty playlist is fatal.

use duodeck_common::{Error, Result, Track};
use std::path::Path;
use tracing::warn;

/// Ordered, immutable track list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Build from tracks; an empty list is rejected
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(Error::Config("Playlist file is empty".to_string()));
        }
        Ok(Self { tracks })
    }

    /// Parse playlist text: one path per line, surrounding whitespace and
    /// blank lines ignored
    pub fn parse(text: &str) -> Result<Self> {
        let tracks = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Track::new)
            .collect();
        Self::new(tracks)
    }

    /// Load and parse the playlist file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Playlist file not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`, wrapping modulo the playlist length
    pub fn get(&self, index: usize) -> &Track {
        &self.tracks[index % self.tracks.len()]
    }

    /// Index following `index`, wrapping to 0 after the last track
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Log tracks that do not exist under `music_root`
    ///
    /// Returns the number of missing tracks. Missing tracks are not fatal:
    /// the playback engine reports its own error when asked to play one.
    pub fn check_against(&self, music_root: &Path) -> usize {
        let missing: Vec<&Track> = self
            .tracks
            .iter()
            .filter(|t| !music_root.join(t.path()).exists())
            .collect();
        for track in missing.iter().take(10) {
            warn!("Playlist entry not found under {}: {}", music_root.display(), track);
        }
        if missing.len() > 10 {
            warn!("... and {} more missing playlist entries", missing.len() - 10);
        }
        missing.len()
    }
}
