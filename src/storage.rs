use log::info;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Where the best score across sessions lives. Failures on either side are
/// non-fatal: the in-memory value stays authoritative for the session.
pub trait HighScoreStore {
    fn load(&mut self) -> u32;
    fn save(&mut self, value: u32) -> io::Result<()>;
}

/// Single-integer dotfile next to where the game is run.
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    pub const DEFAULT_PATH: &'static str = ".gridsnake_high_score";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreFile { path: path.into() }
    }
}

impl Default for HighScoreFile {
    fn default() -> Self {
        HighScoreFile::new(Self::DEFAULT_PATH)
    }
}

impl HighScoreStore for HighScoreFile {
    fn load(&mut self) -> u32 {
        match fs::read_to_string(&self.path) {
            // A garbled file counts as no high score at all.
            Ok(contents) => contents.trim().parse().unwrap_or(0),
            Err(err) => {
                info!("no saved high score ({err}), starting from 0");
                0
            }
        }
    }

    fn save(&mut self, value: u32) -> io::Result<()> {
        fs::write(&self.path, value.to_string())
    }
}

/// Store that never touches the filesystem; used by tests and useful for
/// throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    value: u32,
}

impl MemoryStore {
    pub fn new(value: u32) -> Self {
        MemoryStore { value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&mut self) -> u32 {
        self.value
    }

    fn save(&mut self, value: u32) -> io::Result<()> {
        self.value = value;
        Ok(())
    }
}

/// Store whose writes always fail. Lets tests exercise the
/// persistence-failure path without a read-only filesystem.
#[cfg(test)]
pub struct BrokenStore;

#[cfg(test)]
impl HighScoreStore for BrokenStore {
    fn load(&mut self) -> u32 {
        0
    }

    fn save(&mut self, _value: u32) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "store is broken"))
    }
}
