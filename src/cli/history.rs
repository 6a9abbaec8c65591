use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const HISTORY_CAPACITY: usize = 500;
const HISTORY_FILE_NAME: &str = "mondoctl.history";

pub fn default_history_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(HISTORY_FILE_NAME)
}

/// Commands entered at the prompt, one per line on disk.
#[derive(Debug)]
pub struct History {
    path: PathBuf,
    entries: Vec<String>,
}

impl History {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Reads the history file. A missing file is an empty history.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err),
        };

        let mut history = Self { path, entries };
        history.truncate();
        Ok(history)
    }

    pub fn push(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() || self.entries.last().is_some_and(|last| last == command) {
            return;
        }
        self.entries.push(command.to_string());
        self.truncate();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut contents = self.entries.join("\n");
        contents.push('\n');
        fs::write(&self.path, contents)
    }

    fn truncate(&mut self) {
        if self.entries.len() > HISTORY_CAPACITY {
            let excess = self.entries.len() - HISTORY_CAPACITY;
            self.entries.drain(..excess);
        }
    }
}
