//! File sinks: formatted text lines and JSON lines

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Formatter, Handler, Record};
use crate::severity::Severity;

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn lock(file: &Mutex<File>) -> MutexGuard<'_, File> {
    file.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Appends formatted records to a file
#[derive(Debug)]
pub struct FileHandler {
    path: PathBuf,
    formatter: Formatter,
    level: Severity,
    file: Mutex<File>,
}

impl FileHandler {
    /// Open (or create) `path` for appending, creating parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            formatter: Formatter::default(),
            level: Severity::NotSet,
            file: Mutex::new(file),
        })
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Handler for FileHandler {
    fn level(&self) -> Severity {
        self.level
    }

    fn handle(&self, record: &Record) -> io::Result<()> {
        let line = self.formatter.format(record);
        let mut file = lock(&self.file);
        writeln!(file, "{}", line)
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.file).flush()
    }
}

/// Appends one JSON object per record
#[derive(Debug)]
pub struct JsonHandler {
    path: PathBuf,
    level: Severity,
    file: Mutex<File>,
}

impl JsonHandler {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            level: Severity::NotSet,
            file: Mutex::new(file),
        })
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Handler for JsonHandler {
    fn level(&self) -> Severity {
        self.level
    }

    fn handle(&self, record: &Record) -> io::Result<()> {
        let json = serde_json::to_string(record)?;
        let mut file = lock(&self.file);
        writeln!(file, "{}", json)
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.file).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_handler_appends_formatted_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("app.log");
        let handler = FileHandler::open(&path)
            .unwrap()
            .with_formatter(Formatter::format_with("{level} {name}: {message}"));

        handler.handle(&Record::new(Severity::Info, "app", "a.rs", 1, "first")).unwrap();
        handler.handle(&Record::new(Severity::Error, "app", "a.rs", 2, "second")).unwrap();
        handler.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "INFO app: first\nERROR app: second\n");
    }

    #[test]
    fn test_file_handler_open_failure_is_io_error() {
        let temp = TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let result = FileHandler::open(temp.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_json_handler_writes_jsonl() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("events.jsonl");
        let handler = JsonHandler::open(&path).unwrap();

        handler.handle(&Record::new(Severity::Warning, "db", "db.rs", 7, "slow query")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(value["severity"], "WARNING");
        assert_eq!(value["name"], "db");
        assert_eq!(value["line"], 7);
        assert_eq!(value["message"], "slow query");
        assert!(value["timestamp"].is_string());
    }
}
