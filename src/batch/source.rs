//! Ratings sources.
//!
//! A source is read twice by a batch job (once to count, once to aggregate),
//! so `open` must start from the beginning on every call.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;

pub trait RecordSource: Send + Sync {
    /// Human readable origin, used in logs and job descriptions.
    fn name(&self) -> String;

    /// A fresh reader over the whole source, header included.
    fn open(&self) -> Result<Box<dyn Read + '_>>;
}

/// In-memory CSV text.
#[derive(Debug, Clone, Default)]
pub struct LineSource {
    text: String,
}

impl LineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        Self { text }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl RecordSource for LineSource {
    fn name(&self) -> String {
        format!("memory ({} bytes)", self.text.len())
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.text.as_bytes())))
    }
}

/// A file on the local filesystem, reopened on every pass.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        let file = File::open(&self.path)
            .with_context(|| format!("cannot open {}", self.path.display()))?;
        Ok(Box::new(file))
    }
}
