// src/output/sink.rs
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::engine::CredentialPair;

/// Append-only persistence for found credentials, one `user:password` line
/// per success, flushed per write so partial results survive a crash or
/// interrupt. Opened in append mode when the file already exists.
#[derive(Debug)]
pub struct ResultSink {
    file: File,
}

impl ResultSink {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(ResultSink { file })
    }

    pub fn append(&mut self, pair: &CredentialPair) -> io::Result<()> {
        writeln!(self.file, "{}", pair)?;
        self.file.flush()
    }
}
