//! JSONL activity log: one self-contained JSON object per line.
//!
//! Lines are assembled in memory and written with a single `write_all` so a
//! concurrent `tail -f` never sees a partial line. Files rotate by size.
//!
//! Degradation chain:
//! 1. Primary file path
//! 2. stderr with `[NIGHTLIGHT-JSONL]` prefix
//! 3. Silent discard (logging must never take the client down)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::config::{Config, LoggingConfig};
use crate::core::errors::{NightlightError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStart,
    SessionStop,
    PageFetch,
    Navigation,
    Action,
    Purchase,
    Error,
}

/// One log line. Only `ts`, `event` and `severity` are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// Paginated list involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    /// `NL-xxxx` code when an infrastructure error is involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            list: None,
            route: None,
            coordinator: None,
            items: None,
            total: None,
            duration_ms: None,
            ok: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    /// Rotate once the file would exceed this many bytes.
    pub max_size_bytes: u64,
    /// Rotated generations kept beside the live file (`.1` is the newest).
    pub max_rotated_files: u32,
    pub sync_every: Duration,
}

impl JsonlConfig {
    pub fn from_config(config: &Config) -> Self {
        let LoggingConfig {
            max_size_bytes,
            max_rotated_files,
            ..
        } = config.logging;
        Self {
            path: config.paths.activity_log.clone(),
            max_size_bytes,
            max_rotated_files,
            sync_every: Duration::from_secs(10),
        }
    }
}

/// Where lines currently go. Only ever moves down the list.
enum Sink {
    File {
        out: BufWriter<File>,
        size: u64,
        synced_at: Instant,
    },
    Stderr,
    Discard,
}

/// Append-only writer with rotation and a stderr fallback.
pub struct JsonlWriter {
    config: JsonlConfig,
    sink: Sink,
}

impl JsonlWriter {
    pub fn open(config: JsonlConfig) -> Self {
        let sink = match file_sink(&config.path) {
            Ok(sink) => sink,
            Err(e) => {
                let _ = writeln!(
                    io::stderr(),
                    "{STDERR_PREFIX} cannot open {} ({e}), logging to stderr",
                    config.path.display()
                );
                Sink::Stderr
            }
        };
        Self { config, sink }
    }

    pub fn write_entry(&mut self, entry: &LogEntry) {
        match serde_json::to_string(entry) {
            Ok(mut line) => {
                line.push('\n');
                self.write_line(&line);
            }
            Err(e) => {
                let _ = writeln!(io::stderr(), "{STDERR_PREFIX} unserializable entry: {e}");
            }
        }
    }

    pub fn flush(&mut self) {
        if let Sink::File { out, .. } = &mut self.sink {
            let _ = out.flush();
        }
    }

    /// Flush and push the file contents to disk.
    pub fn fsync(&mut self) {
        if let Sink::File { out, synced_at, .. } = &mut self.sink {
            let _ = out.flush();
            let _ = out.get_ref().sync_data();
            *synced_at = Instant::now();
        }
    }

    pub fn state(&self) -> &'static str {
        match self.sink {
            Sink::File { .. } => "file",
            Sink::Stderr => "stderr",
            Sink::Discard => "discard",
        }
    }

    /// Size of the live file, including what it held when opened.
    pub fn bytes_written(&self) -> u64 {
        match self.sink {
            Sink::File { size, .. } => size,
            Sink::Stderr | Sink::Discard => 0,
        }
    }

    // ──────────────────────── internals ────────────────────────

    fn write_line(&mut self, line: &str) {
        let len = line.len() as u64;
        if let Sink::File { size, .. } = self.sink
            && size > 0
            && size + len > self.config.max_size_bytes
        {
            self.rotate();
        }

        let failed = match &mut self.sink {
            Sink::File {
                out,
                size,
                synced_at,
            } => {
                let ok = out.write_all(line.as_bytes()).is_ok();
                if ok {
                    *size += len;
                    if synced_at.elapsed() >= self.config.sync_every {
                        let _ = out.flush();
                        let _ = out.get_ref().sync_data();
                        *synced_at = Instant::now();
                    }
                }
                !ok
            }
            Sink::Stderr => write!(io::stderr(), "{STDERR_PREFIX} {line}").is_err(),
            Sink::Discard => false,
        };

        if failed {
            let was_file = matches!(self.sink, Sink::File { .. });
            self.step_down();
            if was_file {
                self.write_line(line);
            }
        }
    }

    fn step_down(&mut self) {
        self.sink = match self.sink {
            Sink::File { .. } => {
                let _ = writeln!(io::stderr(), "{STDERR_PREFIX} write failed, logging to stderr");
                Sink::Stderr
            }
            Sink::Stderr | Sink::Discard => Sink::Discard,
        };
    }

    /// Shift `.1..N` up by one, move the live file to `.1` and start fresh.
    fn rotate(&mut self) {
        self.flush();
        self.sink = Sink::Discard;
        let base = &self.config.path;
        let keep = self.config.max_rotated_files;

        if keep == 0 {
            let _ = fs::remove_file(base);
        } else {
            let _ = fs::remove_file(rotated_name(base, keep));
            for generation in (1..keep).rev() {
                let _ = fs::rename(rotated_name(base, generation), rotated_name(base, generation + 1));
            }
            let _ = fs::rename(base, rotated_name(base, 1));
        }

        self.sink = match file_sink(base) {
            Ok(sink) => sink,
            Err(_) => Sink::Stderr,
        };
    }
}

// ──────────────────────── helpers ────────────────────────

const STDERR_PREFIX: &str = "[NIGHTLIGHT-JSONL]";

fn file_sink(path: &Path) -> Result<Sink> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| NightlightError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| NightlightError::io(path, source))?;
    let size = file.metadata().map_or(0, |meta| meta.len());
    Ok(Sink::File {
        out: BufWriter::with_capacity(16 * 1024, file),
        size,
        synced_at: Instant::now(),
    })
}

/// `activity.jsonl` → `activity.jsonl.3`.
fn rotated_name(base: &Path, generation: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{generation}"));
    PathBuf::from(name)
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
