use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

const LOG_FILE_NAME: &str = "onec-search.log";
const ARCHIVE_PREFIX: &str = "onec-search-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static SINK: OnceLock<Mutex<File>> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// One `key=value` pair attached to a log record.
pub type Field<'a> = (&'a str, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// Opens the log file for appending. Records emitted before this are dropped.
pub fn init() -> Result<(), std::io::Error> {
    let dir = logs_dir();
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE_NAME);
    rotate_if_needed(&path, &dir, now_millis())?;

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let _ = SINK.set(Mutex::new(file));

    install_panic_hook();
    Ok(())
}

pub fn info(msg: &str, fields: &[Field<'_>]) {
    emit(Level::Info, msg, fields);
}

pub fn warn(msg: &str, fields: &[Field<'_>]) {
    emit(Level::Warn, msg, fields);
}

pub fn error(msg: &str, fields: &[Field<'_>]) {
    emit(Level::Error, msg, fields);
}

fn emit(level: Level, msg: &str, fields: &[Field<'_>]) {
    let Some(sink) = SINK.get() else {
        return;
    };
    let line = format_record(now_millis(), level, msg, fields);
    let Ok(mut file) = sink.lock() else {
        return;
    };
    let _ = file.write_all(line.as_bytes());
    let _ = file.flush();
}

/// `ts=<unix ms> level=<level> msg=<msg> k=v ...`, newline-terminated.
fn format_record(ts_millis: u128, level: Level, msg: &str, fields: &[Field<'_>]) -> String {
    let mut line = format!("ts={ts_millis} level={} msg={}", level.as_str(), quote(msg));
    for (key, value) in fields {
        let _ = write!(line, " {key}={}", quote(value));
    }
    line.push('\n');
    line
}

fn quote(value: &str) -> String {
    let bare = !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=' || c == '\\');
    if bare {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn rotate_if_needed(path: &Path, dir: &Path, stamp: u128) -> Result<(), std::io::Error> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if size < MAX_LOG_BYTES {
        return Ok(());
    }

    fs::rename(path, next_archive_path(dir, stamp))?;
    prune_old_archives(dir)
}

/// Archive names are fixed-width so name order is age order. The sequence
/// suffix keeps two rotations within the same millisecond apart.
fn next_archive_path(dir: &Path, stamp: u128) -> PathBuf {
    let mut seq: u32 = 0;
    loop {
        let candidate = dir.join(format!("{ARCHIVE_PREFIX}{stamp:013}-{seq:03}.log"));
        if !candidate.exists() {
            return candidate;
        }
        seq += 1;
    }
}

fn prune_old_archives(dir: &Path) -> Result<(), std::io::Error> {
    let mut archives: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(ARCHIVE_PREFIX) && n.ends_with(".log"))
        })
        .collect();

    archives.sort();
    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for oldest in archives.iter().take(excess) {
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unavailable".to_string());
            error("panic", &[("location", location), ("payload", payload)]);
            prior(panic_info);
        }));
    });
}
