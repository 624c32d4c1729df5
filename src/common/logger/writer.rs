use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use parking_lot::Mutex;

/// Removes ANSI color and cursor sequences (`ESC [ ... final-byte`) and lone
/// two-character escapes.
pub fn strip_ansi_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('[') => {
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            Some(_) | None => {}
        }
    }
    out
}

/// Append-only log file that keeps only its newest `max_lines` lines.
///
/// Trimming rewrites the file, so it only runs after a batch of new lines:
/// a tenth of `max_lines`, but at least 50.
#[derive(Clone)]
pub(crate) struct LogFile {
    path: PathBuf,
    max_lines: usize,
    trim_every: usize,
    state: Arc<Mutex<LogFileState>>,
}

#[derive(Default)]
struct LogFileState {
    handle: Option<File>,
    lines_since_trim: usize,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>, max_lines: u32) -> Self {
        let max_lines = max_lines as usize;
        Self {
            path: path.into(),
            max_lines,
            trim_every: (max_lines / 10).max(50),
            state: Arc::new(Mutex::new(LogFileState::default())),
        }
    }

    fn trim(&self) -> io::Result<()> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        let lines: Vec<&str> = contents.lines().collect();
        if lines.len() <= self.max_lines {
            return Ok(());
        }

        let mut kept = lines[lines.len() - self.max_lines..].join("\n");
        kept.push('\n');
        fs::write(&self.path, kept)
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();

        if state.handle.is_none() {
            state.handle = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?,
            );
        }
        if let Some(handle) = state.handle.as_mut() {
            handle.write_all(buf)?;
        }

        state.lines_since_trim += buf.iter().filter(|&&b| b == b'\n').count();
        if state.lines_since_trim >= self.trim_every {
            // Reopened on the next write.
            state.handle = None;
            state.lines_since_trim = 0;
            if let Err(e) = self.trim() {
                eprintln!("Failed to trim log file {}: {}", self.path.display(), e);
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.state.lock().handle.as_mut() {
            Some(handle) => handle.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogFile {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log() -> PathBuf {
        std::env::temp_dir().join(format!("syncwatch-log-{}.log", uuid::Uuid::new_v4()))
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(strip_ansi_escapes("\x1b[31mred\x1b[0m plain"), "red plain");
        assert_eq!(strip_ansi_escapes("\x1b[1;32mINFO \x1b[0m>"), "INFO >");
        assert_eq!(strip_ansi_escapes("trailing\x1b"), "trailing");
    }

    #[test]
    fn trims_to_max_lines() {
        let path = temp_log();
        let mut log = LogFile::new(path.clone(), 10);

        for i in 0..100 {
            log.write_all(format!("line {i}\n").as_bytes()).unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines.first(), Some(&"line 90"));
        assert_eq!(lines.last(), Some(&"line 99"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn writes_after_trim_keep_appending() {
        let path = temp_log();
        let mut log = LogFile::new(path.clone(), 10);

        for i in 0..53 {
            log.write_all(format!("line {i}\n").as_bytes()).unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines.last(), Some(&"line 52"));
        let _ = fs::remove_file(&path);
    }
}
