//! Narration sinks
//!
//! The mirroring core describes every decision it makes as one line of text and hands it to a
//! [`Sink`]. The sink is passed in explicitly; there is no process-wide log handle. Sinks never
//! fail the caller: a narration line that cannot be written is dropped.

use std::io::Write;

pub trait Sink: Send + Sync {
    fn line(&self, line: &str);
}

/// Discards everything, used in quiet mode.
#[derive(Debug, Default)]
pub struct NullSink;

impl Sink for NullSink {
    fn line(&self, _line: &str) {}
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: std::sync::Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Lines containing `needle`.
    pub fn matching(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(needle))
            .collect()
    }
}

impl Sink for MemorySink {
    fn line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Writes each line, newline terminated, to stdout or to a log file.
#[derive(Debug)]
pub struct WriterSink<W: Write + Send> {
    writer: std::sync::Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: std::sync::Mutex::new(writer),
        }
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl WriterSink<std::fs::File> {
    /// Opens `path` for appending, creating it if needed.
    pub fn append(path: &std::path::Path) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn line(&self, line: &str) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // one write per line
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        if let Err(error) = writer.write_all(buf.as_bytes()).and_then(|_| writer.flush()) {
            tracing::debug!("dropping narration line: {}", &error);
        }
    }
}

/// Routes lines to syslog(3) at `LOG_NOTICE` under the `LOG_DAEMON` facility.
#[derive(Debug)]
pub struct SyslogSink(());

static SYSLOG_IDENT: std::sync::OnceLock<std::ffi::CString> = std::sync::OnceLock::new();

impl SyslogSink {
    /// Opens the syslog connection. The tag of the first call wins for the lifetime of the process.
    pub fn open(tag: &str) -> Self {
        let ident = SYSLOG_IDENT.get_or_init(|| {
            std::ffi::CString::new(tag.replace('\0', ""))
                .unwrap_or_else(|_| c"rmir".to_owned())
        });
        // SAFETY: `ident` lives in a static and is never freed, openlog keeps the pointer
        unsafe {
            libc::openlog(ident.as_ptr(), libc::LOG_PID, libc::LOG_DAEMON);
        }
        Self(())
    }
}

impl Sink for SyslogSink {
    fn line(&self, line: &str) {
        let Ok(message) = std::ffi::CString::new(line.replace('\0', "")) else {
            return;
        };
        // SAFETY: both pointers are valid NUL terminated strings, the message is passed as an
        // argument to a constant format so it cannot be interpreted as one
        unsafe {
            libc::syslog(libc::LOG_NOTICE, c"%s".as_ptr(), message.as_ptr());
        }
    }
}

impl Drop for SyslogSink {
    fn drop(&mut self) {
        // SAFETY: closelog has no preconditions
        unsafe {
            libc::closelog();
        }
    }
}
