//! Progress bars and a log writer that keeps them pinned
//!
//! Log lines are routed through the same `MultiProgress` as the bars, so a
//! `tracing` event printed mid-ingest never tears a bar in half. When that
//! target is hidden (stderr is not a terminal) indicatif drops `println`
//! output, so lines go straight to stderr instead.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();
static BARS_ENABLED: AtomicBool = AtomicBool::new(true);

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(|| {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        mp
    })
}

/// Turn progress bars off for the rest of the process (MCP, `--json`)
pub fn disable_bars() {
    BARS_ENABLED.store(false, Ordering::SeqCst);
}

/// A bar for `len` items; hidden when bars are off or there is nothing to do
pub fn batch_bar(len: u64, message: &str) -> ProgressBar {
    if len == 0 || !BARS_ENABLED.load(Ordering::SeqCst) {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let bar = multi_progress().add(ProgressBar::new(len));
    bar.set_style(style);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// `MakeWriter` for the fmt layer
#[derive(Default, Clone)]
pub struct LogWriterFactory;

/// Buffers one event and prints it line by line above the bars
pub struct LogWriter {
    buffer: String,
    progress: MultiProgress,
    fallback: Box<dyn Write + Send>,
}

impl LogWriter {
    fn new(progress: MultiProgress, fallback: Box<dyn Write + Send>) -> Self {
        Self {
            buffer: String::new(),
            progress,
            fallback,
        }
    }

    fn emit(&mut self, line: &str) {
        let line = line.trim_end_matches('\r');
        if self.progress.is_hidden() {
            let _ = writeln!(self.fallback, "{}", line);
        } else {
            let _ = self.progress.println(line);
        }
    }

    fn drain_lines(&mut self) {
        while let Some(idx) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=idx).collect();
            self.emit(&line[..idx]);
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.push_str(&String::from_utf8_lossy(buf));
        self.drain_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain_lines();
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.emit(&rest);
        }
        self.fallback.flush()
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter::new(multi_progress().clone(), Box::new(io::stderr()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_empty_work_gets_hidden_bar() {
        assert!(batch_bar(0, "nothing").is_hidden());
    }

    #[test]
    fn test_writer_consumes_complete_lines() {
        let mut writer = LogWriterFactory.make_writer();
        writer.write_all(b"first line\nsecond ").unwrap();
        assert_eq!(writer.buffer, "second ");
        writer.flush().unwrap();
        assert!(writer.buffer.is_empty());
    }

    #[test]
    fn test_hidden_target_falls_back_to_plain_writer() {
        let captured = Captured::default();
        let progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let mut writer = LogWriter::new(progress, Box::new(captured.clone()));

        writer
            .write_all(b"ERROR kbase: Invalid path: /missing\r\npartial")
            .unwrap();
        assert_eq!(captured.text(), "ERROR kbase: Invalid path: /missing\n");

        drop(writer);
        assert_eq!(
            captured.text(),
            "ERROR kbase: Invalid path: /missing\npartial\n"
        );
    }
}
