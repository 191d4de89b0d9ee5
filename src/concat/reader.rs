//! Bounded, line-oriented content reading.

use super::budget::ReadBudget;
use crate::error::AnalyzerError;
use crate::utils::TextDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};

const CHUNK_SIZE: usize = 8192;

/// Where file contents come from. The filesystem in production; tests plug in
/// slow or failing streams.
pub trait FileSource {
    type Reader: Read;

    fn open(&self, path: &Path) -> io::Result<Self::Reader>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    type Reader = File;

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Text read within the budget; may be a truncated prefix of the file.
    Content(String),
    /// The deadline passed before the read finished. Nothing was charged.
    TimedOut { elapsed: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Read `reader` line by line, charging each line's characters to `budget`.
/// `\r\n` line endings come out as `\n`.
///
/// The line that would overflow the budget is cut to the remaining allowance,
/// the budget is pinned at its limit and nothing after it is read. Without a
/// limit the whole stream is read. The deadline is checked between chunks;
/// on expiry the partial content is dropped and `budget` is left untouched.
pub fn read_bounded<R: Read>(
    reader: R,
    budget: &mut ReadBudget,
    deadline: Option<Instant>,
) -> io::Result<ReadOutcome> {
    let started = Instant::now();
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, reader);
    let mut local = *budget;
    let mut content = String::new();
    let mut pending = String::new();
    let mut decoder: Option<TextDecoder> = None;

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(ReadOutcome::TimedOut { elapsed: started.elapsed() });
        }

        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let eof = chunk.is_empty();
        let decoder = decoder.get_or_insert_with(|| TextDecoder::for_sample(chunk));
        decoder.decode(chunk, &mut pending, eof);
        let read = chunk.len();
        reader.consume(read);

        if drain_lines(&mut pending, &mut content, &mut local, eof) == Flow::Stop || eof {
            break;
        }
    }

    *budget = local;
    Ok(ReadOutcome::Content(content))
}

/// Open `path` through `files` and read it with [`read_bounded`].
pub fn read_bounded_path<S: FileSource>(
    files: &S,
    path: &Path,
    budget: &mut ReadBudget,
    timeout: Option<Duration>,
) -> Result<ReadOutcome, AnalyzerError> {
    let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
    let read_error = |source| AnalyzerError::Read { path: path.to_path_buf(), source };

    let reader = files.open(path).map_err(read_error)?;
    read_bounded(reader, budget, deadline).map_err(read_error)
}

/// Move complete lines from `pending` into `content`. At EOF the unterminated
/// tail counts as the last line.
fn drain_lines(
    pending: &mut String,
    content: &mut String,
    budget: &mut ReadBudget,
    eof: bool,
) -> Flow {
    let mut start = 0;
    while let Some(pos) = pending[start..].find('\n') {
        let end = start + pos + 1;
        if append_terminated(&pending[start..end], content, budget) == Flow::Stop {
            return Flow::Stop;
        }
        start = end;
    }
    pending.drain(..start);

    if pending.is_empty() {
        return Flow::Continue;
    }
    if eof {
        let tail = std::mem::take(pending);
        return append_line(&tail, content, budget);
    }

    // A line longer than what is left can be cut before it is complete.
    match budget.remaining() {
        Some(remaining) if pending.len() > remaining && pending.chars().count() > remaining => {
            let tail = std::mem::take(pending);
            append_line(&tail, content, budget)
        }
        _ => Flow::Continue,
    }
}

/// A `\r\n` ending is written and charged as a single `\n`.
fn append_terminated(line: &str, content: &mut String, budget: &mut ReadBudget) -> Flow {
    match line.strip_suffix("\r\n") {
        Some(body) => match append_line(body, content, budget) {
            Flow::Continue => append_line("\n", content, budget),
            Flow::Stop => Flow::Stop,
        },
        None => append_line(line, content, budget),
    }
}

fn append_line(line: &str, content: &mut String, budget: &mut ReadBudget) -> Flow {
    let chars = line.chars().count();
    match budget.remaining() {
        Some(remaining) if chars > remaining => {
            content.extend(line.chars().take(remaining));
            budget.charge(remaining);
            Flow::Stop
        }
        _ => {
            content.push_str(line);
            budget.charge(chars);
            if budget.is_exhausted() {
                Flow::Stop
            } else {
                Flow::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::thread;

    /// Yields `x\n` per read, sleeping first.
    struct SlowReader {
        reads_left: usize,
        delay: Duration,
    }

    impl Read for SlowReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.reads_left == 0 {
                return Ok(0);
            }
            self.reads_left -= 1;
            thread::sleep(self.delay);
            buf[..2].copy_from_slice(b"x\n");
            Ok(2)
        }
    }

    /// Fails on any read; proves a stream is never touched.
    struct ExplodingReader;

    impl Read for ExplodingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "read past the budget"))
        }
    }

    fn read_str(text: &str, budget: &mut ReadBudget) -> String {
        match read_bounded(Cursor::new(text.as_bytes().to_vec()), budget, None).unwrap() {
            ReadOutcome::Content(content) => content,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_unbounded_reads_whole_file() {
        let mut budget = ReadBudget::unbounded();
        let text = "line one\nline two\nno newline";
        assert_eq!(read_str(text, &mut budget), text);
        assert_eq!(budget.consumed(), text.chars().count());
    }

    #[test]
    fn test_counter_is_min_of_sum_and_limit() {
        let text = "0123456789\nabcdefghij\nKLMNOPQRST\n";
        let len = text.chars().count();
        for (already, limit) in [(0, 5), (0, 11), (10, 40), (30, 40), (40, 40), (0, 33)] {
            let mut budget = ReadBudget::resume(Some(limit), already);
            let content = read_str(text, &mut budget);
            assert_eq!(budget.consumed(), (already + len).min(limit), "N={already} max={limit}");
            assert_eq!(content.chars().count(), budget.consumed() - already);
            assert!(text.starts_with(&content));
        }
    }

    #[test]
    fn test_truncates_mid_line_by_characters() {
        let mut budget = ReadBudget::new(Some(8));
        let content = read_str("héllo\nwörld\n", &mut budget);
        assert_eq!(content, "héllo\nwö");
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_scenario_two_files_share_budget() {
        let a = "a".repeat(399) + "\n";
        let b = "b".repeat(399) + "\n";
        let mut budget = ReadBudget::new(Some(600));

        assert_eq!(read_str(&a, &mut budget), a);
        let b_part = read_str(&b, &mut budget);
        assert_eq!(b_part.chars().count(), 200);
        assert_eq!(budget.consumed(), 600);
    }

    #[test]
    fn test_remainder_after_budget_is_never_read() {
        let head = Cursor::new("a".repeat(3 * CHUNK_SIZE).into_bytes());
        let mut budget = ReadBudget::new(Some(10));
        let outcome = read_bounded(head.chain(ExplodingReader), &mut budget, None).unwrap();
        assert_eq!(outcome, ReadOutcome::Content("a".repeat(10)));
    }

    #[test]
    fn test_exhausted_budget_reads_nothing() {
        let mut budget = ReadBudget::resume(Some(5), 5);
        assert_eq!(read_str("more text\n", &mut budget), "");
        assert_eq!(budget.consumed(), 5);
    }

    #[test]
    fn test_slow_stream_times_out_without_charging() {
        let reader = SlowReader { reads_left: 50, delay: Duration::from_millis(20) };
        let mut budget = ReadBudget::new(Some(1000));
        let deadline = Instant::now() + Duration::from_millis(60);

        let outcome = read_bounded(reader, &mut budget, Some(deadline)).unwrap();
        assert!(matches!(outcome, ReadOutcome::TimedOut { .. }));
        assert_eq!(budget.consumed(), 0);
    }

    #[test]
    fn test_invalid_bytes_do_not_fail_the_read() {
        let bytes = b"valid\n\xc3\x28 broken\n".to_vec();
        let mut budget = ReadBudget::unbounded();
        let outcome = read_bounded(Cursor::new(bytes), &mut budget, None).unwrap();
        match outcome {
            ReadOutcome::Content(content) => {
                assert!(content.starts_with("valid\n"));
                assert!(content.ends_with(" broken\n"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_stray_byte_keeps_utf8_text_intact() {
        let mut bytes = "café naïve résumé\n".repeat(3).into_bytes();
        bytes.extend_from_slice(b"tail \xff end\n");
        let mut budget = ReadBudget::unbounded();

        let content = match read_bounded(Cursor::new(bytes), &mut budget, None).unwrap() {
            ReadOutcome::Content(content) => content,
            other => panic!("unexpected outcome: {other:?}"),
        };
        assert!(content.starts_with("café naïve résumé\n"));
        assert!(content.ends_with("tail \u{FFFD} end\n"));
        assert_eq!(budget.consumed(), content.chars().count());
    }

    #[test]
    fn test_crlf_counts_as_one_character() {
        let mut budget = ReadBudget::unbounded();
        assert_eq!(read_str("ab\r\ncd\r\n", &mut budget), "ab\ncd\n");
        assert_eq!(budget.consumed(), 6);

        let mut bounded = ReadBudget::new(Some(4));
        assert_eq!(read_str("ab\r\ncd\r\n", &mut bounded), "ab\nc");
        assert_eq!(bounded.consumed(), 4);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("gone.py");
        let err = read_bounded_path(&FsSource, &missing, &mut ReadBudget::unbounded(), None)
            .unwrap_err();
        match err {
            AnalyzerError::Read { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
