//! Timestamp sources feeding the analysis pipelines
//!
//! Packet capture and dissection happen upstream. A source only hands out
//! timestamps in capture order, either from memory or from a text stream with
//! one `SECONDS[.FRACTION]` field per line (the format printed by
//! `tshark -T fields -e frame.time_epoch` or `tcpdump -tt`).

use crate::error::SourceError;
use crate::timestamp::{Resolution, Timestamp};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Lazy, finite, ordered stream of packet timestamps
pub trait TimestampSource {
    /// Next timestamp, or `None` once the stream is exhausted
    fn next_timestamp(&mut self) -> Result<Option<Timestamp>, SourceError>;
}

/// Source over an in-memory iterator of timestamps
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    inner: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Timestamp>,
{
    pub fn new<T>(timestamps: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            inner: timestamps.into_iter(),
        }
    }
}

impl<I> TimestampSource for IterSource<I>
where
    I: Iterator<Item = Timestamp>,
{
    fn next_timestamp(&mut self) -> Result<Option<Timestamp>, SourceError> {
        Ok(self.inner.next())
    }
}

/// Source reading one timestamp per line from a text stream
///
/// Only the first whitespace-separated field of a line is parsed, so
/// `tcpdump -tt` output can be piped in as is. Blank lines and lines starting
/// with `#` are skipped.
#[derive(Debug)]
pub struct TextSource<R> {
    reader: R,
    resolution: Resolution,
    line: u64,
    buf: String,
}

impl<R: BufRead> TextSource<R> {
    pub fn new(reader: R, resolution: Resolution) -> Self {
        Self {
            reader,
            resolution,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> TimestampSource for TextSource<R> {
    fn next_timestamp(&mut self) -> Result<Option<Timestamp>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let Some(field) = self.buf.split_whitespace().next() else {
                continue;
            };
            if field.starts_with('#') {
                continue;
            }

            return parse_timestamp(field, self.resolution)
                .map(Some)
                .map_err(|reason| SourceError::Parse {
                    line: self.line,
                    text: field.to_string(),
                    reason,
                });
        }
    }
}

/// Open a text timestamp stream; `-` reads standard input
pub fn open_text_source(
    path: &Path,
    resolution: Resolution,
) -> Result<TextSource<Box<dyn BufRead>>, SourceError> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };
    Ok(TextSource::new(reader, resolution))
}

/// Parse `[-]SECONDS[.FRACTION]` at the given resolution
///
/// Extra fraction digits are truncated and missing ones are zero-filled.
/// Negative values are normalized so the fraction stays non-negative:
/// `-1.25` becomes seconds `-2` plus `0.75`.
pub fn parse_timestamp(text: &str, resolution: Resolution) -> Result<Timestamp, String> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));

    if whole.is_empty() {
        return Err("missing whole seconds".to_string());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected SECONDS[.FRACTION]".to_string());
    }

    let mut seconds: i64 = whole
        .parse()
        .map_err(|e| format!("seconds out of range: {}", e))?;
    let mut fraction = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(resolution.digits())
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));

    if negative {
        seconds = -seconds;
        if fraction > 0 {
            seconds -= 1;
            fraction = resolution.modulus() - fraction;
        }
    }

    Timestamp::new(seconds, fraction, resolution).map_err(|e| e.to_string())
}
