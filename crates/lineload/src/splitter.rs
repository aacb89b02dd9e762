//! Streaming line splitter
//!
//! Reconstructs logical lines from byte chunks in arrival order. Chunk
//! boundaries carry no meaning: a line may span any number of chunks and a
//! chunk may hold any number of lines. Only `\n` delimits; `\r` is kept as
//! line content.

const NEWLINE: u8 = b'\n';

/// One logical line of a source, delimiter stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based position within the source
    pub number: u64,
    pub bytes: Vec<u8>,
}

/// Line splitter for a single source
///
/// Call [`feed`](Self::feed) once per chunk and [`finish`](Self::finish)
/// once at end of stream. Lines are handed to the `emit` callback in order
/// as soon as their delimiter has arrived.
///
/// ```
/// use lineload::splitter::LineSplitter;
///
/// let mut numbers = Vec::new();
/// let mut splitter = LineSplitter::new();
/// splitter.feed(b"a\nb", |line| Ok::<_, ()>(numbers.push(line.number))).unwrap();
/// splitter.finish(|line| Ok::<_, ()>(numbers.push(line.number))).unwrap();
/// assert_eq!(numbers, vec![1, 2]);
/// ```
#[derive(Debug)]
pub struct LineSplitter {
    partial: Vec<u8>,
    next_number: u64,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self {
            partial: Vec::new(),
            next_number: 1,
        }
    }

    /// Number of lines emitted so far
    pub fn lines_emitted(&self) -> u64 {
        self.next_number - 1
    }

    /// Consume one chunk, emitting every line it completes
    ///
    /// Stops at the first error returned by `emit`.
    pub fn feed<E>(
        &mut self,
        chunk: &[u8],
        mut emit: impl FnMut(Line) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut start = 0;

        while let Some(offset) = chunk[start..].iter().position(|b| *b == NEWLINE) {
            let end = start + offset;
            let bytes = if self.partial.is_empty() {
                chunk[start..end].to_vec()
            } else {
                let mut joined = std::mem::take(&mut self.partial);
                joined.extend_from_slice(&chunk[start..end]);
                joined
            };
            start = end + 1;
            emit(self.line(bytes))?;
        }

        self.partial.extend_from_slice(&chunk[start..]);
        Ok(())
    }

    /// End of stream: emit the trailing unterminated line, if any
    pub fn finish<E>(mut self, emit: impl FnOnce(Line) -> Result<(), E>) -> Result<(), E> {
        if self.partial.is_empty() {
            return Ok(());
        }
        let bytes = std::mem::take(&mut self.partial);
        let line = self.line(bytes);
        emit(line)
    }

    fn line(&mut self, bytes: Vec<u8>) -> Line {
        let number = self.next_number;
        self.next_number += 1;
        Line { number, bytes }
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn split_chunks(chunks: &[&[u8]]) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut splitter = LineSplitter::new();
        for chunk in chunks {
            splitter
                .feed(chunk, |line| {
                    lines.push(line);
                    Ok::<_, Infallible>(())
                })
                .unwrap();
        }
        splitter
            .finish(|line| {
                lines.push(line);
                Ok::<_, Infallible>(())
            })
            .unwrap();
        lines
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines
            .iter()
            .map(|l| std::str::from_utf8(&l.bytes).unwrap())
            .collect()
    }

    #[test]
    fn test_unterminated_final_line_is_emitted() {
        let lines = split_chunks(&[b"a\nb\nc"]);
        assert_eq!(texts(&lines), vec!["a", "b", "c"]);
        assert_eq!(
            lines.iter().map(|l| l.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_trailing_newline_adds_no_empty_line() {
        let lines = split_chunks(&[b"a\nb\n"]);
        assert_eq!(texts(&lines), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_lines_are_kept_and_numbered() {
        let lines = split_chunks(&[b"\n\nx\n"]);
        assert_eq!(texts(&lines), vec!["", "", "x"]);
        assert_eq!(lines[2].number, 3);
    }

    #[test]
    fn test_single_byte_chunks_match_whole_input() {
        let whole = split_chunks(&[b"a\nb"]);
        let bytewise = split_chunks(&[b"a", b"\n", b"b"]);
        assert_eq!(whole, bytewise);
    }

    #[test]
    fn test_line_spanning_many_chunks() {
        let lines = split_chunks(&[b"he", b"", b"ll", b"o\nwor", b"ld"]);
        assert_eq!(texts(&lines), vec!["hello", "world"]);
    }

    #[test]
    fn test_lines_emitted_during_feed_not_deferred() {
        let mut splitter = LineSplitter::new();
        let mut seen = Vec::new();
        let mut record = |l: Line| {
            seen.push(l.number);
            Ok::<_, Infallible>(())
        };

        splitter.feed(b"one\ntw", &mut record).unwrap();
        assert_eq!(splitter.lines_emitted(), 1);
        splitter.feed(b"o\n", &mut record).unwrap();
        assert_eq!(splitter.lines_emitted(), 2);
        splitter.finish(&mut record).unwrap();

        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_emit_error_stops_feed() {
        let mut splitter = LineSplitter::new();
        let mut seen = Vec::new();
        let result = splitter.feed(b"a\nb\nc\n", |l| {
            if l.number == 2 {
                return Err("hook failed");
            }
            seen.push(l.number);
            Ok(())
        });

        assert_eq!(result, Err("hook failed"));
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn test_carriage_return_is_content() {
        let lines = split_chunks(&[b"a\r\nb"]);
        assert_eq!(lines[0].bytes, b"a\r".to_vec());
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let text = "caf\u{e9}\n\u{1f600}";
        let bytes = text.as_bytes();
        let lines = split_chunks(&[&bytes[..4], &bytes[4..7], &bytes[7..]]);
        assert_eq!(texts(&lines), vec!["caf\u{e9}", "\u{1f600}"]);
    }

    #[test]
    fn test_empty_source_emits_nothing() {
        assert!(split_chunks(&[]).is_empty());
        assert!(split_chunks(&[b""]).is_empty());
    }
}
