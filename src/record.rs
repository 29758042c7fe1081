//! Line framing and field decoding for the `;`-separated, CRLF-terminated wire format.

use log::{debug, trace};

pub const LINE_SEPARATOR: &[u8] = b"\r\n";
pub const FIELD_SEPARATOR: u8 = b';';

/// Upper bound for the unterminated tail kept between reads.
const MAX_PENDING: usize = 4096;

pub type Record = Vec<f64>;
pub type Batch = Vec<Record>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordWidth {
    Fixed(usize),
    Any,
}

impl RecordWidth {
    fn accepts(self, fields: usize) -> bool {
        match self {
            RecordWidth::Fixed(n) => fields == n,
            RecordWidth::Any => true,
        }
    }
}

/// Parses a single field. Surrounding whitespace is tolerated, anything else
/// that is not a decimal float or integer literal is rejected.
pub fn parse_field(field: &[u8]) -> Option<f64> {
    std::str::from_utf8(field).ok()?.trim().parse::<f64>().ok()
}

/// Parses one line (without terminator) into its values, or `None` if any field fails.
pub fn parse_fields(line: &[u8]) -> Option<Record> {
    line.split(|b| *b == FIELD_SEPARATOR)
        .map(parse_field)
        .collect()
}

/// A line is accepted iff every field parses and the field count matches `width`.
pub fn parse_record(line: &[u8], width: RecordWidth) -> Option<Record> {
    let values = parse_fields(line)?;
    width.accepts(values.len()).then_some(values)
}

fn find_separator(buf: &[u8]) -> Option<usize> {
    buf.windows(LINE_SEPARATOR.len())
        .position(|w| w == LINE_SEPARATOR)
}

fn rfind_separator(buf: &[u8]) -> Option<usize> {
    buf.windows(LINE_SEPARATOR.len())
        .rposition(|w| w == LINE_SEPARATOR)
}

/// Splits on CRLF. A trailing segment without terminator is yielded as the last line.
pub fn split_lines(buf: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = buf;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match find_separator(rest) {
            Some(pos) => {
                let line = &rest[..pos];
                rest = &rest[pos + LINE_SEPARATOR.len()..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = &[];
                Some(line)
            }
        }
    })
}

/// Turns raw read chunks into batches of records.
///
/// Bytes after the last CRLF of a chunk are held back and prepended to the next
/// chunk, so a record cut in half by a read boundary is decoded once complete.
/// A line that outgrows the held-back limit is dropped as a whole, up to and
/// including its terminator.
#[derive(Debug)]
pub struct RecordDecoder {
    width: RecordWidth,
    pending: Vec<u8>,
    discarding: bool,
}

impl RecordDecoder {
    pub fn new(width: RecordWidth) -> Self {
        Self {
            width,
            pending: Vec::new(),
            discarding: false,
        }
    }

    pub fn width(&self) -> RecordWidth {
        self.width
    }

    /// Bytes currently held back waiting for their line terminator.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn decode(&mut self, chunk: &[u8]) -> Batch {
        self.pending.extend_from_slice(chunk);

        if self.discarding && !self.skip_overlong_line() {
            return Vec::new();
        }

        let Some(last) = rfind_separator(&self.pending) else {
            self.limit_pending();
            return Vec::new();
        };

        let tail = self.pending.split_off(last + LINE_SEPARATOR.len());
        let complete = std::mem::replace(&mut self.pending, tail);
        self.limit_pending();

        let width = self.width;
        split_lines(&complete)
            .filter_map(|line| {
                let record = parse_record(line, width);
                if record.is_none() {
                    trace!("Dropped line {:?}", String::from_utf8_lossy(line));
                }
                record
            })
            .collect()
    }

    /// Takes the held-back bytes as a final line. Used when no more input will
    /// follow; the line is subject to the same checks as any other.
    pub fn finish(&mut self) -> Option<Record> {
        let line = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.discarding) || line.is_empty() {
            return None;
        }
        parse_record(&line, self.width)
    }

    // Returns true once the terminator of the over-long line has been consumed.
    fn skip_overlong_line(&mut self) -> bool {
        match find_separator(&self.pending) {
            Some(pos) => {
                self.pending.drain(..pos + LINE_SEPARATOR.len());
                self.discarding = false;
                true
            }
            None => {
                self.drop_pending();
                false
            }
        }
    }

    fn limit_pending(&mut self) {
        if self.pending.len() > MAX_PENDING {
            debug!(
                "Discarding line longer than {} bytes ({} bytes so far)",
                MAX_PENDING,
                self.pending.len()
            );
            self.drop_pending();
            self.discarding = true;
        }
    }

    // A trailing CR may be the first half of the terminator.
    fn drop_pending(&mut self) {
        let keep = usize::from(self.pending.last() == Some(&b'\r'));
        let cut = self.pending.len() - keep;
        self.pending.drain(..cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_width_lines() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(3));
        let batch = decoder.decode(b"0;1.0;2.0\r\n1;1.1;2.1\r\n");
        assert_eq!(batch, vec![vec![0.0, 1.0, 2.0], vec![1.0, 1.1, 2.1]]);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn rejects_short_line() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(3));
        assert!(decoder.decode(b"0;1.0\r\n").is_empty());
    }

    #[test]
    fn rejects_non_numeric_field() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(3));
        assert!(decoder.decode(b"0;abc;2.0\r\n").is_empty());
    }

    #[test]
    fn rejects_long_line() {
        assert_eq!(parse_record(b"1;2;3;4", RecordWidth::Fixed(3)), None);
    }

    #[test]
    fn bad_lines_do_not_affect_neighbours() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(2));
        let batch = decoder.decode(b"1;2\r\n;\r\nx;1\r\n\r\n3;4\r\n");
        assert_eq!(batch, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn integers_and_whitespace_parse() {
        assert_eq!(parse_fields(b" 12 ;-3;+4.5e1"), Some(vec![12.0, -3.0, 45.0]));
    }

    #[test]
    fn invalid_utf8_field_is_rejected() {
        assert_eq!(parse_field(&[0xff, b'1']), None);
        assert_eq!(parse_fields(b"1;\xff"), None);
    }

    #[test]
    fn empty_line_is_rejected() {
        assert_eq!(parse_fields(b""), None);
    }

    #[test]
    fn any_width_accepts_every_parsable_line() {
        let mut decoder = RecordDecoder::new(RecordWidth::Any);
        let batch = decoder.decode(b"1\r\n1;2;3\r\n");
        assert_eq!(batch, vec![vec![1.0], vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn line_split_across_reads_is_decoded_once_complete() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(3));
        assert_eq!(decoder.decode(b"0;1.0;2.0\r\n1;1."), vec![vec![0.0, 1.0, 2.0]]);
        assert_eq!(decoder.pending(), b"1;1.");
        assert_eq!(decoder.decode(b"1;2.1\r\n"), vec![vec![1.0, 1.1, 2.1]]);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn terminator_split_across_reads() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(2));
        assert!(decoder.decode(b"5;6\r").is_empty());
        assert_eq!(decoder.decode(b"\n"), vec![vec![5.0, 6.0]]);
    }

    fn overlong(tail: &[u8]) -> Vec<u8> {
        let mut bytes = vec![b'1'; MAX_PENDING + 4];
        bytes.extend_from_slice(tail);
        bytes
    }

    #[test]
    fn rest_of_overlong_line_is_not_a_record() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(2));
        assert!(decoder.decode(&overlong(b"5")).is_empty());
        assert!(decoder.pending().is_empty());
        assert!(decoder.decode(b"5;9\r\n").is_empty());
        assert_eq!(decoder.decode(b"1;2\r\n"), vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn line_after_overlong_line_in_same_chunk_is_kept() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(2));
        decoder.decode(&overlong(b""));
        assert_eq!(decoder.decode(b"5;9\r\n1;2\r\n3;"), vec![vec![1.0, 2.0]]);
        assert_eq!(decoder.pending(), b"3;");
    }

    #[test]
    fn overlong_line_ending_in_split_terminator() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(2));
        assert!(decoder.decode(&overlong(b"\r")).is_empty());
        assert_eq!(decoder.decode(b"\n3;4\r\n"), vec![vec![3.0, 4.0]]);
    }

    #[test]
    fn overlong_tail_behind_complete_lines() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(2));
        let mut chunk = b"1;2\r\n".to_vec();
        chunk.extend(overlong(b""));
        assert_eq!(decoder.decode(&chunk), vec![vec![1.0, 2.0]]);
        assert!(decoder.decode(b"7;8\r\n").is_empty());
        assert_eq!(decoder.decode(b"3;4\r\n"), vec![vec![3.0, 4.0]]);
    }

    #[test]
    fn finish_takes_unterminated_last_line() {
        let mut decoder = RecordDecoder::new(RecordWidth::Any);
        assert_eq!(decoder.decode(b"1;2\r\n3;4"), vec![vec![1.0, 2.0]]);
        assert_eq!(decoder.finish(), Some(vec![3.0, 4.0]));
        assert!(decoder.pending().is_empty());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn finish_checks_the_last_line_like_any_other() {
        let mut decoder = RecordDecoder::new(RecordWidth::Fixed(3));
        decoder.decode(b"3;4");
        assert_eq!(decoder.finish(), None);

        let mut decoder = RecordDecoder::new(RecordWidth::Any);
        decoder.decode(&overlong(b";5"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn split_lines_keeps_unterminated_tail() {
        let lines: Vec<&[u8]> = split_lines(b"a\r\nb\r\nc").collect();
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
    }
}
