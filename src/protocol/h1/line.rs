use crate::{
    storage::{AsBuffer, Buffer, LineState},
    ChunkedError,
};

/// Assembles a single CRLF terminated line across several refills of the shared buffer.
///
/// The line buffer is reused: clearing it keeps its allocation for the next line.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    line: Vec<u8>,
    state: LineState,
}

impl LineAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    /// The line framed so far, without its terminator once complete.
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    pub fn clear(&mut self) {
        self.line.clear();
        self.state = LineState::Idle;
    }

    /// Move bytes from the storage into the line until a LF is found or the storage is
    /// drained. Bytes following the LF are left in the storage.
    ///
    /// The CR is kept in the line until its LF shows up, so a terminator split across two
    /// refills is recognized like any other.
    pub fn accumulate<T: AsBuffer>(
        &mut self,
        storage: &mut Buffer<T>,
        limit: usize,
    ) -> Result<LineState, ChunkedError> {
        if self.state == LineState::Complete {
            return Ok(self.state);
        }
        let data = storage.data();
        let (content, taken, found) = match data.iter().position(|&b| b == b'\n') {
            Some(index) => (&data[..index], index + 1, true),
            None => (data, data.len(), false),
        };
        self.line.extend_from_slice(content);
        storage.consume(taken);

        if found {
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            } else if cfg!(not(feature = "tolerant-parsing")) {
                return Err(ChunkedError::BareLineFeed);
            }
            self.state = LineState::Complete;
        } else if !self.line.is_empty() {
            self.state = LineState::Accumulating;
        }

        // a pending CR does not count against the limit
        let size = match (self.state, self.line.last()) {
            (LineState::Accumulating, Some(b'\r')) => self.line.len() - 1,
            _ => self.line.len(),
        };
        if size > limit {
            return Err(ChunkedError::LineTooLong { size, limit });
        }
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn feed(accumulator: &mut LineAccumulator, bytes: &[u8]) -> (LineState, Vec<u8>) {
        let mut storage = Buffer::new(vec![0; 64]);
        storage.write_all(bytes).expect("write");
        let state = accumulator.accumulate(&mut storage, 32).expect("accumulate");
        (state, storage.data().to_vec())
    }

    #[test]
    fn whole_line() {
        let mut accumulator = LineAccumulator::new();
        let (state, rest) = feed(&mut accumulator, b"1a;ext\r\nnext");
        assert_eq!(state, LineState::Complete);
        assert_eq!(accumulator.line(), b"1a;ext");
        assert_eq!(rest, b"next");

        accumulator.clear();
        assert_eq!(accumulator.state(), LineState::Idle);
        assert!(accumulator.line().is_empty());
    }

    #[test]
    fn terminator_split_between_refills() {
        let mut accumulator = LineAccumulator::new();
        assert_eq!(feed(&mut accumulator, b"1a").0, LineState::Accumulating);
        assert_eq!(feed(&mut accumulator, b";ext\r").0, LineState::Accumulating);
        let (state, rest) = feed(&mut accumulator, b"\n4");
        assert_eq!(state, LineState::Complete);
        assert_eq!(accumulator.line(), b"1a;ext");
        assert_eq!(rest, b"4");
    }

    #[test]
    fn empty_line() {
        let mut accumulator = LineAccumulator::new();
        assert_eq!(feed(&mut accumulator, b"\r").0, LineState::Accumulating);
        assert_eq!(feed(&mut accumulator, b"\n").0, LineState::Complete);
        assert!(accumulator.line().is_empty());
    }

    #[test]
    fn nothing_to_accumulate() {
        let mut accumulator = LineAccumulator::new();
        assert_eq!(feed(&mut accumulator, b"").0, LineState::Idle);
    }

    #[test]
    fn carriage_return_inside_line() {
        let mut accumulator = LineAccumulator::new();
        let (state, _) = feed(&mut accumulator, b"a\rb\r\n");
        assert_eq!(state, LineState::Complete);
        assert_eq!(accumulator.line(), b"a\rb");
    }

    #[test]
    fn line_too_long() {
        let mut accumulator = LineAccumulator::new();
        let mut storage = Buffer::new(vec![0; 64]);
        storage.write_all(&[b'f'; 40]).expect("write");
        assert_eq!(
            accumulator.accumulate(&mut storage, 32),
            Err(ChunkedError::LineTooLong {
                size: 40,
                limit: 32
            })
        );
    }

    #[cfg(not(feature = "tolerant-parsing"))]
    #[test]
    fn bare_line_feed() {
        let mut accumulator = LineAccumulator::new();
        let mut storage = Buffer::new(vec![0; 64]);
        storage.write_all(b"4\n").expect("write");
        assert_eq!(
            accumulator.accumulate(&mut storage, 32),
            Err(ChunkedError::BareLineFeed)
        );
    }

    #[cfg(feature = "tolerant-parsing")]
    #[test]
    fn bare_line_feed_ends_line() {
        let mut accumulator = LineAccumulator::new();
        let (state, rest) = feed(&mut accumulator, b"4\nWiki");
        assert_eq!(state, LineState::Complete);
        assert_eq!(accumulator.line(), b"4");
        assert_eq!(rest, b"Wiki");
    }
}
