use std::{
    cmp::min,
    io::{self, Read},
    sync::Arc,
};

use log::{debug, trace, warn};

use crate::{
    protocol::h1::{
        line::LineAccumulator,
        parser::{chunk_size, chunk_size_line, trailer_field},
    },
    storage::{
        AsBuffer, BufferedSource, CompletionListener, LineState, Limits, NoListener, Phase,
        Progress,
    },
    ChunkedError,
};

/// Decodes a chunked entity body read from a non-blocking BufferedSource.
///
/// Each call to `read` makes as much progress as currently possible and returns early with
/// `Progress::Pending` and an untouched state when the source has nothing more to give, so the
/// same call can be repeated once the transport becomes readable.
/// ```txt
///            size > 0                  payload + CRLF
/// ┌──────┐ ──────────> ┌──────┐ ─────────────────────> ┌──────┐
/// │ Size │             │ Data │                        │ Size │ ...
/// └──────┘             └──────┘                        └──────┘
///    │ size == 0      ┌──────────┐  blank line  ┌────────────┐
///    └──────────────> │ Trailers │ ───────────> │ Terminated │
///                     └──────────┘              └────────────┘
/// ```
pub struct ChunkedDecoder<T: AsBuffer, R, L = NoListener> {
    source: Arc<BufferedSource<T, R, L>>,
    line: LineAccumulator,
    phase: Phase,
    /// payload bytes of the current chunk not delivered yet
    remaining: u64,
    decoded: u64,
    trailers: usize,
    limits: Limits,
}

impl<T: AsBuffer, R: Read, L: CompletionListener> ChunkedDecoder<T, R, L> {
    pub fn new(source: BufferedSource<T, R, L>) -> Self {
        Self::with_limits(source, Limits::default())
    }

    pub fn with_limits(source: BufferedSource<T, R, L>, limits: Limits) -> Self {
        Self::shared(Arc::new(source), limits)
    }

    /// Decode from a source that other parts of the program also hold, typically a readiness
    /// callback refilling it.
    pub fn shared(source: Arc<BufferedSource<T, R, L>>, limits: Limits) -> Self {
        Self {
            source,
            line: LineAccumulator::new(),
            phase: Phase::Size,
            remaining: 0,
            decoded: 0,
            trailers: 0,
            limits,
        }
    }

    pub fn source(&self) -> &Arc<BufferedSource<T, R, L>> {
        &self.source
    }

    pub fn into_source(self) -> Arc<BufferedSource<T, R, L>> {
        self.source
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Payload bytes delivered so far.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// Trailer fields consumed and discarded so far.
    pub fn trailer_count(&self) -> usize {
        self.trailers
    }

    pub fn line_state(&self) -> LineState {
        self.line.state()
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    pub fn is_error(&self) -> bool {
        matches!(self.phase, Phase::Error { .. })
    }

    /// Copy decoded payload bytes to the front of `dst`.
    ///
    /// At most one chunk contributes to a single call: the decoder returns as soon as some
    /// payload was copied. Framing errors are terminal, the same error is returned by every
    /// later call. Transport errors are returned as is.
    pub fn read(&mut self, dst: &mut [u8]) -> io::Result<Progress> {
        let result = self.advance(dst);
        self.source.post_read(&result);
        result
    }

    fn advance(&mut self, dst: &mut [u8]) -> io::Result<Progress> {
        loop {
            match self.phase {
                Phase::Size => {
                    if !self.fill_line(self.limits.max_chunk_line_size)? {
                        return self.pending();
                    }
                    let size = match self.parse_size() {
                        Ok(size) => size,
                        Err(error) => return Err(self.fail(error)),
                    };
                    self.line.clear();
                    self.remaining = size;
                    if size == 0 {
                        trace!("last chunk, reading trailers");
                        self.phase = Phase::Trailers;
                    } else {
                        trace!("new chunk of {size} bytes");
                        self.phase = Phase::Data;
                    }
                }
                Phase::Data if self.remaining > 0 => {
                    if dst.is_empty() {
                        return Ok(Progress::Read(0));
                    }
                    // bounded by dst.len() so it fits in usize
                    let cap = min(dst.len() as u64, self.remaining) as usize;
                    let count = self.source.read(&mut dst[..cap])?;
                    if count == 0 {
                        return self.pending();
                    }
                    self.remaining -= count as u64;
                    self.decoded += count as u64;
                    return Ok(Progress::Read(count));
                }
                Phase::Data => {
                    if !self.fill_line(self.limits.max_chunk_line_size)? {
                        return self.pending();
                    }
                    if !self.line.line().is_empty() {
                        return Err(self.fail(ChunkedError::MissingChunkTerminator));
                    }
                    self.line.clear();
                    self.phase = Phase::Size;
                }
                Phase::Trailers => {
                    if !self.fill_line(self.limits.max_trailer_line_size)? {
                        return self.pending();
                    }
                    if self.line.line().is_empty() {
                        debug!(
                            "chunked body terminated: {} bytes, {} trailers",
                            self.decoded, self.trailers
                        );
                        self.phase = Phase::Terminated;
                    } else {
                        self.discard_trailer();
                    }
                    self.line.clear();
                }
                Phase::Terminated => return Ok(Progress::End),
                Phase::Error { ref kind, .. } => return Err(kind.clone().into()),
            }
        }
    }

    /// Drive the line accumulator until a full line is available or the source runs dry.
    fn fill_line(&mut self, limit: usize) -> io::Result<bool> {
        let mut shared = self.source.lock();
        loop {
            if shared.ensure_data()? == 0 {
                return Ok(false);
            }
            let state = self.line.accumulate(&mut shared.storage, limit);
            shared.settle();
            match state {
                Ok(LineState::Complete) => return Ok(true),
                Ok(LineState::Idle | LineState::Accumulating) => {}
                Err(error) => {
                    drop(shared);
                    return Err(self.fail(error));
                }
            }
        }
    }

    fn parse_size(&self) -> Result<u64, ChunkedError> {
        let line = self.line.line();
        if line.is_empty() {
            return Err(ChunkedError::EmptySizeLine);
        }
        let size = match chunk_size_line(line) {
            Ok((_, size_hexa)) => chunk_size(size_hexa).ok_or_else(|| ChunkedError::SizeOverflow {
                line: String::from_utf8_lossy(line).into_owned(),
            })?,
            Err(_) => {
                return Err(ChunkedError::InvalidSize {
                    line: String::from_utf8_lossy(line).into_owned(),
                })
            }
        };
        if size > self.limits.max_chunk_size {
            return Err(ChunkedError::ChunkTooLarge {
                size,
                limit: self.limits.max_chunk_size,
            });
        }
        let total = self.decoded.saturating_add(size);
        if total > self.limits.max_body_size {
            return Err(ChunkedError::BodyTooLarge {
                size: total,
                limit: self.limits.max_body_size,
            });
        }
        Ok(size)
    }

    fn discard_trailer(&mut self) {
        self.trailers += 1;
        match trailer_field(self.line.line()) {
            Ok((_, (key, _))) => debug!("discarding trailer {}", String::from_utf8_lossy(key)),
            Err(_) => debug!(
                "discarding malformed trailer {:?}",
                String::from_utf8_lossy(self.line.line())
            ),
        }
    }

    /// No progress is possible: either wait for the transport or, if it is closed, report the
    /// body as truncated.
    fn pending(&mut self) -> io::Result<Progress> {
        if self.source.is_exhausted() {
            let phase = self.phase.marker();
            return Err(self.fail(ChunkedError::Truncated { phase }));
        }
        Ok(Progress::Pending)
    }

    fn fail(&mut self, error: ChunkedError) -> io::Error {
        warn!("chunked decoding failed in {} phase: {error}", self.phase.marker());
        self.phase.error(error.clone());
        error.into()
    }
}

impl<T: AsBuffer, R: Read, L: CompletionListener> Read for ChunkedDecoder<T, R, L> {
    /// Standard non-blocking contract: `Ok(0)` at the end of the body and `WouldBlock` when no
    /// progress is currently possible.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match ChunkedDecoder::read(self, buf)? {
            Progress::Read(count) => Ok(count),
            Progress::Pending => Err(io::ErrorKind::WouldBlock.into()),
            Progress::End => Ok(0),
        }
    }
}
