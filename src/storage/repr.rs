use std::fmt;

/// Whether the shared buffer currently holds undrained bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// The buffer is empty (or stale) and waits for a refill from the transport.
    Filling,
    /// The buffer holds bytes that were not consumed yet.
    Draining,
}

/// Progress of the line currently framed by a LineAccumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    /// No byte of the line was seen yet.
    #[default]
    Idle,
    /// Some bytes were appended but the terminator was not found yet.
    Accumulating,
    /// The terminator was found and stripped, the line can be read.
    Complete,
}

/// Outcome of a single call to ChunkedDecoder::read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Decoded payload bytes were copied to the front of the destination.
    Read(usize),
    /// Nothing can be done right now, call again once the transport is readable.
    Pending,
    /// The last chunk and the trailer section were consumed.
    End,
}

impl Progress {
    pub fn is_end(&self) -> bool {
        matches!(self, Progress::End)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseMarker {
    Size,
    Data,
    Trailers,
    Terminated,
    Error,
}

impl fmt::Display for PhaseMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseMarker::Size => "chunk size",
            PhaseMarker::Data => "chunk data",
            PhaseMarker::Trailers => "trailers",
            PhaseMarker::Terminated => "terminated",
            PhaseMarker::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Framing a chunk-size line.
    Size,
    /// Streaming the payload of the current chunk, then its CRLF terminator.
    Data,
    /// Discarding trailer fields up to the final blank line.
    Trailers,
    Terminated,
    /// The decoder met a framing error in the phase designated by marker.
    /// It is terminal, every later read reports the same error.
    Error {
        marker: PhaseMarker,
        kind: crate::ChunkedError,
    },
}

impl Phase {
    pub fn marker(&self) -> PhaseMarker {
        match self {
            Phase::Size => PhaseMarker::Size,
            Phase::Data => PhaseMarker::Data,
            Phase::Trailers => PhaseMarker::Trailers,
            Phase::Terminated => PhaseMarker::Terminated,
            Phase::Error { .. } => PhaseMarker::Error,
        }
    }

    pub fn error(&mut self, kind: crate::ChunkedError) {
        *self = Phase::Error {
            marker: self.marker(),
            kind,
        }
    }
}

/// Bounds applied by the decoder while framing lines and counting payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Longest chunk-size line accepted, extensions included (default: 1KB)
    pub max_chunk_line_size: usize,
    /// Longest trailer line accepted (default: 8KB)
    pub max_trailer_line_size: usize,
    /// Largest single chunk accepted (default: unbounded)
    pub max_chunk_size: u64,
    /// Largest cumulative payload accepted (default: unbounded)
    pub max_body_size: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_chunk_line_size: 1024,
            max_trailer_line_size: 8 * 1024,
            max_chunk_size: u64::MAX,
            max_body_size: u64::MAX,
        }
    }
}

impl Limits {
    pub fn unlimited() -> Self {
        Self {
            max_chunk_line_size: usize::MAX,
            max_trailer_line_size: usize::MAX,
            max_chunk_size: u64::MAX,
            max_body_size: u64::MAX,
        }
    }
}
