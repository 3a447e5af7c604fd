use std::{
    io::{self, Read},
    sync::atomic::{AtomicBool, Ordering},
};

use log::{debug, trace};
use parking_lot::{Mutex, MutexGuard};

use crate::storage::{AsBuffer, Buffer, BufferState, Progress};

/// Informed once when the decoded stream reaches its end.
pub trait CompletionListener {
    fn on_completed(&self);
}

pub struct NoListener;

impl CompletionListener for NoListener {
    fn on_completed(&self) {}
}

/// Everything guarded by the source mutex: the shared buffer, its state flag and the
/// transport refilling it.
pub struct Shared<T: AsBuffer, R> {
    pub storage: Buffer<T>,
    pub state: BufferState,
    transport: R,
    exhausted: bool,
}

impl<T: AsBuffer, R: Read> Shared<T, R> {
    /// Number of bytes that can be drained without touching the transport.
    pub fn available(&self) -> usize {
        match self.state {
            BufferState::Draining => self.storage.available_data(),
            BufferState::Filling => 0,
        }
    }

    /// Attempt a single non-blocking read from the transport into the free space of the
    /// buffer. Returns false if nothing was obtained, either because the transport would
    /// block, the buffer is full or the transport reached its end. A storage without any
    /// capacity could never observe the end of the transport and is rejected.
    pub fn refill(&mut self) -> io::Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if self.storage.capacity() == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot refill a zero capacity storage",
            ));
        }
        if self.storage.should_shift() {
            self.storage.shift();
        }
        if self.storage.available_space() == 0 {
            return Ok(false);
        }
        loop {
            match self.transport.read(self.storage.space()) {
                Ok(0) => {
                    debug!("transport exhausted");
                    self.exhausted = true;
                    return Ok(false);
                }
                Ok(count) => {
                    self.storage.fill(count);
                    self.state = BufferState::Draining;
                    trace!("refilled {count} bytes");
                    return Ok(true);
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
    }

    /// Return the number of bytes ready to be drained, recycling the buffer and refilling
    /// it once if it was drained.
    pub fn ensure_data(&mut self) -> io::Result<usize> {
        let available = self.available();
        if available > 0 {
            return Ok(available);
        }
        self.state = BufferState::Filling;
        self.storage.clear();
        if self.refill()? {
            Ok(self.available())
        } else {
            Ok(0)
        }
    }

    /// Flip the state back to Filling once every buffered byte was drained.
    pub fn settle(&mut self) {
        if self.storage.is_empty() {
            self.state = BufferState::Filling;
        }
    }

    /// Copy buffered bytes, or freshly refilled ones, into `dst`.
    pub fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if dst.is_empty() || self.ensure_data()? == 0 {
            return Ok(0);
        }
        let count = self.storage.read(dst)?;
        self.settle();
        Ok(count)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.available() == 0
    }
}

/// Non-blocking buffered byte source.
///
/// The source can be shared between a readiness callback calling `refill` and the consumer
/// driving a decoder over it: every access to the buffer goes through the same mutex, which
/// is held for a single buffer operation only.
pub struct BufferedSource<T: AsBuffer, R, L = NoListener> {
    shared: Mutex<Shared<T, R>>,
    listener: L,
    notified: AtomicBool,
}

impl<T: AsBuffer, R: Read> BufferedSource<T, R> {
    pub fn new(storage: Buffer<T>, transport: R) -> Self {
        Self::with_listener(storage, transport, NoListener)
    }
}

impl<T: AsBuffer, R: Read, L: CompletionListener> BufferedSource<T, R, L> {
    /// Create a source around a storage that may already hold bytes received earlier. Those
    /// are drained before the transport is read.
    pub fn with_listener(storage: Buffer<T>, transport: R, listener: L) -> Self {
        let state = if storage.is_empty() {
            BufferState::Filling
        } else {
            BufferState::Draining
        };
        Self {
            shared: Mutex::new(Shared {
                storage,
                state,
                transport,
                exhausted: false,
            }),
            listener,
            notified: AtomicBool::new(false),
        }
    }

    /// Lock the shared buffer. The guard should be dropped as soon as the buffer operation
    /// is done.
    pub fn lock(&self) -> MutexGuard<'_, Shared<T, R>> {
        self.shared.lock()
    }

    pub fn refill(&self) -> io::Result<bool> {
        self.lock().refill()
    }

    pub fn read(&self, dst: &mut [u8]) -> io::Result<usize> {
        self.lock().read(dst)
    }

    pub fn buffer_state(&self) -> BufferState {
        self.lock().state
    }

    pub fn set_buffer_state(&self, state: BufferState) {
        self.lock().state = state;
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().is_exhausted()
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Called after every read of a decoder layered on this source. The listener is
    /// informed the first time the end of the stream is reported.
    pub fn post_read(&self, result: &io::Result<Progress>) {
        match result {
            Ok(Progress::End) => {
                if !self.notified.swap(true, Ordering::AcqRel) {
                    debug!("end of stream reached");
                    self.listener.on_completed();
                }
            }
            Ok(progress) => trace!("post read: {progress:?}"),
            Err(error) => trace!("post read failed: {error}"),
        }
    }

    /// Give back the storage, with the bytes following the decoded body still in it, and the
    /// transport.
    pub fn into_parts(self) -> (Buffer<T>, R) {
        let shared = self.shared.into_inner();
        (shared.storage, shared.transport)
    }
}
