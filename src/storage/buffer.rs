use std::{cmp::min, io};

/// AsBuffer is the trait used by Buffer to operate on an arbitrary buffer.
/// This allows the source to be backed by any type exposing a continuous slice of bytes,
/// whether it is borrowed, owned on the heap or pooled elsewhere. Buffer owns it.
pub trait AsBuffer {
    fn as_buffer(&self) -> &[u8];
    fn as_mut_buffer(&mut self) -> &mut [u8];
}

impl AsBuffer for Vec<u8> {
    fn as_buffer(&self) -> &[u8] {
        self
    }
    fn as_mut_buffer(&mut self) -> &mut [u8] {
        self
    }
}

impl AsBuffer for Box<[u8]> {
    fn as_buffer(&self) -> &[u8] {
        self
    }
    fn as_mut_buffer(&mut self) -> &mut [u8] {
        self
    }
}

/// Buffer is the single reusable byte buffer shared by the transport refill path and the
/// decoding path.
/// ```txt
/// buffer        start         end   len
/// v             v             v     v
/// [             ██████████████      ]
/// <---------------------------------> buffer()     | capacity()
///               <------------>        data()       | available_data()
///                             <-----> space()      | available_space()
/// ```
/// The transport writes from `end` up to `buffer.len()`, the decoder drains from `start`.
/// When every byte was drained the buffer can simply be cleared. When `start` overshoots
/// half the length of the buffer, the remaining data should be shifted back to the beginning.
/// ```txt
/// buffer
/// start   end     half                  len
/// v       v       v                     v
/// [████████       :                     ]
/// ```
pub struct Buffer<T: AsBuffer> {
    pub start: usize,
    pub end: usize,
    pub buffer: T,
}

impl<T: AsBuffer> Buffer<T> {
    pub fn new(buffer: T) -> Self {
        Self {
            start: 0,
            end: 0,
            buffer,
        }
    }

    /// Wrap a storage whose first `len` bytes were already received, typically the bytes
    /// following a message head read in the same syscall.
    pub fn with_remaining(buffer: T, len: usize) -> Self {
        let mut result = Self::new(buffer);
        result.fill(len);
        result
    }

    pub fn meter(&self, half: usize) -> String {
        let size = half * 2 + 1;
        let len = self.capacity().max(1);
        (0..size + 2)
            .map(|i| {
                if i == 0 {
                    '['
                } else if i - 1 == half {
                    ':'
                } else if i - 1 < (self.start * size / len) {
                    ' '
                } else if i - 1 < (self.end * size / len) {
                    '█'
                } else if i - 1 < size {
                    ' '
                } else {
                    ']'
                }
            })
            .collect()
    }

    pub fn available_data(&self) -> usize {
        self.end - self.start
    }

    pub fn available_space(&self) -> usize {
        self.capacity() - self.end
    }

    pub fn capacity(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_full(&self) -> bool {
        self.end == self.capacity()
    }

    pub fn fill(&mut self, count: usize) -> usize {
        let count = min(count, self.available_space());
        self.end += count;
        count
    }

    pub fn consume(&mut self, count: usize) -> usize {
        let count = min(count, self.available_data());
        self.start += count;
        count
    }

    pub fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_buffer()
    }

    pub fn mut_buffer(&mut self) -> &mut [u8] {
        self.buffer.as_mut_buffer()
    }

    pub fn data(&self) -> &[u8] {
        let range = self.start..self.end;
        &self.buffer()[range]
    }

    pub fn space(&mut self) -> &mut [u8] {
        let range = self.end..self.capacity();
        &mut self.mut_buffer()[range]
    }

    pub fn should_shift(&self) -> bool {
        self.start > self.capacity() / 2 || (self.start > 0 && self.is_empty())
    }

    pub fn shift(&mut self) -> usize {
        let start = self.start;
        let end = self.end;
        if start > 0 {
            self.mut_buffer().copy_within(start..end, 0);
            self.start = 0;
            self.end = end - start;
        }
        start
    }
}

impl<T: AsBuffer> io::Write for Buffer<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let size = min(buf.len(), self.available_space());
        self.space()[..size].copy_from_slice(&buf[..size]);
        self.fill(size);
        Ok(size)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: AsBuffer> io::Read for Buffer<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = min(self.available_data(), buf.len());
        buf[..len].copy_from_slice(&self.data()[..len]);
        self.start += len;
        Ok(len)
    }
}
