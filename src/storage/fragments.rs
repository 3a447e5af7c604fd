use std::{
    cmp::min,
    collections::VecDeque,
    io::{self, Read},
};

/// Non-blocking transport replaying predetermined fragments.
///
/// Each pushed fragment is delivered by the following reads, a gap makes exactly one read
/// fail with `WouldBlock`. Once every fragment was delivered the transport either blocks
/// forever or reports its end, depending on whether it was closed.
#[derive(Debug, Default)]
pub struct Fragments {
    queue: VecDeque<Option<Vec<u8>>>,
    closed: bool,
}

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// One fragment per item, separated by gaps, then closed.
    pub fn interleaved<I, F>(fragments: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let mut result = Self::new();
        for fragment in fragments {
            result.push(fragment.as_ref());
            result.gap();
        }
        result.close();
        result
    }

    pub fn push(&mut self, fragment: &[u8]) -> &mut Self {
        if !fragment.is_empty() {
            self.queue.push_back(Some(fragment.to_vec()));
        }
        self
    }

    pub fn gap(&mut self) -> &mut Self {
        self.queue.push_back(None);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.closed = true;
        self
    }

    pub fn is_drained(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Read for Fragments {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.queue.pop_front() {
            Some(Some(mut fragment)) => {
                let len = min(fragment.len(), buf.len());
                buf[..len].copy_from_slice(&fragment[..len]);
                if len < fragment.len() {
                    self.queue.push_front(Some(fragment.split_off(len)));
                }
                Ok(len)
            }
            Some(None) => Err(io::ErrorKind::WouldBlock.into()),
            None if self.closed => Ok(0),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_and_gaps() {
        let mut transport = Fragments::new();
        transport.push(b"abcdef").gap().push(b"g").close();

        let mut buf = [0; 4];
        assert_eq!(transport.read(&mut buf).expect("read"), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(transport.read(&mut buf).expect("read"), 2);
        assert_eq!(
            transport.read(&mut buf).map_err(|e| e.kind()),
            Err(io::ErrorKind::WouldBlock)
        );
        assert_eq!(transport.read(&mut buf).expect("read"), 1);
        assert_eq!(transport.read(&mut buf).expect("read"), 0);
        assert!(transport.is_drained());
    }
}
