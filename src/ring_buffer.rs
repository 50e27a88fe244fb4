use crate::error::{Error, Result};
use bytes::Bytes;
use std::collections::VecDeque;

/// A bounded FIFO of opaque byte frames.
///
/// Backed by an owned `VecDeque<Bytes>`; capacity is enforced in frames, not
/// bytes, since `Bytes` is already a cheap refcounted view and cloning one
/// costs no allocation.
///
/// `push_tail` is the producer's only entry point; `peek_head`/`pop_head`
/// are the consumer's. The type itself adds no locking: the producer and
/// consumer must both be driven from the thread that calls
/// [`crate::PeerConnection::tick`].
pub struct RingBuffer {
    capacity: usize,
    frames: VecDeque<Bytes>,
}

impl RingBuffer {
    /// Creates an empty ring buffer that rejects a `push_tail` once it
    /// holds `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        RingBuffer {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Commits `frame` atomically, or returns `Overflow` without touching
    /// the buffer. Never overwrites the oldest frame.
    pub fn push_tail(&mut self, frame: Bytes) -> Result<()> {
        if self.frames.len() >= self.capacity {
            return Err(Error::Overflow);
        }
        self.frames.push_back(frame);
        Ok(())
    }

    /// Returns a borrowed view of the oldest frame without advancing the
    /// queue. Repeated calls return the same frame until [`Self::pop_head`]
    /// is called.
    pub fn peek_head(&self) -> Option<&Bytes> {
        self.frames.front()
    }

    /// Advances past the frame previously returned by `peek_head`. A no-op
    /// if the buffer is empty.
    pub fn pop_head(&mut self) {
        self.frames.pop_front();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
