//! Stream plumbing connecting blocks.
//!
//! This is a from-scratch, safe replacement for the manual mmap-backed ring
//! buffer this framework historically used: streams are plain `VecDeque`s
//! behind an `Rc<RefCell<..>>`, scoped to the single-threaded graph that owns
//! them. No raw pointers, no per-frame reallocation beyond what `VecDeque`
//! itself amortizes.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// The value carried by a [`Tag`].
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// String value.
    String(String),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Unsigned integer value.
    U64(u64),
    /// Signed integer value.
    I64(i64),
}

/// Out-of-band metadata attached to a position in a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pos: usize,
    key: String,
    val: TagValue,
}

impl Tag {
    /// Create a new tag at stream-relative position `pos`.
    pub fn new(pos: usize, key: impl Into<String>, val: TagValue) -> Self {
        Self {
            pos,
            key: key.into(),
            val,
        }
    }

    /// Position within the batch this tag was attached to.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Tag key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Tag value.
    pub fn val(&self) -> &TagValue {
        &self.val
    }
}

struct Inner<T> {
    buf: VecDeque<T>,
    tags: Vec<Tag>,
    eof: bool,
}

impl<T> Inner<T> {
    fn new() -> Self {
        Self {
            buf: VecDeque::new(),
            tags: Vec::new(),
            eof: false,
        }
    }
}

/// Read side of a copy-type stream.
pub struct ReadStream<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

/// Write side of a copy-type stream.
pub struct WriteStream<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for ReadStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Clone for WriteStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Create a new connected read/write stream pair.
pub fn new_stream<T>() -> (WriteStream<T>, ReadStream<T>) {
    let inner = Rc::new(RefCell::new(Inner::new()));
    (
        WriteStream {
            inner: inner.clone(),
        },
        ReadStream { inner },
    )
}

impl<T: Copy> ReadStream<T> {
    /// Number of samples currently available to read.
    pub fn available(&self) -> usize {
        self.inner.borrow().buf.len()
    }

    /// True if the producer has signaled end of file and the buffer is
    /// drained.
    pub fn eof(&self) -> bool {
        let inner = self.inner.borrow();
        inner.eof && inner.buf.is_empty()
    }

    /// Copy out up to `n` samples without consuming them.
    pub fn peek(&self, n: usize) -> Vec<T> {
        let inner = self.inner.borrow();
        inner.buf.iter().take(n).copied().collect()
    }

    /// Tags whose position is within the first `n` available samples.
    pub fn tags(&self, n: usize) -> Vec<Tag> {
        self.inner
            .borrow()
            .tags
            .iter()
            .filter(|t| t.pos() < n)
            .cloned()
            .collect()
    }

    /// Remove the first `n` samples from the stream.
    pub fn consume(&self, n: usize) {
        let mut inner = self.inner.borrow_mut();
        for _ in 0..n {
            inner.buf.pop_front();
        }
        inner.tags.retain(|t| t.pos() >= n);
        for t in inner.tags.iter_mut() {
            t.pos -= n;
        }
    }
}

impl<T: Copy> WriteStream<T> {
    /// Append samples (with tags relative to the start of `items`).
    pub fn push(&self, items: &[T], tags: &[Tag]) {
        let mut inner = self.inner.borrow_mut();
        let base = inner.buf.len();
        inner.buf.extend(items.iter().copied());
        inner
            .tags
            .extend(tags.iter().map(|t| Tag::new(base + t.pos(), t.key(), t.val().clone())));
    }

    /// Mark the stream as having no more data coming.
    pub fn set_eof(&self) {
        self.inner.borrow_mut().eof = true;
    }
}

struct NCInner<T> {
    queue: VecDeque<(T, Vec<Tag>)>,
    eof: bool,
}

/// Read side of a non-copy ("PDU") stream: a queue of whole values instead
/// of a flat sample buffer.
pub struct NCReadStream<T> {
    inner: Rc<RefCell<NCInner<T>>>,
}

/// Write side of a non-copy ("PDU") stream.
pub struct NCWriteStream<T> {
    inner: Rc<RefCell<NCInner<T>>>,
}

impl<T> Clone for NCReadStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Clone for NCWriteStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Create a new connected non-copy read/write stream pair.
pub fn new_nocopy_stream<T>() -> (NCWriteStream<T>, NCReadStream<T>) {
    let inner = Rc::new(RefCell::new(NCInner {
        queue: VecDeque::new(),
        eof: false,
    }));
    (
        NCWriteStream {
            inner: inner.clone(),
        },
        NCReadStream { inner },
    )
}

impl<T> NCReadStream<T> {
    /// Pop the oldest queued value, if any.
    pub fn pop(&self) -> Option<(T, Vec<Tag>)> {
        self.inner.borrow_mut().queue.pop_front()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().queue.is_empty()
    }

    /// True if the producer is done and the queue is drained.
    pub fn eof(&self) -> bool {
        let inner = self.inner.borrow();
        inner.eof && inner.queue.is_empty()
    }
}

impl<T> NCWriteStream<T> {
    /// Push a new value onto the queue.
    pub fn push(&self, val: T, tags: &[Tag]) {
        self.inner.borrow_mut().queue.push_back((val, tags.to_vec()));
    }

    /// Mark the stream as having no more data coming.
    pub fn set_eof(&self) {
        self.inner.borrow_mut().eof = true;
    }
}
