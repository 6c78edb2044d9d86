//! Growing-buffer JSON writer, generic over symbol width.
//!
//! The writer owns its buffer outright. Backing storage is taken from a
//! thread-local pool on first growth and handed back on `finalize`, so a
//! hot loop that repeatedly serializes and discards writers doesn't
//! round-trip through the allocator each time.

use crate::depth::DepthGuard;
use crate::error::FormatError;
use crate::symbol::Symbol;
use std::cell::RefCell;

const INITIAL_CAPACITY: usize = 256;
const POOL_CAPACITY: usize = 16;

std::thread_local! {
    static BYTE_POOL: RefCell<Vec<Vec<u8>>> = RefCell::new(Vec::new());
    static WIDE_POOL: RefCell<Vec<Vec<u16>>> = RefCell::new(Vec::new());
}

/// Per-symbol hook into a thread-local free-list of reusable buffers.
/// Blanket-implemented for the two `Symbol` lanes below; nothing else can
/// implement `Symbol` so this is effectively closed.
pub(crate) trait Pooled: Sized {
    fn acquire(min_capacity: usize) -> Vec<Self>;
    fn release(buf: Vec<Self>);
}

impl Pooled for u8 {
    fn acquire(min_capacity: usize) -> Vec<u8> {
        BYTE_POOL.with(|p| take_or_alloc(&mut p.borrow_mut(), min_capacity))
    }
    fn release(buf: Vec<u8>) {
        BYTE_POOL.with(|p| give_back(&mut p.borrow_mut(), buf));
    }
}

impl Pooled for u16 {
    fn acquire(min_capacity: usize) -> Vec<u16> {
        WIDE_POOL.with(|p| take_or_alloc(&mut p.borrow_mut(), min_capacity))
    }
    fn release(buf: Vec<u16>) {
        WIDE_POOL.with(|p| give_back(&mut p.borrow_mut(), buf));
    }
}

fn take_or_alloc<T>(pool: &mut Vec<Vec<T>>, min_capacity: usize) -> Vec<T> {
    while let Some(buf) = pool.pop() {
        if buf.capacity() >= min_capacity {
            return buf;
        }
        // Too small to bother with; drop it and keep looking.
    }
    Vec::with_capacity(min_capacity.max(INITIAL_CAPACITY))
}

fn give_back<T>(pool: &mut Vec<Vec<T>>, mut buf: Vec<T>) {
    if pool.len() < POOL_CAPACITY {
        buf.clear();
        pool.push(buf);
    }
}

/// A growing, contiguous output buffer over symbols of width `S`.
///
/// Invariant: every successful write leaves `pos` advanced past a valid
/// JSON fragment; every write that would exceed capacity grows first.
pub struct Writer<S: Symbol> {
    buf: Vec<S>,
    pos: usize,
    depth: DepthGuard,
}

impl<S: Symbol + Pooled> Writer<S> {
    pub fn new() -> Self {
        Self::with_max_depth(crate::depth::DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: u32) -> Self {
        Writer {
            buf: Vec::new(),
            pos: 0,
            depth: DepthGuard::new(max_depth),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> u32 {
        self.depth.depth()
    }

    #[inline]
    fn reserve(&mut self, additional: usize) {
        if self.pos + additional <= self.buf.len() {
            return;
        }
        if self.buf.is_empty() {
            self.buf = S::acquire(self.pos + additional);
            self.buf.resize(self.buf.capacity(), S::from_ascii(0));
            return;
        }
        let needed = self.pos + additional;
        let new_cap = (self.buf.len() * 2).max(needed);
        let mut grown = S::acquire(new_cap);
        grown.resize(new_cap, S::from_ascii(0));
        grown[..self.pos].copy_from_slice(&self.buf[..self.pos]);
        let old = std::mem::replace(&mut self.buf, grown);
        S::release(old);
    }

    #[inline]
    pub fn write_symbol(&mut self, s: S) {
        self.reserve(1);
        self.buf[self.pos] = s;
        self.pos += 1;
    }

    #[inline]
    pub fn write_ascii(&mut self, b: u8) {
        self.write_symbol(S::from_ascii(b));
    }

    /// Appends an ASCII-only byte slice verbatim, widening each byte into
    /// the symbol lane. Used for precomputed `"name":` emission plans and
    /// for literals (`true`, `false`, `null`) -- anything known ahead of
    /// time to need no escaping.
    pub fn write_verbatim(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        for &b in bytes {
            self.buf[self.pos] = S::from_ascii(b);
            self.pos += 1;
        }
    }

    /// Appends symbols already in the writer's native lane, e.g. a
    /// precomputed UTF-16 member-name chunk.
    pub fn write_raw(&mut self, symbols: &[S]) {
        self.reserve(symbols.len());
        self.buf[self.pos..self.pos + symbols.len()].copy_from_slice(symbols);
        self.pos += symbols.len();
    }

    pub fn write_quote(&mut self) {
        self.write_ascii(b'"');
    }

    pub fn write_name_separator(&mut self) {
        self.write_ascii(b':');
    }

    pub fn write_value_separator(&mut self) {
        self.write_ascii(b',');
    }

    pub fn write_null(&mut self) {
        self.write_verbatim(b"null");
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_verbatim(if v { b"true" } else { b"false" });
    }

    pub fn begin_object(&mut self) -> Result<(), FormatError> {
        self.depth
            .enter()
            .map_err(|e| FormatError::DepthExceeded {
                depth: e.depth,
                max: e.max,
            })?;
        self.write_ascii(b'{');
        Ok(())
    }

    pub fn end_object(&mut self) {
        self.write_ascii(b'}');
        self.depth.exit();
    }

    pub fn begin_array(&mut self) -> Result<(), FormatError> {
        self.depth
            .enter()
            .map_err(|e| FormatError::DepthExceeded {
                depth: e.depth,
                max: e.max,
            })?;
        self.write_ascii(b'[');
        Ok(())
    }

    pub fn end_array(&mut self) {
        self.write_ascii(b']');
        self.depth.exit();
    }

    /// Consumes one level of the shared depth budget without writing
    /// anything. Used by recursion-candidate composite types to account for
    /// self-referential nesting on top of the container depth their own
    /// `{`/`[` already charges.
    pub fn enter_depth(&mut self) -> Result<(), FormatError> {
        self.depth.enter().map_err(|e| FormatError::DepthExceeded {
            depth: e.depth,
            max: e.max,
        })
    }

    pub fn exit_depth(&mut self) {
        self.depth.exit();
    }

    /// Consumes the writer, returning an owned, exactly-sized copy of the
    /// written symbols. The internal (possibly over-allocated) buffer is
    /// returned to the pool. No further writes are possible after this.
    pub fn finalize(mut self) -> Vec<S> {
        let mut out = Vec::with_capacity(self.pos);
        out.extend_from_slice(&self.buf[..self.pos]);
        let taken = std::mem::take(&mut self.buf);
        S::release(taken);
        out
    }
}

impl Writer<u8> {
    /// Finalizes into an owned `String`. Safe because every byte this
    /// writer ever emits -- ASCII structural characters, escaped strings,
    /// and caller-supplied UTF-8 substrings -- is valid UTF-8 by
    /// construction.
    pub fn finalize_string(self) -> String {
        String::from_utf8(self.finalize())
            .expect("writer invariant violated: wrote non-UTF-8 bytes")
    }
}

impl Writer<u16> {
    pub fn finalize_string(self) -> String {
        String::from_utf16(&self.finalize())
            .expect("writer invariant violated: wrote unpaired UTF-16 surrogates")
    }
}

impl<S: Symbol + Pooled> Default for Writer<S> {
    fn default() -> Self {
        Self::new()
    }
}
