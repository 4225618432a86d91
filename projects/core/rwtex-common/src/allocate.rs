//! Memory allocation for texel and palette buffers.
//!
//! Every buffer the engine creates comes from one [`PixelAllocator`], passed in
//! by the caller. Allocation is fallible and returns zeroed memory; freeing is
//! done by dropping the returned buffer and cannot fail.
//!
//! ## Useful APIs
//!
//! [`allocate_zeroed`]: Allocates zeroed memory with a given alignment.
//! [`DefaultAllocator`]: Heap allocation that reports exhaustion instead of aborting.
//! [`BudgetAllocator`]: Caps the total number of live bytes handed out.
//! [`CountingAllocator`]: Counts allocations made through an inner allocator.
//! [`TexelBuffer`]: An owned or borrowed buffer with copy-on-write.

use core::alloc::{Layout, LayoutError};
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};
use safe_allocator_api::prelude::*;
use safe_allocator_api::RawAlloc;
use std::sync::Arc;
use thiserror::Error;

/// Alignment of buffers requested through [`PixelAllocator::allocate`].
pub const DEFAULT_ALIGNMENT: usize = 64;

/// An error that happened in memory allocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocateError {
    /// The size and alignment do not form a valid layout, for example a size
    /// larger than `isize::MAX` or an alignment that is not a power of two.
    #[error("invalid allocation layout: {0}")]
    LayoutError(#[from] LayoutError),

    #[error(transparent)]
    AllocationFailed(#[from] AllocError),

    #[error("allocation of {requested} bytes exceeds the remaining budget of {remaining} bytes")]
    BudgetExceeded { requested: usize, remaining: usize },

    #[error("requested allocation size overflows")]
    SizeOverflow,
}

/// The allocator collaborator. Ownership of the returned buffer moves to the caller.
pub trait PixelAllocator: Send + Sync {
    /// Allocates `num_bytes` zeroed bytes aligned to `alignment`.
    fn allocate_aligned(
        &self,
        num_bytes: usize,
        alignment: usize,
    ) -> Result<TexelAlloc, AllocateError>;

    /// Allocates `num_bytes` zeroed bytes aligned to [`DEFAULT_ALIGNMENT`].
    #[inline]
    fn allocate(&self, num_bytes: usize) -> Result<TexelAlloc, AllocateError> {
        self.allocate_aligned(num_bytes, DEFAULT_ALIGNMENT)
    }
}

/// A zero-initialized heap buffer handed out by a [`PixelAllocator`].
///
/// Dropping it releases the memory and any budget it was charged against.
pub struct TexelAlloc {
    // Points into `raw`; the heap block does not move with the struct.
    ptr: NonNull<u8>,
    len: usize,
    raw: Option<RawAlloc>,
    release: Option<Arc<AtomicUsize>>,
}

// SAFETY: `TexelAlloc` uniquely owns its allocation and only hands out
// borrows tied to `&self` / `&mut self`.
unsafe impl Send for TexelAlloc {}
unsafe impl Sync for TexelAlloc {}

impl TexelAlloc {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Address of the first byte. Dangling (but aligned) for empty buffers.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialized bytes while `self` lives.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    fn charged(mut self, budget: Arc<AtomicUsize>) -> Self {
        self.release = Some(budget);
        self
    }
}

impl Drop for TexelAlloc {
    fn drop(&mut self) {
        if let Some(used) = &self.release {
            used.fetch_sub(self.len, Ordering::AcqRel);
        }
    }
}

impl core::fmt::Debug for TexelAlloc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TexelAlloc")
            .field("len", &self.len)
            .field("ptr", &self.ptr)
            .field("heap", &self.raw.is_some())
            .finish()
    }
}

/// Allocates `num_bytes` zeroed bytes aligned to `alignment`.
///
/// Empty requests allocate nothing but still validate the layout.
pub fn allocate_zeroed(num_bytes: usize, alignment: usize) -> Result<TexelAlloc, AllocateError> {
    let layout = Layout::from_size_align(num_bytes, alignment)?;
    if num_bytes == 0 {
        // Any non-zero power of two is a valid dangling address for its own alignment.
        let ptr = NonNull::new(layout.align() as *mut u8).unwrap_or(NonNull::dangling());
        return Ok(TexelAlloc {
            ptr,
            len: 0,
            raw: None,
            release: None,
        });
    }

    let mut raw = RawAlloc::new(layout)?;
    let ptr = NonNull::new(raw.as_mut_ptr()).ok_or(AllocError)?;
    // SAFETY: `raw` owns `num_bytes` writable bytes starting at `ptr`.
    unsafe { core::ptr::write_bytes(ptr.as_ptr(), 0, num_bytes) };
    Ok(TexelAlloc {
        ptr,
        len: num_bytes,
        raw: Some(raw),
        release: None,
    })
}

/// Allocates from the global heap, reporting exhaustion as an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAllocator;

impl PixelAllocator for DefaultAllocator {
    fn allocate_aligned(
        &self,
        num_bytes: usize,
        alignment: usize,
    ) -> Result<TexelAlloc, AllocateError> {
        allocate_zeroed(num_bytes, alignment)
    }
}

/// Fails any allocation that would push the number of live bytes over `limit`.
#[derive(Debug)]
pub struct BudgetAllocator {
    limit: usize,
    used: Arc<AtomicUsize>,
}

impl BudgetAllocator {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bytes currently handed out and not yet dropped.
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }
}

impl PixelAllocator for BudgetAllocator {
    fn allocate_aligned(
        &self,
        num_bytes: usize,
        alignment: usize,
    ) -> Result<TexelAlloc, AllocateError> {
        let mut current = self.used.load(Ordering::Acquire);
        loop {
            let new_total = current
                .checked_add(num_bytes)
                .ok_or(AllocateError::SizeOverflow)?;
            if new_total > self.limit {
                return Err(AllocateError::BudgetExceeded {
                    requested: num_bytes,
                    remaining: self.limit.saturating_sub(current),
                });
            }
            match self.used.compare_exchange_weak(
                current,
                new_total,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        match allocate_zeroed(num_bytes, alignment) {
            Ok(alloc) => Ok(alloc.charged(self.used.clone())),
            Err(e) => {
                self.used.fetch_sub(num_bytes, Ordering::AcqRel);
                Err(e)
            }
        }
    }
}

/// Counts successful allocations made through an inner allocator.
#[derive(Debug, Default)]
pub struct CountingAllocator<A: PixelAllocator = DefaultAllocator> {
    inner: A,
    allocations: AtomicUsize,
    bytes: AtomicUsize,
}

impl<A: PixelAllocator> CountingAllocator<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicUsize::new(0),
            bytes: AtomicUsize::new(0),
        }
    }

    /// Number of successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Acquire)
    }

    /// Total number of bytes allocated so far.
    pub fn bytes(&self) -> usize {
        self.bytes.load(Ordering::Acquire)
    }
}

impl<A: PixelAllocator> PixelAllocator for CountingAllocator<A> {
    fn allocate_aligned(
        &self,
        num_bytes: usize,
        alignment: usize,
    ) -> Result<TexelAlloc, AllocateError> {
        let result = self.inner.allocate_aligned(num_bytes, alignment)?;
        self.allocations.fetch_add(1, Ordering::AcqRel);
        self.bytes.fetch_add(num_bytes, Ordering::AcqRel);
        Ok(result)
    }
}

/// A texel or palette buffer that is either owned by the engine or borrowed from the caller.
///
/// Borrowed buffers are never freed by the engine. Writing through
/// [`TexelBuffer::make_mut`] first copies a borrowed buffer into a fresh
/// allocation.
#[derive(Debug)]
pub enum TexelBuffer<'a> {
    Owned(TexelAlloc),
    Borrowed(&'a [u8]),
}

impl<'a> TexelBuffer<'a> {
    /// Allocates a zeroed, owned buffer.
    pub fn allocate(
        allocator: &dyn PixelAllocator,
        num_bytes: usize,
    ) -> Result<Self, AllocateError> {
        Ok(Self::Owned(allocator.allocate(num_bytes)?))
    }

    /// Allocates an owned buffer holding a copy of `data`.
    pub fn copy_from(allocator: &dyn PixelAllocator, data: &[u8]) -> Result<Self, AllocateError> {
        let mut alloc = allocator.allocate(data.len())?;
        alloc.as_mut_slice().copy_from_slice(data);
        Ok(Self::Owned(alloc))
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(alloc) => alloc.as_slice(),
            Self::Borrowed(data) => data,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Returns a mutable view, copying a borrowed buffer into an owned one first.
    pub fn make_mut(&mut self, allocator: &dyn PixelAllocator) -> Result<&mut [u8], AllocateError> {
        if let Self::Borrowed(data) = *self {
            *self = Self::copy_from(allocator, data)?;
        }
        match self {
            Self::Owned(alloc) => Ok(alloc.as_mut_slice()),
            Self::Borrowed(_) => unreachable!("borrowed buffer was replaced above"),
        }
    }

    /// Converts into a buffer that no longer borrows from the caller.
    pub fn into_owned(
        self,
        allocator: &dyn PixelAllocator,
    ) -> Result<TexelBuffer<'static>, AllocateError> {
        match self {
            Self::Owned(alloc) => Ok(TexelBuffer::Owned(alloc)),
            Self::Borrowed(data) => TexelBuffer::copy_from(allocator, data),
        }
    }
}
