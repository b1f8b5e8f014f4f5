use std::cell::{BorrowMutError, Ref, RefCell, RefMut};
use std::rc::Rc;

/// Fixed-length landing buffer shared between a column descriptor and its readers.
///
/// Allocated once at bind time and never resized. Clones share the same bytes; the
/// memory is released when the last clone drops. Single-threaded by contract.
#[derive(Debug, Clone)]
pub struct OwnedBuffer(Rc<RefCell<Box<[u8]>>>);

impl OwnedBuffer {
    /// Create a zero-filled buffer of `len` bytes
    pub fn new(len: usize) -> Self {
        Self(Rc::new(RefCell::new(vec![0; len].into_boxed_slice())))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the bytes for reading.
    #[inline]
    pub fn bytes(&self) -> Ref<'_, [u8]> {
        Ref::map(self.0.borrow(), |b| &**b)
    }

    /// Get mutable access to the bytes; only the driver writes through this.
    ///
    /// Fails while a guard returned by [`OwnedBuffer::bytes`] is alive.
    #[inline]
    pub(crate) fn try_bytes_mut(&self) -> Result<RefMut<'_, [u8]>, BorrowMutError> {
        self.0.try_borrow_mut().map(|b| RefMut::map(b, |b| &mut **b))
    }

    /// Whether no reader holds the bytes right now
    pub(crate) fn is_free(&self) -> bool {
        self.0.try_borrow_mut().is_ok()
    }

    /// Number of live handles to these bytes
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}
