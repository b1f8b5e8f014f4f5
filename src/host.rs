//! Caller-owned host variables.
//!
//! A static record does not own the variables it fills: the caller keeps a
//! [`HostVar`] and hands a clone to the record. After every successful fetch the
//! caller reads the new value through its own handle.

use std::cell::{BorrowMutError, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use zerocopy::{FromBytes, IntoBytes};

/// Shared, single-threaded cell holding one host variable.
pub struct HostVar<T>(pub(crate) Rc<RefCell<T>>);

impl<T> HostVar<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// A fetch into a record holding this variable fails with
    /// [`Error::IncorrectUse`](crate::Error::IncorrectUse) while the guard is alive.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }

    pub(crate) fn try_borrow_mut(&self) -> Result<RefMut<'_, T>, BorrowMutError> {
        self.0.try_borrow_mut()
    }

    pub(crate) fn try_set(&self, value: T) -> Result<(), BorrowMutError> {
        *self.0.try_borrow_mut()? = value;
        Ok(())
    }

    /// Whether no guard of this variable is alive
    pub(crate) fn is_free(&self) -> bool {
        self.0.try_borrow_mut().is_ok()
    }

    /// Whether `self` and `other` are handles to the same variable
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> HostVar<T> {
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for HostVar<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for HostVar<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for HostVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(v) => f.debug_tuple("HostVar").field(&*v).finish(),
            Err(_) => f.write_str("HostVar(<borrowed>)"),
        }
    }
}

/// Byte view of a fixed-width host variable the driver writes into.
pub(crate) trait FixedCell {
    fn try_bytes_mut(&self) -> Result<RefMut<'_, [u8]>, BorrowMutError>;

    fn is_free(&self) -> bool;

    fn size(&self) -> usize;
}

impl<T: FromBytes + IntoBytes> FixedCell for RefCell<T> {
    fn try_bytes_mut(&self) -> Result<RefMut<'_, [u8]>, BorrowMutError> {
        self.try_borrow_mut()
            .map(|v| RefMut::map(v, |v| v.as_mut_bytes()))
    }

    fn is_free(&self) -> bool {
        self.try_borrow_mut().is_ok()
    }

    fn size(&self) -> usize {
        size_of::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DateStruct;

    #[test]
    fn clones_share_the_variable() {
        let var = HostVar::new(1i32);
        let other = var.clone();
        other.set(7);
        assert_eq!(var.get(), 7);
        assert!(var.ptr_eq(&other));
        assert_eq!(var.replace(9), 7);
    }

    #[test]
    fn fixed_cell_writes_through() {
        let var = HostVar::new(DateStruct::default());
        let cell: Rc<dyn FixedCell> = var.0.clone();
        assert_eq!(cell.size(), 6);
        cell.try_bytes_mut()
            .unwrap()
            .copy_from_slice(DateStruct::new(1999, 12, 31).as_bytes());
        assert_eq!(var.get(), DateStruct::new(1999, 12, 31));
    }

    #[test]
    fn held_variable_refuses_writes() {
        let var = HostVar::new(3u16);
        let cell: Rc<dyn FixedCell> = var.0.clone();
        let guard = var.borrow();
        assert!(!var.is_free());
        assert!(!cell.is_free());
        assert!(cell.try_bytes_mut().is_err());
        assert!(var.try_set(4).is_err());
        drop(guard);
        var.try_set(4).unwrap();
        assert_eq!(var.get(), 4);
    }

    #[test]
    fn debug_while_borrowed() {
        let var = HostVar::new(String::from("x"));
        assert_eq!(format!("{var:?}"), "HostVar(\"x\")");
        let _guard = var.borrow_mut();
        assert_eq!(format!("{var:?}"), "HostVar(<borrowed>)");
    }
}
