use std::{
    sync::{
        Mutex,
        atomic::{AtomicPtr, Ordering},
    },
};

/// A value which is initialized at most once, and lives for the rest of
/// the program.
///
/// The first successful call to [`SingleInit::get_or_try_init()`] stores
/// a value; every later call returns the same value without running its
/// initializer.
pub struct SingleInit<T> {
    lock: Mutex<()>,
    value: AtomicPtr<T>,
}

impl<T> SingleInit<T> {
    /// Create a new, uninitialized cell.
    pub const fn uninit() -> SingleInit<T> {
        SingleInit {
            lock: Mutex::new(()),
            value: AtomicPtr::new(std::ptr::null_mut()),
        }
    }

    /// Get the stored value, if it was already initialized.
    pub fn get(&self) -> Option<&T> {
        let ptr = self.value.load(Ordering::Acquire);
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { &*ptr })
        }
    }

    /// Get the stored value, initializing it first if necessary.
    pub fn get_or_try_init<F, E>(&self, f: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let _guard = self.lock.lock()
            .unwrap_or_else(|poison| poison.into_inner());

        // Another thread may have finished initialization while we were
        // waiting on the lock.
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let value = Box::into_raw(Box::new(f()?));
        self.value.store(value, Ordering::Release);

        Ok(unsafe { &*value })
    }
}

unsafe impl<T: Send + Sync> Sync for SingleInit<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    static CELL: SingleInit<u32> = SingleInit::uninit();

    #[test]
    fn initializes_only_once() {
        assert_eq!(CELL.get(), None);

        let first: Result<_, ()> = CELL.get_or_try_init(|| Ok(7));
        assert_eq!(first, Ok(&7));

        let second: Result<_, ()> = CELL.get_or_try_init(|| panic!());
        assert_eq!(second, Ok(&7));
        assert_eq!(CELL.get(), Some(&7));
    }

    #[test]
    fn failed_initialization_is_retried() {
        static FAILING: SingleInit<u32> = SingleInit::uninit();

        let first: Result<&u32, &str> = FAILING.get_or_try_init(|| Err("no"));
        assert_eq!(first, Err("no"));

        let second: Result<&u32, &str> = FAILING.get_or_try_init(|| Ok(3));
        assert_eq!(second, Ok(&3));
    }
}
