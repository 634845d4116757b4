//! Versioned object pool backing event handles.
//!
//! Entries are reused in place. Every release bumps the entry's version,
//! so a handle minted before the release can no longer match it.

/// Values that can be cleared for reuse while keeping their allocations.
pub(crate) trait Recycle: Default {
    fn recycle(&mut self);
}

/// Version carried by a handle did not match the pooled entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct VersionMismatch {
    pub(crate) held: u32,
    pub(crate) current: u32,
}

struct Entry<T> {
    version: u32,
    live: bool,
    value: T,
}

pub(crate) struct Pool<T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
}

impl<T: Recycle> Pool<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
        }
    }

    /// Mark an entry live and hand out its index, version and value.
    ///
    /// Free entries are reused before the pool grows.
    pub(crate) fn acquire(&mut self) -> (u32, u32, &mut T) {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.entries.push(Entry {
                    version: 0,
                    live: false,
                    value: T::default(),
                });
                (self.entries.len() - 1) as u32
            }
        };
        let entry = &mut self.entries[index as usize];
        entry.live = true;
        (index, entry.version, &mut entry.value)
    }

    /// Borrow a live entry if `version` still matches it.
    pub(crate) fn get(&self, index: u32, version: u32) -> Result<&T, VersionMismatch> {
        match self.entries.get(index as usize) {
            Some(entry) if entry.live && entry.version == version => Ok(&entry.value),
            Some(entry) => Err(VersionMismatch {
                held: version,
                current: entry.version,
            }),
            None => Err(VersionMismatch {
                held: version,
                current: 0,
            }),
        }
    }

    /// Move a live entry's value out for consumption.
    ///
    /// The entry stays live until [`Pool::restore`] hands the value back.
    pub(crate) fn checkout(&mut self, index: u32, version: u32) -> Result<T, VersionMismatch> {
        self.get(index, version)?;
        Ok(std::mem::take(&mut self.entries[index as usize].value))
    }

    /// Return a checked-out value and release its entry.
    pub(crate) fn restore(&mut self, index: u32, value: T) {
        if let Some(entry) = self.entries.get_mut(index as usize) {
            entry.value = value;
        }
        self.release(index);
    }

    /// Release a live entry: clear it, bump its version and free it.
    ///
    /// Releasing an entry that is not live does nothing.
    pub(crate) fn release(&mut self, index: u32) {
        let Some(entry) = self.entries.get_mut(index as usize) else {
            return;
        };
        if !entry.live {
            return;
        }
        entry.value.recycle();
        entry.live = false;
        entry.version = entry.version.wrapping_add(1);
        self.free.push(index);
    }

    #[cfg(test)]
    pub(crate) fn is_live(&self, index: u32) -> bool {
        self.entries
            .get(index as usize)
            .is_some_and(|entry| entry.live)
    }

    /// Number of entries ever allocated.
    #[cfg(test)]
    pub(crate) fn allocated(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.live).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Buffer(Vec<u32>);

    impl Recycle for Buffer {
        fn recycle(&mut self) {
            self.0.clear();
        }
    }

    #[test]
    fn release_bumps_version_and_reuses_entry() {
        let mut pool: Pool<Buffer> = Pool::with_capacity(2);
        let (index, version, _) = pool.acquire();
        pool.release(index);

        let (reused, next_version, _) = pool.acquire();
        assert_eq!(reused, index);
        assert_eq!(next_version, version + 1);
        assert_eq!(pool.allocated(), 1);
    }

    #[test]
    fn stale_version_is_rejected() {
        let mut pool: Pool<Buffer> = Pool::with_capacity(2);
        let (index, version, _) = pool.acquire();
        pool.release(index);
        let _ = pool.acquire();

        let mismatch = pool.get(index, version).err().unwrap();
        assert_eq!(mismatch.held, version);
        assert_eq!(mismatch.current, version + 1);
    }

    #[test]
    fn released_entry_is_not_live() {
        let mut pool: Pool<Buffer> = Pool::with_capacity(1);
        let (index, version, _) = pool.acquire();
        pool.release(index);

        assert!(!pool.is_live(index));
        assert!(pool.get(index, version).is_err());
    }

    #[test]
    fn checkout_and_restore_keep_capacity() {
        let mut pool: Pool<Buffer> = Pool::with_capacity(1);
        let (index, version, value) = pool.acquire();
        value.0.extend([1, 2, 3]);

        let buffer = pool.checkout(index, version).unwrap();
        assert_eq!(buffer.0, vec![1, 2, 3]);
        let capacity = buffer.0.capacity();
        pool.restore(index, buffer);

        let (_, _, value) = pool.acquire();
        assert!(value.0.is_empty());
        assert_eq!(value.0.capacity(), capacity);
    }

    #[test]
    fn double_release_is_ignored() {
        let mut pool: Pool<Buffer> = Pool::with_capacity(1);
        let (index, _, _) = pool.acquire();
        pool.release(index);
        pool.release(index);

        let _ = pool.acquire();
        let _ = pool.acquire();
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.live_count(), 2);
    }

    #[test]
    fn unknown_index_is_rejected() {
        let pool: Pool<Buffer> = Pool::with_capacity(1);
        assert!(pool.get(7, 0).is_err());
    }
}
