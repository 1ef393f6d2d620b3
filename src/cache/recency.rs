//! Recency List Module
//!
//! Doubly linked list of cache entries ordered by write recency, stored in an
//! arena and addressed by stable handles.

use crate::cache::Entry;

// == Handle ==
/// Stable address of an entry inside the arena.
///
/// A handle stays valid until its entry is removed; the slot may then be
/// reused by a later insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

// == Recency List ==
/// Recency ordering for cache entries.
///
/// - Head = most recently written
/// - Tail = least recently written
///
/// All linking operations are O(1). Methods that follow a handle return
/// `None` when the handle does not address a live entry, which the store
/// reports as an internal consistency failure.
#[derive(Debug)]
pub struct RecencyList<V> {
    slots: Vec<Option<Entry<V>>>,
    free: Vec<usize>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecencyList<V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Accessors ==
    pub fn get(&self, handle: Handle) -> Option<&Entry<V>> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entry<V>> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Most recently written entry.
    pub fn head(&self) -> Option<Handle> {
        self.head
    }

    /// Least recently written entry.
    pub fn tail(&self) -> Option<Handle> {
        self.tail
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Push Front ==
    /// Stores `entry` in a free slot and links it at the head.
    pub fn push_front(&mut self, entry: Entry<V>) -> Handle {
        let handle = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(entry);
                Handle(index)
            }
            None => {
                self.slots.push(Some(entry));
                Handle(self.slots.len() - 1)
            }
        };

        self.len += 1;
        let linked = self.link_front(handle);
        debug_assert!(linked.is_some());
        handle
    }

    // == Move To Front ==
    /// Relinks an existing entry at the head.
    pub fn move_to_front(&mut self, handle: Handle) -> Option<()> {
        if self.head == Some(handle) {
            return self.get(handle).map(|_| ());
        }
        self.unlink(handle)?;
        self.link_front(handle)
    }

    // == Remove ==
    /// Unlinks an entry and releases its slot.
    pub fn remove(&mut self, handle: Handle) -> Option<Entry<V>> {
        self.unlink(handle)?;
        let entry = self.slots.get_mut(handle.0)?.take()?;
        self.free.push(handle.0);
        self.len -= 1;
        Some(entry)
    }

    // == Pop Back ==
    /// Removes and returns the least recently written entry.
    pub fn pop_back(&mut self) -> Option<Entry<V>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iteration ==
    /// Iterates entries from head (most recent) to tail.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn unlink(&mut self, handle: Handle) -> Option<()> {
        let (prev, next) = {
            let entry = self.get(handle)?;
            (entry.prev, entry.next)
        };

        match prev {
            Some(prev) => self.get_mut(prev)?.next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.get_mut(next)?.prev = prev,
            None => self.tail = prev,
        }

        let entry = self.get_mut(handle)?;
        entry.prev = None;
        entry.next = None;
        Some(())
    }

    fn link_front(&mut self, handle: Handle) -> Option<()> {
        let old_head = self.head;
        {
            let entry = self.get_mut(handle)?;
            entry.prev = None;
            entry.next = old_head;
        }

        match old_head {
            Some(old_head) => self.get_mut(old_head)?.prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        Some(())
    }
}

// == Iterator ==
/// Head-to-tail iterator over a [`RecencyList`].
pub struct Iter<'a, V> {
    list: &'a RecencyList<V>,
    cursor: Option<Handle>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Handle, &'a Entry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let entry = self.list.get(handle)?;
        self.cursor = entry.next;
        Some((handle, entry))
    }
}
