//! Index-addressed storage behind the web host's element and observer
//! handles.

/// Values addressed by their insertion index.
///
/// Released slots are cleared but never handed out again, so a stale handle
/// held by a closure or a registration resolves to nothing instead of to
/// whatever element was created later.
#[derive(Debug)]
pub(crate) struct Slots<T> {
    items: Vec<Option<T>>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Clone> Slots<T> {
    pub(crate) fn insert(&mut self, value: T) -> u64 {
        self.items.push(Some(value));
        (self.items.len() - 1) as u64
    }

    /// A slot that never resolves, for values the platform failed to create.
    pub(crate) fn reserve(&mut self) -> u64 {
        self.items.push(None);
        (self.items.len() - 1) as u64
    }

    pub(crate) fn get(&self, index: u64) -> Option<T> {
        self.items.get(index as usize).cloned().flatten()
    }

    /// Drops the value held at `index`. Returns whether anything was held.
    pub(crate) fn release(&mut self, index: u64) -> bool {
        self.items
            .get_mut(index as usize)
            .and_then(Option::take)
            .is_some()
    }

    #[cfg(test)]
    pub(crate) fn live(&self) -> usize {
        self.items.iter().filter(|v| v.is_some()).count()
    }
}
