// ─── Lazy Handle ───
// Deferred construction of an optional value with "when you exist" callbacks.

use std::fmt;

type Listener<T> = Box<dyn FnOnce(&T)>;

/// Holder for a value that may or may not ever be constructed.
///
/// Reading with [`LazyHandle::get`] never constructs. Construction only happens
/// through [`LazyHandle::configure`] / [`LazyHandle::configure_with`], at most once.
/// Listeners registered before construction are replayed in registration order
/// as soon as the value exists; listeners registered afterwards run immediately.
pub struct LazyHandle<T> {
    value: Option<T>,
    listeners: Vec<Listener<T>>,
}

impl<T> LazyHandle<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            listeners: Vec::new(),
        }
    }

    /// Current value, if constructed.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.value.is_some()
    }

    /// Number of listeners still waiting for construction.
    pub fn pending_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Return the value, constructing it with `factory` if needed.
    pub fn configure(&mut self, factory: impl FnOnce() -> T) -> &mut T {
        self.configure_with(factory, |_| {})
    }

    /// Like [`LazyHandle::configure`], then run `action` on the value.
    ///
    /// On first construction, every queued listener sees the new value before
    /// `action` runs.
    pub fn configure_with(
        &mut self,
        factory: impl FnOnce() -> T,
        action: impl FnOnce(&mut T),
    ) -> &mut T {
        let value = match &mut self.value {
            Some(value) => value,
            slot @ None => {
                let value = slot.insert(factory());
                for listener in std::mem::take(&mut self.listeners) {
                    listener(&*value);
                }
                value
            }
        };
        action(&mut *value);
        value
    }

    /// Run `listener` once the value exists (immediately if it already does).
    pub fn on_configured(&mut self, listener: impl FnOnce(&T) + 'static) {
        match &self.value {
            Some(value) => listener(value),
            None => self.listeners.push(Box::new(listener)),
        }
    }
}

impl<T> Default for LazyHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyHandle")
            .field("value", &self.value)
            .field("pending_listeners", &self.listeners.len())
            .finish()
    }
}
