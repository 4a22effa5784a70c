use crate::{buffer::Buffer, error::ErrorEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A persistent event handler. Handlers run on the runtime task that
/// completed the operation, so they must not block.
pub type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;

#[derive(Default)]
struct Slots {
    read: Option<Handler<Buffer>>,
    write: Option<Handler<()>>,
    copy: Option<Handler<u64>>,
    error: Option<Handler<ErrorEvent>>,
}

/// One handler slot per event kind. Registering replaces the previous
/// handler; there is no fan-out.
#[derive(Default)]
pub(crate) struct Handlers {
    slots: Mutex<Slots>,
}

// Returns true if a handler was replaced.
fn replace<T>(slot: &mut Option<Handler<T>>, handler: Handler<T>) -> bool {
    slot.replace(handler).is_some()
}

impl Handlers {
    fn slots(&self) -> MutexGuard<'_, Slots> {
        // handlers never run under this lock, a poisoned slot table is still consistent
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_read(&self, handler: Handler<Buffer>) -> bool {
        replace(&mut self.slots().read, handler)
    }

    pub fn set_write(&self, handler: Handler<()>) -> bool {
        replace(&mut self.slots().write, handler)
    }

    pub fn set_copy(&self, handler: Handler<u64>) -> bool {
        replace(&mut self.slots().copy, handler)
    }

    pub fn set_error(&self, handler: Handler<ErrorEvent>) -> bool {
        replace(&mut self.slots().error, handler)
    }

    pub fn read(&self) -> Option<Handler<Buffer>> {
        self.slots().read.clone()
    }

    pub fn write(&self) -> Option<Handler<()>> {
        self.slots().write.clone()
    }

    pub fn copy(&self) -> Option<Handler<u64>> {
        self.slots().copy.clone()
    }

    pub fn error(&self) -> Option<Handler<ErrorEvent>> {
        self.slots().error.clone()
    }
}
