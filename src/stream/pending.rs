use super::handlers::{Handler, Handlers};
use crate::error::{IntoErrorEvent, OpKind, Result, StreamError};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::oneshot;
use tracing::trace;

/// In-flight flags of a stream, one per operation kind.
#[derive(Debug, Default)]
pub(crate) struct OpFlags {
    read: AtomicBool,
    write: AtomicBool,
    copy: AtomicBool,
}

impl OpFlags {
    fn slot(&self, kind: OpKind) -> &AtomicBool {
        match kind {
            OpKind::Read => &self.read,
            OpKind::Write => &self.write,
            OpKind::Copy => &self.copy,
        }
    }

    pub fn is_busy(&self, kind: OpKind) -> bool {
        self.slot(kind).load(Ordering::Acquire)
    }

    /// Claim the slot for `kind`, failing if an operation of that kind is
    /// already pending. The slot is released when the returned guard drops.
    pub fn acquire(self: &Arc<Self>, kind: OpKind) -> Result<InFlight> {
        self.slot(kind)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StreamError::OperationInProgress(kind))?;
        Ok(InFlight {
            flags: self.clone(),
            kind,
        })
    }
}

pub(crate) struct InFlight {
    flags: Arc<OpFlags>,
    kind: OpKind,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flags.slot(self.kind).store(false, Ordering::Release);
    }
}

/// Where the result of a pending operation goes. Consumed by `complete`, so
/// every result is delivered at most once and through one channel only.
pub(crate) enum Completion<T, E = StreamError> {
    /// Resume the task suspended in the blocking form of the call.
    Resume(oneshot::Sender<Result<T, E>>),
    /// Invoke the handler captured when the async form was issued, or the
    /// stream's error handler on failure.
    Dispatch {
        op: OpKind,
        handler: Option<Handler<T>>,
        handlers: Arc<Handlers>,
    },
}

impl<T, E: IntoErrorEvent> Completion<T, E> {
    /// A completion that resumes the returned [`Suspended`] call.
    pub fn suspend() -> (Self, Suspended<T, E>) {
        let (tx, rx) = oneshot::channel();
        (Self::Resume(tx), Suspended(rx))
    }

    pub fn dispatch(op: OpKind, handler: Option<Handler<T>>, handlers: Arc<Handlers>) -> Self {
        Self::Dispatch {
            op,
            handler,
            handlers,
        }
    }

    pub fn complete(self, result: Result<T, E>) {
        match self {
            Self::Resume(tx) => {
                // the suspended caller went away; nobody is left to observe the result
                let _ = tx.send(result);
            }
            Self::Dispatch {
                op,
                handler,
                handlers,
            } => match result {
                Ok(value) => match handler {
                    Some(h) => h(value),
                    None => trace!("{} completed without handler", op),
                },
                Err(e) => match handlers.error() {
                    Some(h) => h(e.into_event(op)),
                    None => trace!("{} failed without error handler", op),
                },
            },
        }
    }
}

/// The caller's side of a [`Completion::Resume`].
pub(crate) struct Suspended<T, E>(oneshot::Receiver<Result<T, E>>);

impl<T, E: From<StreamError>> Suspended<T, E> {
    pub async fn wait(self) -> Result<T, E> {
        // a dropped sender means the operation task died with the runtime
        self.0
            .await
            .unwrap_or_else(|_| Err(StreamError::Closed.into()))
    }
}
