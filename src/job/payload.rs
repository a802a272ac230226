use std::any::Any;
use std::sync::Arc;

/// Opaque per-event data handed to the lifecycle processor alongside an event.
///
/// The processor passes it through untouched; callers that attach a value
/// (a failure cause, a result) can recover it with [`Payload::downcast_ref`].
#[derive(Clone, Default)]
pub struct Payload(Option<Arc<dyn Any + Send + Sync>>);

impl Payload {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|v| v.downcast_ref::<T>())
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Payload(..)"),
            None => f.write_str("Payload(None)"),
        }
    }
}
