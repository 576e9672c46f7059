use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::debug;

use crate::capture::CaptureService;
use crate::error::Result;

/// Creates a capture backend on demand.
pub type ServiceFactory = Box<dyn Fn() -> Result<Arc<dyn CaptureService>> + Send + Sync>;

/// Serialized access to the process-wide capture backend.
///
/// Some platforms allow a single backend instance per process. The registry
/// holds only a weak reference: the backend lives exactly as long as some
/// caller holds the handle returned by [`acquire`](Self::acquire), and the next
/// `acquire` after the last handle is dropped creates a fresh one.
#[derive(Clone)]
pub struct CaptureRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    factory: ServiceFactory,
    slot: Mutex<Option<Weak<dyn CaptureService>>>,
}

impl CaptureRegistry {
    /// Create a registry that builds backends with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn CaptureService>> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(RegistryInner {
                factory: Box::new(factory),
                slot: Mutex::new(None),
            }),
        }
    }

    /// Fetch the live backend, creating it if no caller holds one.
    pub fn acquire(&self) -> Result<Arc<dyn CaptureService>> {
        let mut slot = self
            .inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(service) = slot.as_ref().and_then(Weak::upgrade) {
            return Ok(service);
        }

        let service = (self.inner.factory)()?;
        debug!("created capture service");
        *slot = Some(Arc::downgrade(&service));
        Ok(service)
    }

    /// True while some caller holds the backend.
    pub fn is_live(&self) -> bool {
        self.inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }
}

impl std::fmt::Debug for CaptureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureRegistry")
            .field("live", &self.is_live())
            .finish()
    }
}
