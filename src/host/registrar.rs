//! Registration window handed to plugin constructors.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::routing::Endpoint;

type PendingBuffer = Option<Vec<Arc<Endpoint>>>;

/// Accepts `register_endpoint` calls while a plugin is being constructed.
///
/// The host opens the window before invoking a plugin factory and closes it
/// when the factory returns; registrations land in a pending buffer that is
/// committed to the router only if construction succeeded. A plugin may keep
/// a clone of its `Registrar`, but calls after the window closed are a
/// programming error: they are logged and the endpoint is dropped.
#[derive(Clone)]
pub struct Registrar {
    pending: Arc<Mutex<PendingBuffer>>,
}

impl Registrar {
    pub(crate) fn open() -> Self {
        Self {
            pending: Arc::new(Mutex::new(Some(Vec::new()))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PendingBuffer> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an endpoint with the host. Valid only during construction.
    pub fn register_endpoint(&self, endpoint: Arc<Endpoint>) {
        let mut guard = self.lock();
        match guard.as_mut() {
            Some(buffer) => {
                if buffer.iter().any(|e| Arc::ptr_eq(e, &endpoint)) {
                    tracing::error!(path = %endpoint.path(), "Endpoint already registered");
                } else {
                    buffer.push(endpoint);
                }
            }
            None => {
                tracing::error!(
                    path = %endpoint.path(),
                    "Endpoints must be registered in the plugin constructor"
                );
            }
        }
    }

    /// Close the window and hand back whatever was registered.
    pub(crate) fn close(&self) -> Vec<Arc<Endpoint>> {
        self.lock().take().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrations_buffered_until_close() {
        let registrar = Registrar::open();
        registrar.register_endpoint(Endpoint::builder("/a").build());
        registrar.register_endpoint(Endpoint::builder("/b").build());

        let endpoints = registrar.close();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].path(), "/a");
    }

    #[test]
    fn test_closed_window_drops_registration() {
        let registrar = Registrar::open();
        let stashed = registrar.clone();
        registrar.close();

        stashed.register_endpoint(Endpoint::builder("/late").build());
        assert!(stashed.close().is_empty());
    }

    #[test]
    fn test_duplicate_in_window_dropped() {
        let registrar = Registrar::open();
        let ep = Endpoint::builder("/a").build();
        registrar.register_endpoint(ep.clone());
        registrar.register_endpoint(ep);
        assert_eq!(registrar.close().len(), 1);
    }
}
