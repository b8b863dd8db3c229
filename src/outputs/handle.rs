use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

const HANDLE_SCHEME: &str = "blob:clipdeck/";

/// Opaque, session-scoped reference to a payload held by a [`HandleRegistry`].
///
/// Cloning the handle does not clone the payload. Once revoked, the handle
/// no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    id: Uuid,
    len: usize,
}

impl ResourceHandle {
    pub(crate) fn mint(len: usize) -> Self {
        Self { id: Uuid::new_v4(), len }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Size of the referent in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", HANDLE_SCHEME, self.id)
    }
}

/// In-memory store backing every live handle of a session.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    entries: HashMap<Uuid, Arc<[u8]>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, payload: Vec<u8>) -> ResourceHandle {
        let handle = ResourceHandle::mint(payload.len());
        self.entries.insert(handle.id, Arc::from(payload));
        debug!(handle = %handle, bytes = handle.len, "Minted resource handle");
        handle
    }

    pub fn resolve(&self, handle: &ResourceHandle) -> Option<Arc<[u8]>> {
        self.entries.get(&handle.id).cloned()
    }

    /// Returns true if the handle was live.
    pub fn revoke(&mut self, handle: &ResourceHandle) -> bool {
        let revoked = self.entries.remove(&handle.id).is_some();
        if revoked {
            debug!(handle = %handle, "Revoked resource handle");
        }
        revoked
    }

    pub fn revoke_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn live(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_renders_as_blob_reference() {
        let mut registry = HandleRegistry::new();
        let handle = registry.mint(vec![1, 2, 3]);
        assert!(handle.to_string().starts_with("blob:clipdeck/"));
        assert_eq!(handle.len(), 3);
    }

    #[test]
    fn revoked_handle_no_longer_resolves() {
        let mut registry = HandleRegistry::new();
        let handle = registry.mint(b"abc".to_vec());
        assert_eq!(registry.resolve(&handle).as_deref(), Some(&b"abc"[..]));

        assert!(registry.revoke(&handle));
        assert!(registry.resolve(&handle).is_none());
        assert!(!registry.revoke(&handle), "second revoke is a no-op");
    }

    #[test]
    fn resolved_payload_outlives_revocation() {
        let mut registry = HandleRegistry::new();
        let handle = registry.mint(vec![9; 16]);
        let payload = registry.resolve(&handle).unwrap();
        registry.revoke_all();
        assert_eq!(payload.len(), 16);
        assert_eq!(registry.live(), 0);
    }
}
