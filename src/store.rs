use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// The four pieces of persisted key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    CaCertificate,
    CaKey,
    ServerCertificate,
    ServerKey,
}

impl MaterialSlot {
    /// On-disk file name for the slot. Everything is raw DER.
    pub fn file_name(self) -> &'static str {
        match self {
            MaterialSlot::CaCertificate => "ca.crt",
            MaterialSlot::CaKey => "ca.key",
            MaterialSlot::ServerCertificate => "server.crt",
            MaterialSlot::ServerKey => "server.key",
        }
    }

    #[cfg(unix)]
    fn is_private(self) -> bool {
        matches!(self, MaterialSlot::CaKey | MaterialSlot::ServerKey)
    }
}

/// Storage for CA and server identity material as DER byte sequences.
///
/// Bootstrap writes each slot at most once; request handling only reads.
pub trait MaterialStore: Send + Sync {
    fn get(&self, slot: MaterialSlot) -> Result<Option<Vec<u8>>>;
    fn put(&self, slot: MaterialSlot, der: &[u8]) -> Result<()>;
}

/// In-memory store, used in tests and embedding scenarios.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<MaterialSlot, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MaterialStore for MemoryStore {
    fn get(&self, slot: MaterialSlot) -> Result<Option<Vec<u8>>> {
        let slots = self.slots.lock().expect("store mutex poisoned");
        Ok(slots.get(&slot).cloned())
    }

    fn put(&self, slot: MaterialSlot, der: &[u8]) -> Result<()> {
        let mut slots = self.slots.lock().expect("store mutex poisoned");
        slots.insert(slot, der.to_vec());
        Ok(())
    }
}

/// Directory-backed store holding one DER file per slot.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Opens (creating if needed) the state directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, slot: MaterialSlot) -> PathBuf {
        self.root.join(slot.file_name())
    }
}

impl MaterialStore for DirStore {
    fn get(&self, slot: MaterialSlot) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(slot)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, slot: MaterialSlot, der: &[u8]) -> Result<()> {
        let path = self.path_for(slot);
        fs::write(&path, der)?;
        #[cfg(unix)]
        if slot.is_private() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}
