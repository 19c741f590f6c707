use super::{decode, encode, Snapshot, SnapshotStore};
use crate::error::Result;

/// Keeps the encoded snapshot in memory. Saves still go through the gzip
/// codec so tests see exactly what a file would hold.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    bytes: Option<Vec<u8>>,
    saves: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// The gzip bytes of the last save.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl SnapshotStore for InMemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        self.bytes
            .as_deref()
            .map(decode)
            .transpose()
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let mut buf = Vec::new();
        encode(&mut buf, snapshot)?;
        self.bytes = Some(buf);
        self.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
