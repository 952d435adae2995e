use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use log::debug;

/// String key-value storage seam behind the answer and session stores.
pub trait StorageBackend: Send + Sync {
    /// Read the payload under `key`, or `None` if absent or unreadable.
    fn read(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any prior payload.
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Durable backend: one JSON file per key under a device-scoped directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Keys use `:` as a scope separator; file names use `-`.
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.replace(':', "-")))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(payload) => Some(payload),
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    debug!("read of {key} failed: {err}");
                }
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

/// Process-scoped backend. Backs the session store and the unit tests.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        if let Ok(mut map) = self.entries.lock() {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}
