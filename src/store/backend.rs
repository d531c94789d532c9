// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Storage backends for the persistent trust store partition.
//!
//! A backend is a flat, label-addressable blob store. The trust store owns
//! the layout of what it writes (certificate DER, CRL DER); the backend
//! only promises durable label-addressable retrieval.

use crate::Result;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Durable blob storage addressed by label.
pub trait StorageBackend {
    /// Stores `data` under `label`, replacing any previous value.
    fn put(&mut self, label: &str, data: &[u8]) -> Result<()>;
    /// Loads the blob stored under `label`.
    fn get(&self, label: &str) -> Result<Option<Vec<u8>>>;
    /// Removes the blob stored under `label`, if any.
    fn delete(&mut self, label: &str) -> Result<()>;
    /// Lists all labels currently stored, in unspecified order.
    fn list(&self) -> Result<Vec<String>>;
}

/// In-memory backend; the "persistent" partition lives only as long as the
/// process. Useful for tests and for callers that handle durability
/// elsewhere.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn put(&mut self, label: &str, data: &[u8]) -> Result<()> {
        self.blobs.insert(label.to_owned(), data.to_vec());
        Ok(())
    }

    fn get(&self, label: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(label).cloned())
    }

    fn delete(&mut self, label: &str) -> Result<()> {
        self.blobs.remove(label);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.blobs.keys().cloned().collect())
    }
}

/// Directory-backed store, one file per label.
///
/// Labels are arbitrary UTF-8 and may not be valid file names, so each file
/// is named by the URL-safe base64 of its label. Writes go through a
/// temporary file and rename so a crash never leaves a half-written blob
/// under a valid name.
#[derive(Debug)]
pub struct DirBackend {
    dir: PathBuf,
}

const BLOB_EXT: &str = "blob";

impl DirBackend {
    /// Opens (creating if needed) the backing directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, label: &str) -> PathBuf {
        self.dir
            .join(URL_SAFE_NO_PAD.encode(label.as_bytes()))
            .with_extension(BLOB_EXT)
    }
}

impl StorageBackend for DirBackend {
    fn put(&mut self, label: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(label);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get(&self, label: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(label)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&mut self, label: &str) -> Result<()> {
        match fs::remove_file(self.path_for(label)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut labels = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(BLOB_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match URL_SAFE_NO_PAD
                .decode(stem)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
            {
                Some(label) => labels.push(label),
                // Foreign files in the directory are skipped, not fatal.
                None => warn!("ignoring unrecognized file in store directory: {path:?}"),
            }
        }
        Ok(labels)
    }
}
