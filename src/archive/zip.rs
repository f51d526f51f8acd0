use anyhow::{Context, Result};
use bytes::Bytes;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;
use zip::ZipArchive;

use crate::error::EntryExtractionError;

/// Cap on the up-front buffer reservation; larger entries grow as they are read
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// An opened ZIP archive held entirely in memory.
///
/// Cloning is cheap: the downloaded bytes and the parsed central directory are
/// shared, so every worker can hold its own handle and read concurrently.
#[derive(Clone)]
pub struct ArchiveHandle {
    archive: ZipArchive<Cursor<Bytes>>,
    entries: Arc<Vec<String>>,
    size: u64,
}

impl ArchiveHandle {
    /// Parse the central directory of a downloaded archive
    pub fn open(data: Bytes) -> Result<Self> {
        let size = data.len() as u64;
        let mut archive =
            ZipArchive::new(Cursor::new(data)).context("Failed to read ZIP central directory")?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .with_context(|| format!("Failed to read ZIP directory record {index}"))?;
            entries.push(file.name().to_string());
        }

        Ok(ArchiveHandle {
            archive,
            entries: Arc::new(entries),
            size,
        })
    }

    /// Entry names in central directory order
    pub fn entry_names(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the archive itself in bytes
    pub fn archive_size(&self) -> u64 {
        self.size
    }

    /// Decompress the entry at `index`. Entries whose decompressed size exceeds
    /// `limit` fail without being fully inflated.
    pub fn read_entry(&self, index: usize, limit: u64) -> Result<Bytes, EntryExtractionError> {
        let entry = self
            .entries
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{index}"));

        let mut archive = self.archive.clone();
        let file = archive
            .by_index(index)
            .map_err(|source| EntryExtractionError::Open {
                entry: entry.clone(),
                source,
            })?;

        let declared = file.size();
        if declared > limit {
            return Err(EntryExtractionError::TooLarge {
                entry,
                size: declared,
                limit,
            });
        }

        // Read one byte past the limit so a lying header is still caught
        let mut buffer = Vec::with_capacity(declared.min(MAX_PREALLOCATION) as usize);
        file.take(limit.saturating_add(1))
            .read_to_end(&mut buffer)
            .map_err(|source| EntryExtractionError::Read {
                entry: entry.clone(),
                source,
            })?;

        if buffer.len() as u64 > limit {
            return Err(EntryExtractionError::TooLarge {
                entry,
                size: buffer.len() as u64,
                limit,
            });
        }

        Ok(Bytes::from(buffer))
    }
}

impl fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("entries", &self.entries.len())
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Build an in-memory ZIP archive from (name, contents) pairs.
    /// Names ending in '/' become directory entries.
    pub(crate) fn build_zip(entries: &[(&str, &str)]) -> Bytes {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, contents) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(contents.as_bytes()).unwrap();
            }
        }

        Bytes::from(writer.finish().unwrap().into_inner())
    }

    #[test]
    fn test_open_lists_entries_in_directory_order() {
        let data = build_zip(&[("b.txt", "bravo"), ("a.txt", "alpha"), ("docs/", "")]);
        let handle = ArchiveHandle::open(data).unwrap();

        assert_eq!(handle.entry_names(), &["b.txt", "a.txt", "docs/"]);
        assert_eq!(handle.len(), 3);
    }

    #[test]
    fn test_read_entry() {
        let data = build_zip(&[("a.txt", "alpha"), ("b.txt", "bravo")]);
        let handle = ArchiveHandle::open(data).unwrap();

        assert_eq!(handle.read_entry(1, u64::MAX).unwrap(), Bytes::from_static(b"bravo"));
        // Reads are repeatable
        assert_eq!(handle.read_entry(1, u64::MAX).unwrap(), Bytes::from_static(b"bravo"));
        assert_eq!(handle.read_entry(0, u64::MAX).unwrap(), Bytes::from_static(b"alpha"));
    }

    #[test]
    fn test_read_directory_entry_is_empty() {
        let data = build_zip(&[("docs/", "")]);
        let handle = ArchiveHandle::open(data).unwrap();
        assert!(handle.read_entry(0, u64::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_read_entry_over_limit() {
        let contents = "x".repeat(4096);
        let data = build_zip(&[("big.bin", contents.as_str())]);
        let handle = ArchiveHandle::open(data).unwrap();

        let err = handle.read_entry(0, 1024).unwrap_err();
        assert!(matches!(err, EntryExtractionError::TooLarge { size: 4096, limit: 1024, .. }));
    }

    #[test]
    fn test_read_entry_out_of_range() {
        let data = build_zip(&[("a.txt", "alpha")]);
        let handle = ArchiveHandle::open(data).unwrap();
        assert!(matches!(
            handle.read_entry(5, u64::MAX),
            Err(EntryExtractionError::Open { .. })
        ));
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let result = ArchiveHandle::open(Bytes::from_static(b"definitely not a zip file"));
        assert!(result.is_err());
    }

    #[test]
    fn test_concurrent_reads() {
        let entries: Vec<(String, String)> = (0..16)
            .map(|i| (format!("file-{i}.txt"), format!("contents {i}")))
            .collect();
        let refs: Vec<(&str, &str)> = entries
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let handle = ArchiveHandle::open(build_zip(&refs)).unwrap();

        std::thread::scope(|scope| {
            for index in 0..handle.len() {
                let handle = handle.clone();
                scope.spawn(move || {
                    let bytes = handle.read_entry(index, u64::MAX).unwrap();
                    assert_eq!(bytes, Bytes::from(format!("contents {index}")));
                });
            }
        });
    }
}
