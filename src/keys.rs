//! Object key derivation for extracted entries and the summary report.

use std::fmt;

/// A '/'-separated object key, split into segments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectPath {
    /// Key segments (e.g., ["out", "batch", "a.txt"])
    segments: Vec<String>,
    /// Whether the key ends with '/' (directory marker)
    is_dir: bool,
}

impl ObjectPath {
    /// Parse a key. Empty, "." and ".." segments are dropped so a key can never
    /// climb out of whatever it gets joined onto.
    pub fn parse(key: &str) -> Self {
        let segments: Vec<String> = key
            .split('/')
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .map(String::from)
            .collect();
        let is_dir = key.ends_with('/') && !segments.is_empty();

        ObjectPath { segments, is_dir }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Everything but the last segment; empty for a key at the bucket root
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        ObjectPath {
            segments,
            is_dir: false,
        }
    }

    /// Last segment (base name)
    pub fn filename(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// Base name with its final extension removed ("data.zip" -> "data").
    /// Dotfiles keep their name (".zip" -> ".zip").
    pub fn stem(&self) -> Option<&str> {
        let name = self.filename()?;
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => Some(stem),
            _ => Some(name),
        }
    }

    /// Append another key; the result is a directory marker if `other` is
    pub fn join(&self, other: &str) -> Self {
        let tail = ObjectPath::parse(other);
        let mut segments = self.segments.clone();
        segments.extend(tail.segments);

        ObjectPath {
            segments,
            is_dir: tail.is_dir,
        }
    }

    /// Render as an S3 key (no leading '/')
    pub fn to_key(&self) -> String {
        let mut key = self.segments.join("/");
        if self.is_dir {
            key.push('/');
        }
        key
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

/// Destination directory for a source archive:
/// `{target_path_prefix}/{dirname(source_key)}`
pub fn destination_dir(target_path_prefix: &str, source_key: &str) -> ObjectPath {
    let source = ObjectPath::parse(source_key);
    ObjectPath::parse(target_path_prefix).join(&source.parent().to_key())
}

/// Key of the summary report:
/// `{target_path_prefix}/{dirname(source_key)}/{stem(source_key)}.html`
pub fn summary_key(target_path_prefix: &str, source_key: &str) -> String {
    let source = ObjectPath::parse(source_key);
    let stem = source.stem().unwrap_or("archive");
    destination_dir(target_path_prefix, source_key)
        .join(&format!("{stem}.html"))
        .to_key()
}
