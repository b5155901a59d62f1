//! Storage-independent paths.
//!
//! A [`Path`] is a normalized list of segments relative to the root of a
//! storage. `.` and empty segments vanish, `..` pops the previous segment;
//! leading `..` segments that cannot be popped are kept so relative package
//! references (`../media/image1.png`) survive until they are joined.

use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: SmallVec<[String; 4]>,
}

impl Path {
    pub fn new(path: &str) -> Self {
        let mut result = Self::root();
        for segment in path.split(['/', '\\']) {
            result.push_segment(segment);
        }
        result
    }

    /// The storage root (no segments).
    #[inline]
    pub fn root() -> Self {
        Self {
            segments: SmallVec::new(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn push_segment(&mut self, segment: &str) {
        match segment {
            "" | "." => {},
            ".." => {
                if matches!(self.segments.last(), Some(last) if last != "..") {
                    self.segments.pop();
                } else {
                    self.segments.push("..".to_string());
                }
            },
            other => self.segments.push(other.to_string()),
        }
    }

    /// Append `other` to this path, resolving its `..` segments against `self`.
    pub fn join(&self, other: &Path) -> Path {
        let mut result = self.clone();
        for segment in &other.segments {
            result.push_segment(segment);
        }
        result
    }

    /// Append a single (possibly multi-segment) name.
    pub fn child(&self, name: &str) -> Path {
        self.join(&Path::new(name))
    }

    pub fn parent(&self) -> Option<Path> {
        if self.segments.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Extension of the last segment, without the dot.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        let dot = name.rfind('.')?;
        if dot == 0 {
            return None;
        }
        Some(&name[dot + 1..])
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self
                .segments
                .iter()
                .zip(prefix.segments.iter())
                .all(|(a, b)| a == b)
    }

    /// Express this path relative to `base`; `None` if `base` is not a prefix.
    pub fn rebase(&self, base: &Path) -> Option<Path> {
        if !self.starts_with(base) {
            return None;
        }
        Some(Path {
            segments: self.segments[base.segments.len()..].iter().cloned().collect(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Path::new(path)
    }
}

impl From<&String> for Path {
    fn from(path: &String) -> Self {
        Path::new(path)
    }
}
