//! Normalized asset paths.
//!
//! Every lookup into a [`PathIndex`](crate::PathIndex) goes through
//! [`AssetPath`], so queries and build output agree on one spelling of each
//! path.
//!
//! # Examples
//!
//! ```
//! use assetfs::AssetPath;
//!
//! let path = AssetPath::normalize("css/../js//app.js");
//! assert_eq!(path.as_str(), "/js/app.js");
//! ```

use std::fmt;

/// A normalized absolute path inside an asset tree.
///
/// `AssetPath` uses Unix conventions on all platforms:
/// - Always starts with '/'
/// - `.` segments and empty segments are dropped
/// - `..` removes the previous segment and never climbs above the root
/// - No trailing slash, except for the root itself
///
/// Normalization is purely lexical and cannot fail.
///
/// # Examples
///
/// ```
/// use assetfs::AssetPath;
///
/// assert_eq!(AssetPath::normalize("").as_str(), "/");
/// assert_eq!(AssetPath::normalize("../../etc/passwd").as_str(), "/etc/passwd");
/// assert_eq!(AssetPath::normalize("/img/").as_str(), "/img");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    /// Returns the root path `/`.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Normalizes a raw request path.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self::from_segments(raw.split('/'))
    }

    /// Builds a path from individual segments, applying the same rules as
    /// [`normalize`](Self::normalize).
    ///
    /// # Examples
    ///
    /// ```
    /// use assetfs::AssetPath;
    ///
    /// let path = AssetPath::from_segments(["img", "logo.png"]);
    /// assert_eq!(path.as_str(), "/img/logo.png");
    /// ```
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut kept: Vec<&str> = Vec::new();
        for segment in segments {
            match segment {
                "" | "." => {}
                ".." => {
                    kept.pop();
                }
                name => kept.push(name),
            }
        }

        if kept.is_empty() {
            return Self::root();
        }

        let mut path = String::with_capacity(kept.iter().map(|s| s.len() + 1).sum());
        for name in kept {
            path.push('/');
            path.push_str(name);
        }
        Self(path)
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns the last segment, or `None` for the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use assetfs::AssetPath;
    ///
    /// assert_eq!(AssetPath::normalize("/img/logo.png").file_name(), Some("logo.png"));
    /// assert_eq!(AssetPath::root().file_name(), None);
    /// ```
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Returns the parent directory of this path.
    ///
    /// Returns `None` if this is the root path.
    ///
    /// # Examples
    ///
    /// ```
    /// use assetfs::AssetPath;
    ///
    /// let path = AssetPath::normalize("/img/icons/x.svg");
    /// assert_eq!(path.parent().unwrap().as_str(), "/img/icons");
    /// assert_eq!(AssetPath::normalize("/x.svg").parent().unwrap().as_str(), "/");
    /// ```
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        self.0.rfind('/').map(|pos| {
            if pos == 0 {
                Self::root()
            } else {
                Self(self.0[..pos].to_string())
            }
        })
    }

    /// Returns the path without its leading slash, suitable for joining onto
    /// an on-disk directory.
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.0
    }
}
