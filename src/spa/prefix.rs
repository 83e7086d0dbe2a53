//! Mount prefix handling

use std::borrow::Cow;
use std::fmt;

/// URL prefix the SPA handler is mounted under
///
/// Stored in canonical form: empty for root mounting, otherwise a leading `/`
/// and no trailing `/`. `""`, `"/"` and `"//"` are all the root mount, and
/// `"/static/ui/"` becomes `"/static/ui"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountPrefix(String);

impl MountPrefix {
    pub fn new(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            Self(String::new())
        } else {
            Self(format!("/{}", segments.join("/")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove the prefix from a request path
    ///
    /// The result always starts with `/`. The prefix only matches on a
    /// segment boundary: `/static/uix` is not below `/static/ui`. A path that
    /// is not below the prefix yields `/`.
    pub fn strip<'a>(&self, path: &'a str) -> Cow<'a, str> {
        let rest = match path.strip_prefix(self.0.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') || self.is_root() => rest,
            _ => return Cow::Borrowed("/"),
        };
        if rest.starts_with('/') {
            Cow::Borrowed(rest)
        } else {
            Cow::Owned(format!("/{rest}"))
        }
    }
}

impl fmt::Display for MountPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(MountPrefix::new("").as_str(), "");
        assert_eq!(MountPrefix::new("/").as_str(), "");
        assert_eq!(MountPrefix::new("//").as_str(), "");
        assert_eq!(MountPrefix::new("/static/ui/").as_str(), "/static/ui");
        assert_eq!(MountPrefix::new("static/ui").as_str(), "/static/ui");
        assert_eq!(MountPrefix::new("/static//ui").as_str(), "/static/ui");
    }

    #[test]
    fn test_strip_root() {
        let prefix = MountPrefix::new("/");
        assert_eq!(prefix.strip("/"), "/");
        assert_eq!(prefix.strip("/assets/style.css"), "/assets/style.css");
        assert_eq!(prefix.strip(""), "/");
        assert_eq!(prefix.strip("assets"), "/assets");
    }

    #[test]
    fn test_strip_sub_path() {
        let prefix = MountPrefix::new("/static/ui/");
        assert_eq!(prefix.strip("/static/ui/"), "/");
        assert_eq!(prefix.strip("/static/ui"), "/");
        assert_eq!(prefix.strip("/static/ui/assets"), "/assets");
        assert_eq!(prefix.strip("/static/ui/assets/"), "/assets/");
    }

    #[test]
    fn test_strip_mismatch() {
        let prefix = MountPrefix::new("/static/ui/");
        assert_eq!(prefix.strip("/other/page"), "/");
        assert_eq!(prefix.strip("/static/uix/page"), "/");
        assert_eq!(prefix.strip("/static"), "/");
    }

    #[test]
    fn test_display() {
        assert_eq!(MountPrefix::new("").to_string(), "/");
        assert_eq!(MountPrefix::new("/static/ui/").to_string(), "/static/ui");
    }
}
