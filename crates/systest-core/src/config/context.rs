//! Loading contexts: the resource search paths a `Config` is built for

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the implicit resource search path
pub const RESOURCE_PATH_ENV: &str = "SYSTEST_RESOURCE_PATH";

/// Ordered list of resource roots
///
/// Two contexts with the same roots in the same order are the same
/// context, and share one cached `Config`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadingContext {
    roots: Vec<PathBuf>,
}

impl LoadingContext {
    /// Create a context searching `roots` in order
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Context with no resource roots; only non-resource sources apply
    pub fn empty() -> Self {
        Self { roots: Vec::new() }
    }

    /// The implicit context of the calling process
    ///
    /// Uses `SYSTEST_RESOURCE_PATH` when set (platform path-list syntax).
    /// Otherwise searches `tests/resources` then `resources` below
    /// `CARGO_MANIFEST_DIR`, falling back to the current directory.
    pub fn current() -> Self {
        if let Some(paths) = env::var_os(RESOURCE_PATH_ENV) {
            let roots: Vec<PathBuf> = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !roots.is_empty() {
                return Self { roots };
            }
        }

        let base = env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::for_base_dir(base)
    }

    /// Conventional roots below a project directory
    pub fn for_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self::new([base.join("tests").join("resources"), base.join("resources")])
    }

    /// Resource roots in search order
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every existing-or-not candidate path for a resource name
    pub fn resource_candidates(&self, name: &str) -> Vec<PathBuf> {
        self.roots.iter().map(|root| root.join(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_context_identity() {
        let a = LoadingContext::new(["/a", "/b"]);
        let b = LoadingContext::new([PathBuf::from("/a"), PathBuf::from("/b")]);
        let c = LoadingContext::new(["/b", "/a"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(LoadingContext::empty().roots().is_empty());
    }

    #[test]
    fn test_resource_candidates() {
        let ctx = LoadingContext::new(["/x", "/y"]);
        assert_eq!(
            ctx.resource_candidates("META-INF/test-config.properties"),
            vec![
                PathBuf::from("/x/META-INF/test-config.properties"),
                PathBuf::from("/y/META-INF/test-config.properties"),
            ]
        );
    }

    #[test]
    fn test_for_base_dir() {
        let ctx = LoadingContext::for_base_dir("/project");
        assert_eq!(
            ctx.roots(),
            &[PathBuf::from("/project/tests/resources"), PathBuf::from("/project/resources")]
        );
    }

    #[test]
    #[serial]
    fn test_current_honours_env_override() {
        let joined = env::join_paths(["/one", "/two"]).unwrap();
        env::set_var(RESOURCE_PATH_ENV, &joined);

        let ctx = LoadingContext::current();
        assert_eq!(ctx.roots(), &[PathBuf::from("/one"), PathBuf::from("/two")]);

        env::remove_var(RESOURCE_PATH_ENV);
        let fallback = LoadingContext::current();
        assert_eq!(fallback.roots().len(), 2);
        assert!(fallback.roots()[0].ends_with("tests/resources"));
    }
}
