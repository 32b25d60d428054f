//! Environment capabilities the pipeline needs: reading bytes, listing
//! directories, and resolving import paths to content.
//!
//! [`SourceProvider`] is what the batch driver uses to walk roots;
//! [`ImportResolver`] is what the import pass calls for every `import`
//! statement. [`InMemoryProvider`] implements both for bundled schemas and
//! tests; [`FileSystemProvider`] and [`IncludePathResolver`] cover the disk.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// File access for the batch driver.
pub trait SourceProvider {
    /// Read the raw bytes of a file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// All files below `dir`, recursively, in lexicographic path order.
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn is_dir(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool;
}

/// Maps an import path (leading `/` already stripped) to file content.
///
/// Must be safe to call recursively: resolving one import may trigger
/// resolution of that file's own imports before the first call returns.
pub trait ImportResolver {
    fn resolve(&self, path: &str) -> io::Result<Vec<u8>>;
}

impl<F> ImportResolver for F
where
    F: Fn(&str) -> io::Result<Vec<u8>>,
{
    fn resolve(&self, path: &str) -> io::Result<Vec<u8>> {
        self(path)
    }
}

/// A resolver that never finds anything. For sources without imports.
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&self, path: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no import resolver configured for '{}'", path),
        ))
    }
}

/// Default filesystem-backed source provider.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(d) = pending.pop() {
            for entry in std::fs::read_dir(&d)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    out.push(path);
                }
            }
        }
        out.sort();
        Ok(out)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Resolves imports by trying each include directory in order through a
/// [`SourceProvider`]. The first directory containing the file wins.
pub struct IncludePathResolver<'a> {
    provider: &'a dyn SourceProvider,
    include_dirs: Vec<PathBuf>,
}

impl<'a> IncludePathResolver<'a> {
    pub fn new(provider: &'a dyn SourceProvider, include_dirs: Vec<PathBuf>) -> Self {
        Self {
            provider,
            include_dirs,
        }
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }
}

impl ImportResolver for IncludePathResolver<'_> {
    fn resolve(&self, path: &str) -> io::Result<Vec<u8>> {
        for dir in &self.include_dirs {
            // Keys that climb out of the include directory are never read.
            let Some(candidate) = join_within(dir, path) else {
                continue;
            };
            if self.provider.exists(&candidate) && !self.provider.is_dir(&candidate) {
                return self.provider.read(&candidate);
            }
        }
        let searched: Vec<String> = self
            .include_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not found in [{}]", searched.join(", ")),
        ))
    }
}

/// In-memory source provider: a bundled resource table mapping paths to
/// content. Also usable directly as an [`ImportResolver`], where import
/// paths are looked up as-is.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file. The path is normalized first.
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files
            .insert(normalize_path(path.as_ref()), content.into());
    }
}

impl SourceProvider for InMemoryProvider {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let normalized = normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found in memory: {}", normalized.display()),
            )
        })
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = normalize_path(dir);
        // BTreeMap keys are already in path order.
        Ok(self
            .files
            .keys()
            .filter(|k| k.starts_with(&dir) && **k != dir)
            .cloned()
            .collect())
    }

    fn is_dir(&self, path: &Path) -> bool {
        let normalized = normalize_path(path);
        !self.files.contains_key(&normalized)
            && self
                .files
                .keys()
                .any(|k| k.starts_with(&normalized) && *k != normalized)
    }

    fn exists(&self, path: &Path) -> bool {
        let normalized = normalize_path(path);
        self.files.contains_key(&normalized) || self.is_dir(&normalized)
    }
}

impl ImportResolver for InMemoryProvider {
    fn resolve(&self, path: &str) -> io::Result<Vec<u8>> {
        self.read(Path::new(path))
    }
}

/// Normalize a path by resolving `.` and `..` components without touching
/// the filesystem.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                // a relative path keeps its leading `..`
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }
    components.iter().collect()
}

/// `dir.join(path)`, normalized, or `None` when `path` is absolute or its
/// `..` segments lead outside `dir`.
fn join_within(dir: &Path, path: &str) -> Option<PathBuf> {
    let base = normalize_path(dir);
    let candidate = normalize_path(&base.join(path));
    let rest = candidate.strip_prefix(&base).ok()?;
    if rest.components().any(|c| c == Component::ParentDir) {
        return None;
    }
    Some(candidate)
}

/// Render `path` relative to `root` with `/` separators, the form used for
/// descriptor names.
pub(crate) fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
