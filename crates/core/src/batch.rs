//! Batch driver: compile every schema file under one or more roots into a
//! single descriptor set.
//!
//! Roots are processed in the order given and files within a directory in
//! lexicographic path order, strictly one at a time. A directory root names
//! its files by their path relative to the root (`sub/a.proto`); a file
//! root is named by its file name. Imports resolve against the root
//! directory first, then against `Config::include_paths`.

use crate::config::{BatchMode, Config};
use crate::error::DescError;
use crate::pass3_imports;
use crate::source::{relative_name, FileSystemProvider, IncludePathResolver, SourceProvider};
use protodesc_descriptor::DescriptorSet;
use std::path::{Path, PathBuf};

/// Result of a batch run. `errors` is only ever non-empty in
/// [`BatchMode::BestEffort`].
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub set: DescriptorSet,
    pub errors: Vec<DescError>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compile all roots from the filesystem with the default configuration,
/// stopping at the first error.
pub fn parse_all<P: AsRef<Path>>(paths: &[P]) -> Result<DescriptorSet, DescError> {
    let report = parse_all_with(paths, &FileSystemProvider, &Config::default())?;
    Ok(report.set)
}

/// Compile all roots through `provider`.
///
/// In [`BatchMode::FailFast`] the first error is returned and nothing else.
/// In [`BatchMode::BestEffort`] a failing file contributes nothing (not
/// even the imports it pulled in) and its error is collected; collection
/// stops once `max_errors` is reached. An invalid `config` is a
/// [`DescError::Config`] before any root is read.
pub fn parse_all_with<P: AsRef<Path>>(
    paths: &[P],
    provider: &dyn SourceProvider,
    config: &Config,
) -> Result<BatchReport, DescError> {
    config.validate()?;
    let mut driver = Driver {
        provider,
        config,
        report: BatchReport::default(),
    };
    for root in paths {
        if driver.limit_reached() {
            break;
        }
        let root = root.as_ref();
        if let Err(e) = driver.run_root(root) {
            driver.fail(e)?;
        }
    }
    Ok(driver.report)
}

struct Driver<'a> {
    provider: &'a dyn SourceProvider,
    config: &'a Config,
    report: BatchReport,
}

impl Driver<'_> {
    /// Record `err` in best-effort mode, or hand it back in fail-fast mode.
    fn fail(&mut self, err: DescError) -> Result<(), DescError> {
        match self.config.batch_mode {
            BatchMode::FailFast => Err(err),
            BatchMode::BestEffort => {
                tracing::warn!(error = %err, "skipping file");
                self.report.errors.push(err);
                Ok(())
            }
        }
    }

    fn limit_reached(&self) -> bool {
        self.config.batch_mode == BatchMode::BestEffort
            && self.report.errors.len() >= self.config.max_errors
    }

    fn run_root(&mut self, root: &Path) -> Result<(), DescError> {
        if !self.provider.exists(root) {
            return Err(DescError::io(root.display(), "input path does not exist"));
        }

        if self.provider.is_dir(root) {
            let files: Vec<PathBuf> = self
                .provider
                .list(root)
                .map_err(|e| DescError::io(root.display(), e))?
                .into_iter()
                .filter(|p| self.config.matches_extension(p))
                .collect();
            tracing::debug!(root = %root.display(), files = files.len(), "scanned directory");
            for file in files {
                if self.limit_reached() {
                    break;
                }
                let name = relative_name(root, &file);
                if let Err(e) = self.run_file(&name, &file, root) {
                    self.fail(e)?;
                }
            }
            return Ok(());
        }

        if !self.config.matches_extension(root) {
            return Err(DescError::io(
                root.display(),
                format!("not a .{} file", self.config.extension),
            ));
        }
        let name = root
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let base = root.parent().unwrap_or(Path::new("."));
        self.run_file(&name, root, base)
    }

    fn run_file(&mut self, name: &str, path: &Path, base: &Path) -> Result<(), DescError> {
        if self.report.set.contains(name) {
            tracing::trace!(file = name, "already in descriptor set");
            return Ok(());
        }
        let bytes = self
            .provider
            .read(path)
            .map_err(|e| DescError::io(path.display(), e))?;

        let mut include_dirs = vec![base.to_path_buf()];
        include_dirs.extend(self.config.include_paths.iter().cloned());
        let resolver = IncludePathResolver::new(self.provider, include_dirs);

        match self.config.batch_mode {
            BatchMode::FailFast => pass3_imports::load_root(
                name,
                &bytes,
                &resolver,
                self.config.nesting,
                &mut self.report.set,
            ),
            BatchMode::BestEffort => {
                // New files land in `fresh` and are only merged on success,
                // so a failure leaves no trace of this file or its imports.
                let mut fresh = DescriptorSet::new();
                pass3_imports::load_root_over(
                    name,
                    &bytes,
                    &resolver,
                    self.config.nesting,
                    &self.report.set,
                    &mut fresh,
                )?;
                self.report.set.merge(fresh);
                Ok(())
            }
        }
    }
}
