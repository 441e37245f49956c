use glob::Pattern;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::report::{ScanIssue, ScanStage};
use crate::config::ScannerConfig;

/// Walks one customer folder and yields candidate certificate files.
///
/// Unreadable entries come back as [`ScanIssue`]s instead of aborting the
/// walk.
pub struct Walker {
    root: PathBuf,
    extensions: HashSet<String>,
    ignore_patterns: Vec<Pattern>,
    skip_hidden: bool,
    follow_links: bool,
    required_keywords: Option<Vec<String>>,
}

impl Walker {
    /// Create a new Walker with the given root directory and configuration
    pub fn new(root: PathBuf, config: &ScannerConfig) -> Self {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid ignore pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        let required_keywords = config.require_certificate_keyword.then(|| {
            config
                .certificate_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect()
        });

        Self {
            root,
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            ignore_patterns,
            skip_hidden: config.skip_hidden,
            follow_links: config.follow_links,
            required_keywords,
        }
    }

    /// Walk the folder, sorted by file name for reproducible ordering.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanIssue>> + '_ {
        let mut builder = WalkBuilder::new(&self.root);

        // Holdings folders are not source trees; no ignore files apply.
        builder.standard_filters(false);
        builder.hidden(self.skip_hidden);
        builder.follow_links(self.follow_links);
        builder.sort_by_file_name(|a, b| a.cmp(b));

        builder.build().filter_map(move |entry| match entry {
            Ok(entry) => {
                let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
                if is_file && self.accepts(entry.path()) {
                    Some(Ok(entry.into_path()))
                } else {
                    None
                }
            }
            Err(err) => {
                let path = error_path(&err).unwrap_or_else(|| self.root.clone());
                Some(Err(ScanIssue::new(path, ScanStage::Walk, err)))
            }
        })
    }

    /// Collect all accepted files, dropping issues
    pub fn collect_files(&self) -> Vec<PathBuf> {
        self.walk().filter_map(Result::ok).collect()
    }

    fn accepts(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false);
        if !has_extension {
            return false;
        }

        let file_name = match path.file_name().and_then(OsStr::to_str) {
            Some(name) => name,
            // Non-UTF-8 names are kept so the scanner can report them.
            None => return true,
        };

        if self.ignore_patterns.iter().any(|p| p.matches(file_name)) {
            return false;
        }

        match &self.required_keywords {
            Some(keywords) => {
                let lowered = file_name.to_lowercase();
                keywords.iter().any(|k| lowered.contains(k.as_str()))
            }
            None => true,
        }
    }
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
