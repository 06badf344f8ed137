// src/recipe/patch.rs

//! Source edits applied to the fetched connector tree before building
//!
//! Edits are plain find/replace pairs. Every edit must find its anchor: an
//! upstream change that removes the anchor fails the build instead of
//! silently producing a different library.

use crate::error::{Error, Result};
use crate::options::OptionSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build script edited by the plan, relative to the source root
pub const BUILD_SCRIPT: &str = "CMakeLists.txt";

/// Line after which dependency headers are injected
pub const INCLUDE_ANCHOR: &str = "INCLUDE(SetValueMacro)";

/// Library declaration the static rewrite looks for
pub const SHARED_LIBRARY_DECL: &str = "${LIBRARY_NAME} SHARED";

/// Replacement for [`SHARED_LIBRARY_DECL`] in static builds
pub const STATIC_LIBRARY_DECL: &str = "${LIBRARY_NAME} STATIC";

/// One find/replace edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEdit {
    /// File to edit, relative to the source root
    pub file: PathBuf,
    pub find: String,
    pub replace: String,
}

impl SourceEdit {
    pub fn new(
        file: impl Into<PathBuf>,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// Ordered list of edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchPlan {
    edits: Vec<SourceEdit>,
}

impl PatchPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: SourceEdit) {
        self.edits.push(edit);
    }

    pub fn edits(&self) -> &[SourceEdit] {
        &self.edits
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Whether the plan turns the shared library declaration into a static one
    pub fn rewrites_to_static(&self) -> bool {
        self.edits
            .iter()
            .any(|e| e.find == SHARED_LIBRARY_DECL && e.replace == STATIC_LIBRARY_DECL)
    }

    /// Apply every edit under `source_root`
    ///
    /// All edits are checked in memory before anything is written, so a
    /// missing anchor leaves every file untouched. Each edit replaces all
    /// occurrences of its anchor.
    pub fn apply(&self, source_root: &Path) -> Result<()> {
        let mut pending: Vec<(PathBuf, String)> = Vec::new();

        for edit in &self.edits {
            let path = source_root.join(&edit.file);
            let index = match pending.iter().position(|(p, _)| *p == path) {
                Some(index) => index,
                None => {
                    let content = fs::read_to_string(&path).map_err(|e| {
                        Error::IoError(format!("Failed to read {}: {}", path.display(), e))
                    })?;
                    pending.push((path.clone(), content));
                    pending.len() - 1
                }
            };

            let content = &mut pending[index].1;
            if !content.contains(&edit.find) {
                return Err(Error::PatchAnchorNotFound {
                    file: path,
                    anchor: edit.find.clone(),
                });
            }
            *content = content.replace(&edit.find, &edit.replace);
            debug!("Patched {}: '{}'", path.display(), edit.find);
        }

        for (path, content) in &pending {
            fs::write(path, content).map_err(|e| {
                Error::IoError(format!("Failed to write {}: {}", path.display(), e))
            })?;
        }

        info!("Applied {} source edit(s)", self.edits.len());
        Ok(())
    }
}

/// Edits needed before the connector can build against packaged dependencies
///
/// The client headers of the packaged connector dependency are injected
/// right after [`INCLUDE_ANCHOR`] so they win over system-installed ones.
/// Static builds also rewrite the library declaration, because upstream
/// always declares a shared library and the static link then fails with
/// `library 'mariadbclient' not found`.
pub fn patch_plan(options: &OptionSet, dependency_include_dir: &Path) -> PatchPlan {
    let include_dir = dependency_include_dir.to_string_lossy().replace('\\', "/");
    let mut plan = PatchPlan::new();

    plan.push(SourceEdit::new(
        BUILD_SCRIPT,
        INCLUDE_ANCHOR,
        format!("{}\nINCLUDE_DIRECTORIES({}/mariadb)", INCLUDE_ANCHOR, include_dir),
    ));

    if !options.shared {
        plan.push(SourceEdit::new(
            BUILD_SCRIPT,
            SHARED_LIBRARY_DECL,
            STATIC_LIBRARY_DECL,
        ));
    }

    plan
}
