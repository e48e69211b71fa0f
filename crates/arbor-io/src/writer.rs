//! JSON writer for induced trees.

use std::fs;
use std::path::{Path, PathBuf};

use arbor_tree::TreeNode;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Writes a tree as pretty-printed JSON in the `type`/`subtrees` wire shape.
///
/// Creates the parent directory on construction if it does not exist.
pub struct TreeWriter {
    path: PathBuf,
}

impl TreeWriter {
    /// Create a new writer targeting `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the parent directory cannot be created.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn new(path: &Path) -> Result<Self, IoError> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| IoError::OutputDirCreate {
                path: dir.to_path_buf(),
                source: e,
            })?;
            debug!("output directory ready");
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Write `tree` to the target path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SerializeTree`] | JSON encoding failed |
    /// | [`IoError::WriteFile`] | File write failed |
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn write(&self, tree: &TreeNode) -> Result<(), IoError> {
        let json =
            serde_json::to_string_pretty(tree).map_err(|e| IoError::SerializeTree { source: e })?;
        fs::write(&self.path, &json).map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        info!(
            size_bytes = json.len(),
            n_nodes = tree.n_nodes(),
            "tree written"
        );
        Ok(())
    }
}
