//! Directory scan that builds annotation and block indexes from `*.tf` files.

use super::blocks::{AnnotationIndex, BlockIndex};
use super::parser::AnnotationParser;
use crate::errors::{Result, TfbreakError};
use crate::{log_op_end, log_op_error, log_op_start};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Parse every `*.tf` file directly inside `dir`, in file-name order.
///
/// Files are keyed by file name, matching the relative filenames loaders put
/// in snapshot locations.
///
/// # Errors
///
/// Returns `Io` if the directory or a file cannot be read, and
/// `SourceStructure` for the first file that cannot be lexed.
pub fn load_annotations(
    dir: &Path,
    parser: &AnnotationParser,
) -> Result<(AnnotationIndex, BlockIndex)> {
    let start = Instant::now();
    log_op_start!("load_annotations", dir = %dir.display());

    match load_inner(dir, parser) {
        Ok((annotations, blocks)) => {
            log_op_end!(
                "load_annotations",
                duration_ms = start.elapsed().as_millis() as u64,
                annotation_count = annotations.len()
            );
            Ok((annotations, blocks))
        }
        Err(err) => {
            log_op_error!(
                "load_annotations",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

fn load_inner(dir: &Path, parser: &AnnotationParser) -> Result<(AnnotationIndex, BlockIndex)> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| TfbreakError::io(dir, e))? {
        let path = entry.map_err(|e| TfbreakError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "tf") {
            files.push(path);
        }
    }
    files.sort();

    let mut annotations = AnnotationIndex::new();
    let mut blocks = BlockIndex::new();
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = std::fs::read_to_string(&path).map_err(|e| TfbreakError::io(&path, e))?;
        let parsed = parser.parse_source(&name, &source)?;
        annotations.insert(name.clone(), parsed.annotations);
        blocks.insert(name, parsed.blocks);
    }
    Ok((annotations, blocks))
}
