//! Per-file indexes over annotations and block extents.

use super::lexer::BlockExtent;
use super::Annotation;
use std::collections::BTreeMap;

/// Block extents by file, sorted by start line for binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockIndex {
    by_file: BTreeMap<String, Vec<BlockExtent>>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: impl Into<String>, mut blocks: Vec<BlockExtent>) {
        blocks.sort_by_key(|b| b.start_line);
        self.by_file.insert(file.into(), blocks);
    }

    pub fn blocks(&self, file: &str) -> &[BlockExtent] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or_default()
    }

    /// The top-level block of `file` whose extent covers `line`.
    ///
    /// Picks the last block starting at or before `line` and checks it ends at or after it.
    pub fn containing_block(&self, file: &str, line: usize) -> Option<&BlockExtent> {
        let blocks = self.blocks(file);
        let idx = blocks.partition_point(|b| b.start_line <= line);
        let candidate = blocks.get(idx.checked_sub(1)?)?;
        (candidate.end_line >= line).then_some(candidate)
    }
}

/// Annotations by file, in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationIndex {
    by_file: BTreeMap<String, Vec<Annotation>>,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: impl Into<String>, mut annotations: Vec<Annotation>) {
        annotations.sort_by_key(|a| a.line);
        self.by_file.insert(file.into(), annotations);
    }

    pub fn for_file(&self, file: &str) -> &[Annotation] {
        self.by_file
            .get(file)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.by_file.values().flatten()
    }
}
