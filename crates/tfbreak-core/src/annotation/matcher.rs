//! Binds annotations to findings.

use super::blocks::{AnnotationIndex, BlockIndex};
use super::{Annotation, AnnotationScope};
use crate::model::Finding;

/// Find the annotation that suppresses `finding`, if any.
///
/// The finding is located by its new location, else its old one. File-scoped
/// annotations of that file win first. A block-scoped annotation matches when
/// it sits on the line before the finding, or on the line before the start of
/// the top-level block containing the finding. The returned copy has
/// `governs_line` set; the inputs are not modified.
pub fn find_match(
    finding: &Finding,
    annotations: &AnnotationIndex,
    blocks: &BlockIndex,
) -> Option<Annotation> {
    let location = finding.primary_location()?;
    let candidates = annotations.for_file(&location.filename);
    let applies = |a: &&Annotation| a.target.matches(&finding.rule_id);

    if let Some(file_scoped) = candidates
        .iter()
        .filter(|a| a.scope == AnnotationScope::File)
        .find(applies)
    {
        return Some(file_scoped.clone());
    }

    let block = blocks.containing_block(&location.filename, location.line);
    let governs = block.map_or(location.line, |b| b.start_line);

    candidates
        .iter()
        .filter(|a| a.scope == AnnotationScope::Block)
        .filter(applies)
        .find(|a| {
            a.line + 1 == location.line || block.is_some_and(|b| a.line + 1 == b.start_line)
        })
        .map(|a| Annotation {
            governs_line: Some(governs),
            ..a.clone()
        })
}
