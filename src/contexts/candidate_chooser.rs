use std::path::PathBuf;

use super::interaction::{PickItem, UserInteraction};
use crate::data::TestFileCandidate;

/// Narrows search hits down to the one file to open.
///
/// * no candidate: `None`
/// * one candidate: its path, without asking
/// * several: the user picks by file name, with the full path as detail
pub fn choose<U: UserInteraction>(candidates: &[TestFileCandidate], picker: &U) -> Option<PathBuf> {
    match candidates {
        [] => None,
        [only] => Some(only.path.clone()),
        many => {
            let items: Vec<PickItem> = many
                .iter()
                .map(|candidate| PickItem {
                    label: candidate.display_name.clone(),
                    detail: candidate.path.display().to_string(),
                })
                .collect();

            // Index back into the candidates; the detail text may be lossy
            picker
                .pick(&items)
                .and_then(|index| many.get(index))
                .map(|candidate| candidate.path.clone())
        }
    }
}
