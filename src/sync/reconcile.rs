//! Filename-only reconciliation between the sync directory and the album.
//!
//! A local file counts as present when any album item carries the same base
//! filename. Content, size and modification time are never compared, so a
//! renamed file is uploaded again and two different files sharing a name in
//! separate subdirectories map to the same album entry.

use std::collections::HashSet;

use super::local::LocalFile;

/// Select the local files whose base filename is absent from `remote`.
///
/// Each filename appears at most once in the result. When several local
/// files share a name, the first in `local` order is kept and the rest are
/// dropped with a debug log.
pub fn files_to_upload(local: &[LocalFile], remote: &HashSet<String>) -> Vec<LocalFile> {
    let mut selected_names: HashSet<&str> = HashSet::new();
    let mut selected = Vec::new();

    for file in local {
        if remote.contains(&file.name) {
            continue;
        }
        if !selected_names.insert(file.name.as_str()) {
            tracing::debug!(
                "Not uploading {}: another file named '{}' is already queued",
                file.path.display(),
                file.name
            );
            continue;
        }
        selected.push(file.clone());
    }

    selected
}

/// Number of local files whose name is already in the album.
pub fn already_present(local: &[LocalFile], remote: &HashSet<String>) -> usize {
    local.iter().filter(|f| remote.contains(&f.name)).count()
}
