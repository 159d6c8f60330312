use std::{fs, io, path::Path};

/// Total byte size of all regular files below `path`.
///
/// Symlinked directories are not followed and there is no cycle protection;
/// a file disappearing mid-walk propagates the underlying error.
pub fn folder_size(path: &Path) -> io::Result<u64> {
    let mut total_size = 0;

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            total_size += folder_size(&entry.path())?;
        } else if file_type.is_file() {
            total_size += entry.metadata()?.len();
        }
    }

    Ok(total_size)
}
