use std::path::{Path, PathBuf};

/// Write `content` at `path`, creating parent directories as needed.
pub fn write_file(path: PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("failed to create directory {:?}: {}", parent, e));
    }
    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("failed to write file {:?}: {}", path, e));
}

pub fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read file {:?}: {}", path, e))
}
