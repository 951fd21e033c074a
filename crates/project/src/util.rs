use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes through a sibling `<name>.tmp` file, then renames it over `path`.
/// 先寫入同目錄的 `<檔名>.tmp`，再以 rename 取代目標檔案。
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = sibling_tmp_path(path);
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
