//! Folder entries shown as zone cells

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of a folder entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One immediate child of a zone's source folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub display_name: String,
    pub kind: EntryKind,
    /// Size in bytes for files, None for directories
    pub size_bytes: Option<u64>,
}

impl ZoneEntry {
    pub fn new(path: PathBuf, kind: EntryKind, size_bytes: Option<u64>) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let display_name = display_name_for(&file_name);
        Self {
            path,
            file_name,
            display_name,
            kind,
            size_bytes,
        }
    }

    /// Cell label elided to fit a cell of `cell_size` pixels
    pub fn label(&self, cell_size: i32) -> String {
        elide_label(&self.display_name, label_capacity(cell_size))
    }

    /// Hover text: file name, plus the size for files
    pub fn tooltip(&self) -> String {
        match (self.kind, self.size_bytes) {
            (EntryKind::File, Some(size)) => format!("{}\n{}", self.file_name, human_size(size)),
            _ => self.file_name.clone(),
        }
    }

    /// Case-insensitive substring match on the display name
    ///
    /// An empty or blank query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.display_name.to_lowercase().contains(&query)
    }
}

/// Lists the immediate entries of a folder, sorted case-insensitively
///
/// Entries whose metadata cannot be read are skipped.
pub fn enumerate_folder(folder: &Path) -> io::Result<Vec<ZoneEntry>> {
    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(folder)? {
        let dir_entry = match dir_entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("Skipping unreadable entry in {}: {err}", folder.display());
                continue;
            }
        };
        let metadata = match dir_entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                log::debug!("Skipping {}: {err}", dir_entry.path().display());
                continue;
            }
        };

        let entry = if metadata.is_dir() {
            ZoneEntry::new(dir_entry.path(), EntryKind::Directory, None)
        } else {
            ZoneEntry::new(dir_entry.path(), EntryKind::File, Some(metadata.len()))
        };
        entries.push(entry);
    }

    entries.sort_by_cached_key(|entry| entry.file_name.to_lowercase());
    Ok(entries)
}

/// Name shown for a file: shortcut extensions are hidden
pub fn display_name_for(file_name: &str) -> String {
    for extension in [".lnk", ".url"] {
        let Some(split) = file_name.len().checked_sub(extension.len()) else {
            continue;
        };
        if split > 0
            && file_name
                .get(split..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(extension))
        {
            return file_name[..split].to_string();
        }
    }
    file_name.to_string()
}

/// Characters that fit under a cell of `cell_size` pixels
pub fn label_capacity(cell_size: i32) -> usize {
    (cell_size / 7).max(6) as usize
}

/// Shortens `name` to `max_chars` characters, ending with `...` when cut
pub fn elide_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let kept: String = name.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Formats a byte count with one decimal in the largest fitting unit
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn shortcut_extensions_are_hidden() {
        assert_eq!(display_name_for("Editor.lnk"), "Editor");
        assert_eq!(display_name_for("Docs.URL"), "Docs");
        assert_eq!(display_name_for("notes.txt"), "notes.txt");
        assert_eq!(display_name_for(".lnk"), ".lnk");
    }

    #[test]
    fn labels_are_elided_to_cell_capacity() {
        assert_eq!(label_capacity(64), 9);
        assert_eq!(label_capacity(20), 6);
        assert_eq!(elide_label("report.pdf", 9), "report...");
        assert_eq!(elide_label("short", 9), "short");
        assert_eq!(elide_label("ünïcödé-name", 6), "ünï...");
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(512), "512.0 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024 * 1024 * 1024), "3072.0 TB");
    }

    #[test]
    fn tooltip_includes_size_for_files() {
        let file = ZoneEntry::new(PathBuf::from("/tmp/a.bin"), EntryKind::File, Some(2048));
        assert_eq!(file.tooltip(), "a.bin\n2.0 KB");
        let dir = ZoneEntry::new(PathBuf::from("/tmp/photos"), EntryKind::Directory, None);
        assert_eq!(dir.tooltip(), "photos");
    }

    #[test]
    fn search_matching() {
        let entry = ZoneEntry::new(PathBuf::from("/x/Project Plan.lnk"), EntryKind::File, Some(1));
        assert!(entry.matches(""));
        assert!(entry.matches("  plan "));
        assert!(!entry.matches("lnk"));
    }

    #[test]
    fn enumerates_sorted_entries() {
        let scratch = TempDir::new().unwrap();
        let folder = scratch.path();
        fs::write(folder.join("beta.txt"), b"12345").unwrap();
        fs::write(folder.join("Alpha.lnk"), b"").unwrap();
        fs::create_dir(folder.join("gamma")).unwrap();

        let entries = enumerate_folder(folder).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta.txt", "gamma"]);
        assert_eq!(entries[1].size_bytes, Some(5));
        assert_eq!(entries[2].kind, EntryKind::Directory);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let scratch = TempDir::new().unwrap();
        assert!(enumerate_folder(&scratch.path().join("nope")).is_err());
    }
}
