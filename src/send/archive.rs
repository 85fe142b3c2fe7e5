use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;

/// Zip the contents of `source` (not the directory itself) into `archive_path`.
///
/// Nested directories get their own entries; symlinks and other special
/// files are skipped, as are entries that cannot be read.
pub fn zip_directory(source: &Path, archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create zip archive {}", archive_path.display()))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut file_count = 0usize;
    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry while archiving");
                continue;
            }
        };

        let rel = entry
            .path()
            .strip_prefix(source)
            .unwrap_or(entry.path());
        let entry_name = rel.to_string_lossy().replace('\\', "/");
        let file_type = entry.file_type();

        if file_type.is_dir() {
            writer
                .add_directory(format!("{entry_name}/"), options)
                .with_context(|| format!("Failed to add directory {entry_name} to zip"))?;
        } else if file_type.is_file() {
            let mut source_file = File::open(entry.path())
                .with_context(|| format!("Failed to open {}", entry.path().display()))?;
            let size = source_file.metadata().map(|m| m.len()).unwrap_or(0);
            writer
                .start_file(entry_name.as_str(), options.large_file(size >= u32::MAX as u64))
                .with_context(|| format!("Failed to start zip entry {entry_name}"))?;
            io::copy(&mut source_file, &mut writer)
                .with_context(|| format!("Failed to add {} to zip", entry.path().display()))?;
            file_count += 1;
        } else {
            tracing::debug!(path = %entry.path().display(), "skipping special file");
        }
    }

    writer.finish().context("Failed to finalize zip archive")?;
    tracing::debug!(
        source = %source.display(),
        files = file_count,
        "directory archived"
    );
    Ok(())
}

/// Returns `wanted`, or `stem-N.ext` if an earlier archive already took the name.
pub fn unique_archive_name(wanted: &str, names: &mut HashSet<String>) -> String {
    if names.insert(wanted.to_string()) {
        return wanted.to_string();
    }

    let path = Path::new(wanted);
    let stem = path
        .file_stem()
        .and_then(|x| x.to_str())
        .unwrap_or("dir");
    let ext = path.extension().and_then(|x| x.to_str());

    let mut idx = 2usize;
    loop {
        let candidate = match ext {
            Some(ext) if !ext.is_empty() => format!("{}-{}.{}", stem, idx, ext),
            _ => format!("{}-{}", stem, idx),
        };
        if names.insert(candidate.clone()) {
            return candidate;
        }
        idx += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn unique_names_get_numeric_suffix() {
        let mut names = HashSet::new();
        assert_eq!(unique_archive_name("docs.zip", &mut names), "docs.zip");
        assert_eq!(unique_archive_name("docs.zip", &mut names), "docs-2.zip");
        assert_eq!(unique_archive_name("docs.zip", &mut names), "docs-3.zip");
        assert_eq!(unique_archive_name("other.zip", &mut names), "other.zip");
    }

    #[test]
    fn zip_contains_relative_entries_without_root_folder() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), b"alpha").unwrap();
        std::fs::create_dir_all(src.path().join("nested/deeper")).unwrap();
        std::fs::write(src.path().join("nested/b.txt"), b"bravo").unwrap();

        let out = tempfile::tempdir().unwrap();
        let archive_path = out.path().join("src.zip");
        zip_directory(src.path(), &archive_path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"a.txt".to_string()));
        assert!(names.contains(&"nested/".to_string()));
        assert!(names.contains(&"nested/deeper/".to_string()));
        assert!(names.contains(&"nested/b.txt".to_string()));

        let mut contents = String::new();
        archive
            .by_name("nested/b.txt")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "bravo");
    }

    #[test]
    fn empty_directory_produces_valid_empty_archive() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let archive_path = out.path().join("empty.zip");

        zip_directory(src.path(), &archive_path).unwrap();

        let archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
