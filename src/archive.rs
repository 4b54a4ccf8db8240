// src/archive.rs

use crate::error::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::{Path, PathBuf};
use tar::Builder;

/// Build a gzip-compressed tar archive of the selected files, fully
/// buffered in memory.
///
/// Explicit `files` are added first, in the order given, at their given
/// path; directories recurse. Each glob pattern is then evaluated relative
/// to `root` and every match is added under its bare file name. The same
/// file reached both ways appears twice; nothing deduplicates.
///
/// Entry naming is a compatibility contract with the remote system: when
/// `root` is the current directory entries carry no prefix, otherwise every
/// entry is stored under the literal `root` string so that unpacking the
/// archive reproduces the subdirectory layout.
pub fn build(root: &Path, globs: &[String], files: &[PathBuf]) -> Result<Vec<u8>> {
    let prefix = if root == Path::new(".") {
        PathBuf::new()
    } else {
        root.to_path_buf()
    };

    let root = root
        .canonicalize()
        .map_err(|_| Error::MissingSource(root.to_path_buf()))?;

    let mut tar = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    for file in files {
        let src = root.join(file);
        if !src.exists() {
            return Err(Error::MissingSource(src));
        }
        append(&mut tar, &src, &prefix.join(file))?;
    }

    for pattern in globs {
        let full = root.join(pattern);
        let matches =
            glob::glob(&full.to_string_lossy()).map_err(|source| Error::BadPattern {
                pattern: pattern.clone(),
                source,
            })?;

        for entry in matches {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            let Some(name) = path.file_name() else {
                continue;
            };
            append(&mut tar, &path, &prefix.join(name))?;
        }
    }

    let encoder = tar.into_inner()?;
    Ok(encoder.finish()?)
}

fn append(tar: &mut Builder<GzEncoder<Vec<u8>>>, src: &Path, dest: &Path) -> Result<()> {
    if src.is_dir() {
        tar.append_dir_all(dest, src)?;
    } else {
        tar.append_path_with_name(src, dest)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    /// Entry names with any trailing directory slash trimmed.
    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                e.unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .trim_end_matches('/')
                    .to_string()
            })
            .collect()
    }

    #[test]
    #[serial]
    fn current_dir_root_stores_bare_names() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.tf"), "resource {}").unwrap();
        fs::write(tmp.path().join("vars.auto.tfvars"), "x = 1").unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        let bytes = build(Path::new("."), &["*.tf".to_string()], &[]).unwrap();

        assert_eq!(entry_names(&bytes), vec!["main.tf"]);
    }

    #[test]
    #[serial]
    fn subdirectory_root_prefixes_every_entry() {
        let tmp = TempDir::new().unwrap();
        let infra = tmp.path().join("infra");
        fs::create_dir_all(infra.join("modules")).unwrap();
        fs::write(infra.join("a.tf"), "a").unwrap();
        fs::write(infra.join("modules").join("mod.tf"), "m").unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        let bytes = build(
            Path::new("infra"),
            &["*.tf".to_string()],
            &[PathBuf::from("modules")],
        )
        .unwrap();

        let names = entry_names(&bytes);
        assert!(names.iter().all(|n| n.starts_with("infra/") || n == "infra"));
        assert!(names.contains(&"infra/modules".to_string()));
        assert!(names.contains(&"infra/modules/mod.tf".to_string()));
        assert!(names.contains(&"infra/a.tf".to_string()));
    }

    #[test]
    #[serial]
    fn explicit_files_come_before_glob_matches() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.tf"), "a").unwrap();
        fs::write(tmp.path().join("extra.json"), "{}").unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        let bytes = build(
            Path::new("."),
            &["*.tf".to_string()],
            &[PathBuf::from("extra.json")],
        )
        .unwrap();

        assert_eq!(entry_names(&bytes), vec!["extra.json", "main.tf"]);
    }

    #[test]
    #[serial]
    fn file_matched_twice_appears_twice() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.tf"), "a").unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        let bytes = build(
            Path::new("."),
            &["*.tf".to_string()],
            &[PathBuf::from("main.tf")],
        )
        .unwrap();

        assert_eq!(entry_names(&bytes), vec!["main.tf", "main.tf"]);
    }

    #[test]
    #[serial]
    fn unmatched_glob_is_silently_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.tf"), "a").unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        let bytes = build(
            Path::new("."),
            &["*.tf".to_string(), "*.nomatch".to_string()],
            &[],
        )
        .unwrap();

        assert_eq!(entry_names(&bytes), vec!["main.tf"]);
    }

    #[test]
    #[serial]
    fn missing_explicit_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        let err = build(Path::new("."), &[], &[PathBuf::from("absent.tf")]).unwrap_err();

        assert!(matches!(err, Error::MissingSource(_)));
    }

    #[test]
    #[serial]
    fn malformed_pattern_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        let err = build(Path::new("."), &["[".to_string()], &[]).unwrap_err();

        assert!(matches!(err, Error::BadPattern { .. }));
    }
}
