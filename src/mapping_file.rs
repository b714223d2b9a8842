//! Mapping documents on disk.
//!
//! The engine only sees readers and writers; this module owns paths. Saves
//! go to a temporary file in the destination directory that is then renamed
//! over the target, so a failed write never leaves a half-written mapping.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use field_mapper_core::{FieldHooks, MappingTable};

/// Loads a mapping file. A missing file yields an empty table.
pub fn open_mapping<H: FieldHooks>(path: &Path, hooks: H) -> Result<MappingTable<H>> {
    let mut table = MappingTable::new(hooks);
    if !path.exists() {
        return Ok(table);
    }
    reload_mapping(path, &mut table)?;
    Ok(table)
}

/// Reloads a table from disk. On failure the table keeps its contents.
pub fn reload_mapping<H: FieldHooks>(path: &Path, table: &mut MappingTable<H>) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open mapping file: {}", path.display()))?;
    table
        .load(BufReader::new(file))
        .with_context(|| format!("Failed to load mapping file: {}", path.display()))
}

/// Atomically replaces `path` with the table's document.
///
/// An existing file keeps its permissions.
pub fn save_mapping<H: FieldHooks>(path: &Path, table: &MappingTable<H>) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create mapping directory: {}", dir.display()))?;

    let tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        table
            .write(&mut writer)
            .with_context(|| format!("Failed to write mapping for {}", path.display()))?;
        writer.flush()?;
    }
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace mapping file: {}", path.display()))?;
    Ok(())
}

/// Writes an empty `<map/>` document unless `path` already exists.
///
/// Returns `false` when the file was already there.
pub fn init_mapping<H: FieldHooks>(path: &Path, hooks: H) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_mapping(path, &MappingTable::new(hooks))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector_rest::{RestHooks, RestTarget};
    use field_mapper_core::{ExactField, Link};
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_an_empty_table() {
        let tmp = TempDir::new().unwrap();
        let table = open_mapping(&tmp.path().join("none.xml"), RestHooks::new()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn save_then_open_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("maps").join("products.xml");

        let mut table = MappingTable::new(RestHooks::new());
        table.add(Link::new(
            ExactField::new("url"),
            RestTarget::new("content_url").crawl_url(),
        ));
        table.add(Link::new(ExactField::new("title"), RestTarget::new("doc_title")));
        save_mapping(&path, &table).unwrap();

        let reopened = open_mapping(&path, RestHooks::new()).unwrap();
        let targets: Vec<_> = reopened.iter().map(|l| l.target().clone()).collect();
        assert_eq!(
            targets,
            vec![
                RestTarget::new("content_url").crawl_url(),
                RestTarget::new("doc_title")
            ]
        );
    }

    #[test]
    fn invalid_file_reports_path_and_keeps_table() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.xml");
        let bad = tmp.path().join("bad.xml");
        std::fs::write(
            &good,
            r#"<map><link source="a"><target name="b"/></link></map>"#,
        )
        .unwrap();
        std::fs::write(&bad, r#"<map><link><target name="b"/></link></map>"#).unwrap();

        let mut table = open_mapping(&good, RestHooks::new()).unwrap();
        let err = reload_mapping(&bad, &mut table).unwrap_err();
        assert!(format!("{:#}", err).contains("bad.xml"));
        assert_eq!(table.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shared.xml");
        std::fs::write(
            &path,
            r#"<map><link source="a"><target name="b"/></link></map>"#,
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut table = open_mapping(&path, RestHooks::new()).unwrap();
        table.add(Link::new(ExactField::new("title"), RestTarget::new("doc_title")));
        save_mapping(&path, &table).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(open_mapping(&path, RestHooks::new()).unwrap().len(), 2);
    }

    #[test]
    fn init_does_not_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("m.xml");
        assert!(init_mapping(&path, RestHooks::new()).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("<map/>"));

        std::fs::write(
            &path,
            r#"<map><link source="a"><target name="b"/></link></map>"#,
        )
        .unwrap();
        assert!(!init_mapping(&path, RestHooks::new()).unwrap());
        assert_eq!(open_mapping(&path, RestHooks::new()).unwrap().len(), 1);
    }
}
