//! Plain-text export of the cached characters, with a one-file backup.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::Character;

/// Write one line per character. Overwrites `path`.
pub fn export_characters(path: &Path, characters: &[Character]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let contents: String = characters
        .iter()
        .map(|c| format!("{}\n", c))
        .collect();
    fs::write(path, contents)
        .with_context(|| format!("Failed to write export file {}", path.display()))?;

    info!(path = %path.display(), count = characters.len(), "Exported characters");
    Ok(characters.len())
}

/// Copy an existing export aside. Returns false if there was nothing to back up.
pub fn backup_file(path: &Path, backup: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::copy(path, backup)
        .with_context(|| format!("Failed to back up {} to {}", path.display(), backup.display()))?;
    Ok(true)
}

/// Back up an export, then delete it. Returns false if there was no file.
/// The file is left in place if the backup cannot be written.
pub fn delete_with_backup(path: &Path, backup: &Path) -> Result<bool> {
    if !backup_file(path, backup)? {
        return Ok(false);
    }
    fs::remove_file(path)
        .with_context(|| format!("Failed to delete export file {}", path.display()))?;
    info!(path = %path.display(), backup = %backup.display(), "Deleted export");
    Ok(true)
}

/// Put a backup back in place of `path`. The backup is removed once the
/// file is restored.
pub fn restore_file(backup: &Path, path: &Path) -> Result<()> {
    if !backup.exists() {
        anyhow::bail!("Backup file not found: {}", backup.display());
    }
    fs::copy(backup, path)
        .with_context(|| format!("Failed to restore {} from {}", path.display(), backup.display()))?;
    fs::remove_file(backup)
        .with_context(|| format!("Failed to remove backup {}", backup.display()))?;
    info!(path = %path.display(), "Restored export from backup");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_writes_one_line_per_character() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("5.txt");
        let mut hodor = Character::new("Walder");
        hodor.aliases = vec!["Hodor".to_string()];

        let count = export_characters(&path, &[Character::new("Osha"), hodor]).unwrap();
        assert_eq!(count, 2);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Osha |"));
        assert!(lines[1].contains("aliases: Hodor"));
    }

    #[test]
    fn test_backup_and_restore() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("5.txt");
        let backup = dir.path().join("backup_5.txt");

        assert!(!backup_file(&path, &backup).unwrap());

        export_characters(&path, &[Character::new("Gendry")]).unwrap();
        assert!(backup_file(&path, &backup).unwrap());

        fs::remove_file(&path).unwrap();
        restore_file(&backup, &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("Gendry"));
        assert!(!backup.exists());
    }

    #[test]
    fn test_delete_with_backup_then_restore() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("5.txt");
        let backup = dir.path().join("5.txt.bak");

        assert!(!delete_with_backup(&path, &backup).unwrap());
        assert!(!backup.exists());

        export_characters(&path, &[Character::new("Ygritte")]).unwrap();
        assert!(delete_with_backup(&path, &backup).unwrap());
        assert!(!path.exists());
        assert!(fs::read_to_string(&backup).unwrap().starts_with("Ygritte"));

        restore_file(&backup, &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("Ygritte"));
        assert!(!backup.exists());
    }

    #[test]
    fn test_delete_keeps_file_when_backup_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("5.txt");
        export_characters(&path, &[Character::new("Meera")]).unwrap();

        let backup = dir.path().join("missing").join("5.txt.bak");
        assert!(delete_with_backup(&path, &backup).is_err());
        assert!(path.exists());
    }

    #[test]
    fn test_restore_missing_backup_fails() {
        let dir = TempDir::new().unwrap();
        let err = restore_file(&dir.path().join("nope.txt"), &dir.path().join("5.txt"))
            .unwrap_err();
        assert!(err.to_string().contains("Backup file not found"));
    }
}
