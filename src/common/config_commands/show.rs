use crate::common::config::ENV_PREFIX;
use anyhow::{Context, Result};
use std::io::{ErrorKind, Write};
use std::path::Path;

pub(super) fn write_config_path(path: &Path, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", path.display())?;
    Ok(())
}

/// Print the user's config file verbatim.
///
/// Without one, stdout gets the built-in defaults as TOML (ready to paste
/// into a new file) and stderr says where to put it.
pub(super) fn write_config_listing(
    path: &Path,
    defaults: &str,
    out: &mut dyn Write,
    notes: &mut dyn Write,
) -> Result<()> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            write!(out, "{contents}")?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            writeln!(notes, "No qrdrop config at {}; built-in defaults:", path.display())?;
            writeln!(
                notes,
                "Save them there to customise, or set {ENV_PREFIX}<FIELD> variables."
            )?;
            write!(out, "{defaults}")?;
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_printed_on_its_own_line() {
        let mut out = Vec::new();
        write_config_path(Path::new("/home/u/.config/qrdrop/config.toml"), &mut out).unwrap();
        assert_eq!(out, b"/home/u/.config/qrdrop/config.toml\n");
    }

    #[test]
    fn existing_file_is_echoed_without_notes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ttl_minutes = 5\nshow_qr = false\n").unwrap();

        let (mut out, mut notes) = (Vec::new(), Vec::new());
        write_config_listing(&path, "unused", &mut out, &mut notes).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "ttl_minutes = 5\nshow_qr = false\n");
        assert!(notes.is_empty());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let defaults = super::super::defaults_toml().unwrap();

        let (mut out, mut notes) = (Vec::new(), Vec::new());
        write_config_listing(&path, &defaults, &mut out, &mut notes).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("ttl_minutes = 15"));
        assert!(out.contains("upload_dir = \"uploads\""));
        let notes = String::from_utf8(notes).unwrap();
        assert!(notes.contains("No qrdrop config at"));
        assert!(notes.contains("QRDROP_<FIELD>"));
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let (mut out, mut notes) = (Vec::new(), Vec::new());
        let err = write_config_listing(dir.path(), "", &mut out, &mut notes).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
