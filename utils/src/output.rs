use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Writes `content` to `path`, or to stdout when no path is given.
///
/// A trailing newline is added when missing.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    let content = if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{}\n", content)
    };

    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}

/// Reads a whole text file.
pub fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_output_to_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacks").join("base.json");

        write_output("{}", Some(&path)).unwrap();

        assert_eq!(read_input(&path).unwrap(), "{}\n");
    }

    #[test]
    fn test_write_output_keeps_existing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.yaml");

        write_output("a: 1\n", Some(&path)).unwrap();

        assert_eq!(read_input(&path).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
