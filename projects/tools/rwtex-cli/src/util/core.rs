use crate::error::CliError;
use std::fs;
use std::path::*;

/// Recursively visits directories and collects entries.
///
/// Directories or entries that cannot be read are skipped.
pub fn find_all_files(dir: &Path, entries: &mut Vec<fs::DirEntry>) -> std::io::Result<()> {
    // Gracefully handle cases where the directory cannot be read
    let dir_entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(()),
    };

    for entry in dir_entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue, // Skip problematic entries, e.g. those without access.
        };

        let path = entry.path();
        if path.is_dir() {
            find_all_files(&path, entries)?;
        } else {
            entries.push(entry);
        }
    }
    Ok(())
}

/// Prints a failed file to stderr. Files left unchanged are skipped silently.
pub fn handle_process_entry_error(result: Result<(), CliError>) {
    if let Err(e) = result {
        match e {
            CliError::Unchanged => (),
            _ => eprintln!("{e}"),
        }
    }
}

/// Canonicalizes a CLI directory argument, creating the directory if it doesn't exist.
pub fn canonicalize_cli_path(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);

    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| format!("Failed to create directory: {e}"))?;
    }

    fs::canonicalize(path).map_err(|e| format!("Invalid path: {e}"))
}

/// Canonicalizes a CLI file argument. The file must exist.
pub fn canonicalize_cli_file(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);
    if !path.is_file() {
        return Err(format!("Not a file: {value}"));
    }
    fs::canonicalize(path).map_err(|e| format!("Invalid path: {e}"))
}
