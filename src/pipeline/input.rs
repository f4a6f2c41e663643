//! Input resolution: load a text source as lines.
//!
//! Inputs are UTF-8 text files (or stdin, spelled `-`). Bytes are decoded
//! strictly so a binary upload fails with a clear [`McqError::NotUtf8`]
//! instead of producing garbage questions. A leading byte-order mark is
//! dropped; `\r\n` endings are handled by [`str::lines`].

use crate::error::McqError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path spelling that means "read standard input".
pub const STDIN_PATH: &str = "-";

/// Check if the input names standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Decode raw bytes into lines.
pub fn decode_lines(path: &Path, bytes: Vec<u8>) -> Result<Vec<String>, McqError> {
    let text = String::from_utf8(bytes).map_err(|e| McqError::NotUtf8 {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })?;
    Ok(split_lines(&text))
}

/// Split text into owned lines, dropping a leading BOM.
pub fn split_lines(text: &str) -> Vec<String> {
    text.strip_prefix('\u{FEFF}')
        .unwrap_or(text)
        .lines()
        .map(str::to_string)
        .collect()
}

fn map_read_error(path: &Path, e: std::io::Error) -> McqError {
    let path = path.to_path_buf();
    match e.kind() {
        std::io::ErrorKind::NotFound => McqError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => McqError::PermissionDenied { path },
        _ => McqError::InputReadFailed { path, source: e },
    }
}

/// Read a local file (or stdin) into lines.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, McqError> {
    let path = path.as_ref();
    let bytes = if is_stdin(path) {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| map_read_error(path, e))?;
        buf
    } else {
        std::fs::read(path).map_err(|e| map_read_error(path, e))?
    };
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    decode_lines(path, bytes)
}

/// Async variant of [`read_lines`] for local files.
///
/// Stdin is not supported here; use [`read_lines`] for `-`.
pub async fn read_lines_async(path: impl AsRef<Path>) -> Result<Vec<String>, McqError> {
    let path = path.as_ref();
    if is_stdin(path) {
        return Err(McqError::InvalidConfig(
            "stdin ('-') cannot be read by the concurrent file reader".into(),
        ));
    }
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| map_read_error(path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    decode_lines(path, bytes)
}

/// Name used for output derived from `path`: the file stem, or `output`
/// for stdin and paths without one.
pub fn output_stem(path: &Path) -> String {
    if is_stdin(path) {
        return "output".to_string();
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string())
}

/// Resolve `dir/<name>.json`, keeping names filesystem-safe.
pub fn output_path(dir: &Path, name: &str) -> PathBuf {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.join(format!("{safe}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stdin() {
        assert!(is_stdin(Path::new("-")));
        assert!(!is_stdin(Path::new("questions.txt")));
    }

    #[test]
    fn split_lines_handles_crlf_and_bom() {
        let lines = split_lines("\u{FEFF}1. Q?\r\nA. x@\r\n\r\nB. y");
        assert_eq!(lines, vec!["1. Q?", "A. x@", "", "B. y"]);
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let err = decode_lines(Path::new("bad.txt"), vec![b'o', b'k', 0xFF, b'x']).unwrap_err();
        match err {
            McqError::NotUtf8 { offset, .. } => assert_eq!(offset, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_maps_to_file_not_found() {
        let err = read_lines("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, McqError::FileNotFound { .. }));
    }

    #[test]
    fn output_naming() {
        assert_eq!(output_stem(Path::new("/tmp/chapter 1.txt")), "chapter 1");
        assert_eq!(output_stem(Path::new("-")), "output");
        assert_eq!(
            output_path(Path::new("out"), "chapter 1/x"),
            PathBuf::from("out/chapter_1_x.json")
        );
    }
}
