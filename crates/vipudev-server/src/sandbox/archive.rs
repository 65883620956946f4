//! ZIP helpers: bundle a single file for download, and sample an uploaded
//! archive's text entries for assistant analysis.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const MAX_SAMPLED_FILES: usize = 30;
const MAX_SAMPLED_BYTES: usize = 20_000;

/// Extensions never worth feeding to the assistant.
const SKIPPED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "pdf", "mp4", "mp3", "zip", "gz", "tar", "exe", "dll",
];

/// Build an in-memory ZIP holding one file. The entry name comes from the
/// sanitized filename, falling back to `main.<ext>` by language.
pub fn bundle_single_file(
    code: &str,
    language: Option<&str>,
    filename: Option<&str>,
) -> Result<Vec<u8>> {
    let entry_name = filename
        .map(sanitize_filename)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            let ext = if language == Some("python") { "py" } else { "js" };
            format!("main.{}", ext)
        });

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(entry_name, SimpleFileOptions::default())
        .context("Failed to start ZIP entry")?;
    writer.write_all(code.as_bytes())?;
    let cursor = writer.finish().context("Failed to finish ZIP")?;
    Ok(cursor.into_inner())
}

/// Extract up to 30 readable text entries (20 000 bytes each) from an
/// uploaded archive, formatted as `--- FILE: name ---` blocks. Returns the
/// combined text and how many entries were sampled.
pub fn sample_archive(data: &[u8]) -> Result<(String, usize)> {
    let mut archive = ZipArchive::new(Cursor::new(data)).context("Failed to open ZIP")?;

    let mut samples: Vec<String> = Vec::new();
    for index in 0..archive.len() {
        if samples.len() >= MAX_SAMPLED_FILES {
            break;
        }
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if is_binary_name(&name) {
            continue;
        }

        let mut buf = Vec::new();
        entry
            .take(MAX_SAMPLED_BYTES as u64)
            .read_to_end(&mut buf)
            .with_context(|| format!("Failed to read ZIP entry {}", name))?;
        if buf.is_empty() {
            continue;
        }

        let content = String::from_utf8_lossy(&buf);
        samples.push(format!("--- FILE: {} ---\n{}", name, content));
    }

    let count = samples.len();
    Ok((samples.join("\n\n"), count))
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect()
}

fn is_binary_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SKIPPED_EXTENSIONS
                .iter()
                .any(|skip| ext.eq_ignore_ascii_case(skip))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file((*name).to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn bundle_uses_sanitized_filename() {
        let data = bundle_single_file("print(1)", Some("python"), Some("my script!.py")).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "myscript.py");
    }

    #[test]
    fn bundle_falls_back_to_language_extension() {
        let data = bundle_single_file("print(1)", Some("python"), None).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "main.py");

        let data = bundle_single_file("console.log(1)", None, None).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "main.js");
    }

    #[test]
    fn bundle_roundtrips_content() {
        let data = bundle_single_file("console.log(1)", None, Some("app.js")).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        let mut entry = archive.by_index(0).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "console.log(1)");
    }

    #[test]
    fn sample_skips_binaries_and_empty_entries() {
        let data = build_test_zip(&[
            ("src/app.js", b"console.log(1)".as_slice()),
            ("logo.PNG", b"\x89PNG".as_slice()),
            ("empty.txt", b"".as_slice()),
            ("README.md", b"# hi".as_slice()),
        ]);

        let (combined, count) = sample_archive(&data).unwrap();
        assert_eq!(count, 2);
        assert!(combined.contains("--- FILE: src/app.js ---"));
        assert!(combined.contains("# hi"));
        assert!(!combined.contains("logo.PNG"));
    }

    #[test]
    fn sample_truncates_large_entries() {
        let big = vec![b'a'; 50_000];
        let data = build_test_zip(&[("big.txt", big.as_slice())]);

        let (combined, count) = sample_archive(&data).unwrap();
        assert_eq!(count, 1);
        // Header plus at most 20 000 sampled bytes.
        assert!(combined.len() < 21_000);
    }

    #[test]
    fn sample_caps_file_count() {
        let entries: Vec<(String, Vec<u8>)> = (0..40)
            .map(|i| (format!("file{}.txt", i), b"x".to_vec()))
            .collect();
        let borrowed: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_slice()))
            .collect();
        let data = build_test_zip(&borrowed);

        let (_, count) = sample_archive(&data).unwrap();
        assert_eq!(count, 30);
    }
}
