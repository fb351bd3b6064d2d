//! Archive detection and extraction.
//!
//! Format is decided by content signature first and filename suffix second,
//! so a mislabelled download still unpacks correctly. Extraction flattens
//! nothing: entries keep their relative paths under the destination, and a
//! path that would escape the destination aborts the whole extraction.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;
use xz2::read::XzDecoder;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("archive entry '{0}' escapes the extraction directory")]
    PathEscape(String),

    #[error("corrupt or truncated archive: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Payload layout of a downloaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    Zip,
    /// Gzip wrapping a single file, not a tar stream.
    Gzip,
    /// Not an archive at all; treated as a bare executable.
    Raw,
}

/// One file produced by extraction.
#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    /// Path relative to the extraction root.
    pub relative_path: PathBuf,
    pub absolute_path: PathBuf,
    pub size: u64,
    /// Content signature says this is a program. Mode bits and extensions
    /// are ignored; archive tools mangle both too often to trust.
    pub is_executable: bool,
}

impl ExtractedEntry {
    /// Final path component, as a binary would be named in `bin/`.
    pub fn file_name(&self) -> &str {
        self.relative_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const XZ_MAGIC: [u8; 6] = [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Decide the archive format of `path` from its leading bytes, falling back
/// to the filename suffix when the signature is ambiguous or absent.
pub fn detect_format(path: &Path) -> Result<ArchiveFormat, ExtractError> {
    let mut head = [0u8; 8];
    let n = File::open(path)?.read(&mut head)?;
    let head = &head[..n];

    if head.starts_with(&GZIP_MAGIC) {
        // Same signature for tar.gz and a plain gzipped file; peek at the
        // decompressed stream for the ustar marker at offset 257.
        return Ok(if gzip_wraps_tar(path)? {
            ArchiveFormat::TarGz
        } else {
            ArchiveFormat::Gzip
        });
    }
    if head.starts_with(&XZ_MAGIC) {
        return Ok(ArchiveFormat::TarXz);
    }
    if head.starts_with(&ZIP_MAGIC) {
        return Ok(ArchiveFormat::Zip);
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();
    Ok(if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        ArchiveFormat::TarGz
    } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
        ArchiveFormat::TarXz
    } else if name.ends_with(".zip") {
        ArchiveFormat::Zip
    } else if name.ends_with(".gz") {
        ArchiveFormat::Gzip
    } else {
        ArchiveFormat::Raw
    })
}

fn gzip_wraps_tar(path: &Path) -> Result<bool, ExtractError> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    let mut header = [0u8; 512];
    let mut filled = 0;
    while filled < header.len() {
        match decoder.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return Ok(false),
        }
    }
    Ok(filled >= 262 && &header[257..262] == b"ustar")
}

/// Unpack `archive` into `dest` and list what came out.
///
/// `Raw` payloads are copied in as a single entry named after the archive
/// file; `Gzip` payloads are decompressed to the archive name minus `.gz`.
pub fn extract(
    archive: &Path,
    format: ArchiveFormat,
    dest: &Path,
) -> Result<Vec<ExtractedEntry>, ExtractError> {
    std::fs::create_dir_all(dest)?;
    match format {
        ArchiveFormat::TarGz => {
            let decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
            extract_tar(decoder, dest)
        }
        ArchiveFormat::TarXz => {
            let decoder = XzDecoder::new(BufReader::new(File::open(archive)?));
            extract_tar(decoder, dest)
        }
        ArchiveFormat::Zip => extract_zip(archive, dest),
        ArchiveFormat::Gzip => {
            let name = archive
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("download");
            let out_name = name.strip_suffix(".gz").unwrap_or(name);
            let out_path = dest.join(out_name);
            let mut decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
            let mut out = File::create(&out_path)?;
            std::io::copy(&mut decoder, &mut out)
                .map_err(|e| ExtractError::Corrupt(e.to_string()))?;
            Ok(vec![entry_for(dest, &out_path)?])
        }
        ArchiveFormat::Raw => {
            let name = archive
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("download");
            let out_path = dest.join(name);
            std::fs::copy(archive, &out_path)?;
            Ok(vec![entry_for(dest, &out_path)?])
        }
    }
}

fn extract_tar(reader: impl Read, dest: &Path) -> Result<Vec<ExtractedEntry>, ExtractError> {
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();

    for entry in archive
        .entries()
        .map_err(|e| ExtractError::Corrupt(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| ExtractError::Corrupt(e.to_string()))?;
        let rel = entry
            .path()
            .map_err(|e| ExtractError::Corrupt(e.to_string()))?
            .into_owned();
        let rel = sanitize(&rel)?;

        if !entry.header().entry_type().is_file() {
            // Directories materialize as parents of their files; links and
            // specials are skipped.
            continue;
        }

        let out_path = dest.join(&rel);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry
            .unpack(&out_path)
            .map_err(|e| ExtractError::Corrupt(e.to_string()))?;

        entries.push(finish_entry(&rel, &out_path)?);
    }
    Ok(entries)
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<Vec<ExtractedEntry>, ExtractError> {
    let mut zip = zip::ZipArchive::new(BufReader::new(File::open(archive)?))
        .map_err(|e| ExtractError::Corrupt(e.to_string()))?;
    let mut entries = Vec::new();

    for i in 0..zip.len() {
        let mut file = zip
            .by_index(i)
            .map_err(|e| ExtractError::Corrupt(e.to_string()))?;
        if file.is_dir() {
            continue;
        }
        let Some(rel) = file.enclosed_name() else {
            return Err(ExtractError::PathEscape(file.name().to_string()));
        };
        let rel = sanitize(&rel)?;

        let out_path = dest.join(&rel);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut file, &mut out).map_err(|e| ExtractError::Corrupt(e.to_string()))?;

        entries.push(finish_entry(&rel, &out_path)?);
    }
    Ok(entries)
}

/// Reject absolute paths and any `..` component.
fn sanitize(rel: &Path) -> Result<PathBuf, ExtractError> {
    let mut clean = PathBuf::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(ExtractError::PathEscape(rel.display().to_string())),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(ExtractError::PathEscape(rel.display().to_string()));
    }
    Ok(clean)
}

fn entry_for(dest: &Path, out_path: &Path) -> Result<ExtractedEntry, ExtractError> {
    let rel = out_path
        .strip_prefix(dest)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| out_path.to_path_buf());
    finish_entry(&rel, out_path)
}

fn finish_entry(rel: &Path, out_path: &Path) -> Result<ExtractedEntry, ExtractError> {
    let size = std::fs::metadata(out_path)?.len();
    let is_executable = sniff_executable(out_path)?;
    Ok(ExtractedEntry {
        relative_path: rel.to_path_buf(),
        absolute_path: out_path.to_path_buf(),
        size,
        is_executable,
    })
}

/// Executable signatures: ELF, the Mach-O magics, PE, and a shebang line.
const EXEC_MAGICS: &[&[u8]] = &[
    b"\x7fELF",
    &[0xfe, 0xed, 0xfa, 0xce],
    &[0xfe, 0xed, 0xfa, 0xcf],
    &[0xcf, 0xfa, 0xed, 0xfe],
    &[0xce, 0xfa, 0xed, 0xfe],
    &[0xca, 0xfe, 0xba, 0xbe],
    b"MZ",
    b"#!",
];

fn sniff_executable(path: &Path) -> Result<bool, ExtractError> {
    let mut head = [0u8; 64];
    let n = File::open(path)?.read(&mut head)?;
    let head = &head[..n];
    Ok(EXEC_MAGICS.iter().any(|magic| head.starts_with(magic)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fake_elf() -> Vec<u8> {
        let mut bytes = b"\x7fELF".to_vec();
        bytes.extend_from_slice(&[0u8; 60]);
        bytes
    }

    fn write_tar_gz(path: &Path, files: &[(&str, &[u8], u32)]) {
        let file = File::create(path).unwrap();
        let enc = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(enc);
        for (name, data, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let opts = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in files {
            zip.start_file(*name, opts).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_detect_tar_gz_by_content() {
        let dir = tempfile::tempdir().unwrap();
        // Extension lies; content wins
        let path = dir.path().join("asset.bin");
        write_tar_gz(&path, &[("tool", b"data", 0o644)]);
        assert_eq!(detect_format(&path).unwrap(), ArchiveFormat::TarGz);
    }

    #[test]
    fn test_detect_plain_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.gz");
        let enc = flate2::write::GzEncoder::new(
            File::create(&path).unwrap(),
            flate2::Compression::default(),
        );
        let mut enc = enc;
        enc.write_all(&fake_elf()).unwrap();
        enc.finish().unwrap();
        assert_eq!(detect_format(&path).unwrap(), ArchiveFormat::Gzip);
    }

    #[test]
    fn test_detect_zip_and_raw() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("asset.dat");
        write_zip(&zip_path, &[("tool.exe", b"MZdata")]);
        assert_eq!(detect_format(&zip_path).unwrap(), ArchiveFormat::Zip);

        let raw = dir.path().join("tool-linux-amd64");
        std::fs::write(&raw, fake_elf()).unwrap();
        assert_eq!(detect_format(&raw).unwrap(), ArchiveFormat::Raw);
    }

    #[test]
    fn test_extract_tar_gz_preserves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.tar.gz");
        let elf = fake_elf();
        write_tar_gz(
            &archive,
            &[
                ("tool-1.0/bin/tool", &elf, 0o755),
                ("tool-1.0/README.md", b"docs", 0o644),
            ],
        );

        let dest = dir.path().join("out");
        let entries = extract(&archive, ArchiveFormat::TarGz, &dest).unwrap();
        assert_eq!(entries.len(), 2);

        let tool = entries
            .iter()
            .find(|e| e.file_name() == "tool")
            .expect("tool entry");
        assert!(tool.is_executable);
        assert_eq!(tool.relative_path, Path::new("tool-1.0/bin/tool"));
        assert!(tool.absolute_path.exists());

        let readme = entries.iter().find(|e| e.file_name() == "README.md").unwrap();
        assert!(!readme.is_executable);
    }

    #[test]
    fn test_mode_bits_do_not_make_an_executable() {
        // A text file marked 0o755 in the archive is still not a program
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.tar.gz");
        write_tar_gz(&archive, &[("install.txt", b"read me first", 0o755)]);

        let dest = dir.path().join("out");
        let entries = extract(&archive, ArchiveFormat::TarGz, &dest).unwrap();
        assert!(!entries[0].is_executable);
    }

    #[test]
    fn test_extract_zip_sniffs_executable() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.zip");
        let elf = fake_elf();
        write_zip(&archive, &[("tool", &elf), ("notes.txt", b"hi")]);

        let dest = dir.path().join("out");
        let entries = extract(&archive, ArchiveFormat::Zip, &dest).unwrap();
        let tool = entries.iter().find(|e| e.file_name() == "tool").unwrap();
        assert!(tool.is_executable);
        let notes = entries.iter().find(|e| e.file_name() == "notes.txt").unwrap();
        assert!(!notes.is_executable);
    }

    #[test]
    fn test_extract_raw_copies_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("tool-linux-amd64");
        std::fs::write(&raw, fake_elf()).unwrap();

        let dest = dir.path().join("out");
        let entries = extract(&raw, ArchiveFormat::Raw, &dest).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "tool-linux-amd64");
        assert!(entries[0].is_executable);
    }

    #[test]
    fn test_extract_gzip_strips_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.gz");
        let mut enc = flate2::write::GzEncoder::new(
            File::create(&path).unwrap(),
            flate2::Compression::default(),
        );
        enc.write_all(&fake_elf()).unwrap();
        enc.finish().unwrap();

        let dest = dir.path().join("out");
        let entries = extract(&path, ArchiveFormat::Gzip, &dest).unwrap();
        assert_eq!(entries[0].file_name(), "tool");
        assert!(entries[0].is_executable);
    }

    #[test]
    fn test_path_escape_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../evil", b"data")]);

        let dest = dir.path().join("out");
        let err = extract(&archive, ArchiveFormat::Zip, &dest).unwrap_err();
        assert!(matches!(err, ExtractError::PathEscape(_)));
        assert!(!dir.path().join("evil").exists());
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert!(sanitize(Path::new("../evil")).is_err());
        assert!(sanitize(Path::new("/etc/passwd")).is_err());
        assert!(sanitize(Path::new("./ok/tool")).is_ok());
    }

    #[test]
    fn test_corrupt_archive_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tar.gz");
        std::fs::write(&path, [0x1f, 0x8b, 0x00, 0x00, 0x01, 0x02]).unwrap();

        let err = extract(&path, ArchiveFormat::TarGz, dir.path().join("out").as_path());
        assert!(err.is_err());
    }

    #[test]
    fn test_shebang_counts_as_executable() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.sh");
        std::fs::write(&script, b"#!/bin/sh\necho hi\n").unwrap();
        assert!(sniff_executable(&script).unwrap());
    }
}
