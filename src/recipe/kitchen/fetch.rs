// src/recipe/kitchen/fetch.rs

//! Source archive fetching and extraction

use crate::error::{Error, Result};
use crate::hash::verify_sha256;
use crate::recipe::format::SourceArchive;
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tar::{Archive, EntryType};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Timeout for source downloads
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for obtaining an extracted source tree
///
/// Keeps the Kitchen independent of where sources come from; tests swap in
/// a fetcher that writes a fixture tree.
pub trait SourceFetcher: Send + Sync {
    /// Fetch `source` and extract it into `dest`, with the archive's top
    /// directory stripped
    fn fetch(&self, source: &SourceArchive, dest: &Path) -> Result<()>;
}

/// Fetches archives over HTTP into a local archive cache
pub struct HttpSourceFetcher {
    client: Client,
    archive_dir: PathBuf,
}

impl HttpSourceFetcher {
    pub fn new(archive_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::FetchFailure(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            archive_dir: archive_dir.into(),
        })
    }

    /// Download `source` into the archive cache unless a verified copy is
    /// already there
    pub fn download(&self, source: &SourceArchive) -> Result<PathBuf> {
        let dest = self.archive_dir.join(source.filename());

        if dest.exists() {
            match &source.sha256 {
                Some(sha) if verify_sha256(&dest, sha)? => {
                    debug!("Using cached archive {}", dest.display());
                    return Ok(dest);
                }
                Some(_) => warn!("Cached archive {} is stale, downloading again", dest.display()),
                None => {
                    debug!("Using cached unchecked archive {}", dest.display());
                    return Ok(dest);
                }
            }
        }

        fs::create_dir_all(&self.archive_dir).map_err(|e| {
            Error::IoError(format!(
                "Failed to create directory {}: {e}",
                self.archive_dir.display()
            ))
        })?;

        info!("Downloading {}", source.url);
        let mut response = self
            .client
            .get(&source.url)
            .send()
            .map_err(|e| Error::FetchFailure(format!("Failed to download {}: {e}", source.url)))?;

        if !response.status().is_success() {
            return Err(Error::FetchFailure(format!(
                "HTTP {} from {}",
                response.status(),
                source.url
            )));
        }

        // Stage next to the final path so the rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(&self.archive_dir)?;
        io::copy(&mut response, temp.as_file_mut())
            .map_err(|e| Error::FetchFailure(format!("Failed to write downloaded data: {e}")))?;

        if let Some(sha) = &source.sha256 {
            if !verify_sha256(temp.path(), sha)? {
                return Err(Error::FetchFailure(format!(
                    "Checksum mismatch for {} (expected {})",
                    source.url, sha
                )));
            }
        } else {
            warn!("No sha256 for {}, skipping verification", source.url);
        }

        temp.persist(&dest)
            .map_err(|e| Error::IoError(format!("Failed to store {}: {}", dest.display(), e)))?;

        info!("Downloaded {}", dest.display());
        Ok(dest)
    }
}

impl SourceFetcher for HttpSourceFetcher {
    fn fetch(&self, source: &SourceArchive, dest: &Path) -> Result<()> {
        let archive = self.download(source)?;
        extract_tar_gz(&archive, dest)
    }
}

/// Extract a `.tar.gz` into `dest`, stripping the leading directory
///
/// Extraction goes into a sibling staging directory that is renamed into
/// place at the end, so `dest` never holds a partial tree.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let staging = staging_path(dest);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let count = match unpack_stripped(archive, &staging) {
        Ok(count) => count,
        Err(e) => {
            fs::remove_dir_all(&staging)?;
            return Err(e);
        }
    };

    if count == 0 {
        fs::remove_dir_all(&staging)?;
        return Err(Error::FetchFailure(format!(
            "Archive {} is empty",
            archive.display()
        )));
    }

    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    fs::rename(&staging, dest)?;

    debug!("Extracted {} entries into {}", count, dest.display());
    Ok(())
}

/// Unpack every entry below the archive root into `staging`
///
/// Entries may not leave `staging`: unsafe paths, symlinks pointing
/// outside the tree and writes through earlier symlinks are refused.
fn unpack_stripped(archive: &Path, staging: &Path) -> Result<usize> {
    let file = File::open(archive)
        .map_err(|e| Error::FetchFailure(format!("Failed to open {}: {e}", archive.display())))?;
    let mut tar = Archive::new(GzDecoder::new(file));

    let entries = tar
        .entries()
        .map_err(|e| Error::FetchFailure(format!("Failed to read {}: {e}", archive.display())))?;

    let mut count = 0usize;
    for entry in entries {
        let mut entry = entry.map_err(|e| {
            Error::FetchFailure(format!("Corrupt archive {}: {e}", archive.display()))
        })?;

        if matches!(
            entry.header().entry_type(),
            EntryType::XGlobalHeader | EntryType::XHeader
        ) {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| Error::FetchFailure(format!("Bad entry path: {e}")))?
            .into_owned();
        let Some(relative) = strip_root(&path)? else {
            continue;
        };

        ensure_no_symlink_in_path(staging, &relative)?;
        let target = staging.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        match entry.header().entry_type() {
            EntryType::Symlink => {
                let link = link_name(&entry, &path)?;
                check_symlink_target(&relative, &link, &path)?;
            }
            EntryType::Link => {
                // Hard links name an archive path, which carries the root
                let link = link_name(&entry, &path)?;
                let Some(source) = strip_root(&link)? else {
                    return Err(unsafe_entry(&path));
                };
                ensure_no_symlink_in_path(staging, &source)?;
                fs::hard_link(staging.join(&source), &target).map_err(|e| {
                    Error::FetchFailure(format!("Failed to link {}: {e}", relative.display()))
                })?;
                count += 1;
                continue;
            }
            _ => {}
        }

        entry.unpack(&target).map_err(|e| {
            Error::FetchFailure(format!("Failed to extract {}: {e}", relative.display()))
        })?;
        count += 1;
    }

    Ok(count)
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    dest.with_file_name(name)
}

fn unsafe_entry(path: &Path) -> Error {
    Error::FetchFailure(format!("Refusing unsafe archive path {}", path.display()))
}

fn link_name<R: io::Read>(entry: &tar::Entry<'_, R>, path: &Path) -> Result<PathBuf> {
    entry
        .link_name()
        .map_err(|e| Error::FetchFailure(format!("Bad link in {}: {e}", path.display())))?
        .map(|link| link.into_owned())
        .ok_or_else(|| unsafe_entry(path))
}

/// Refuse to write through a symlink created by an earlier entry
fn ensure_no_symlink_in_path(staging: &Path, relative: &Path) -> Result<()> {
    let mut current = staging.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(Error::FetchFailure(format!(
                    "Refusing to extract through symlink {}",
                    current.display()
                )));
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
    Ok(())
}

/// A symlink target must be relative and resolve inside the extracted tree
fn check_symlink_target(relative: &Path, link: &Path, path: &Path) -> Result<()> {
    let mut depth = relative.components().count().saturating_sub(1);
    for component in link.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => depth -= 1,
            _ => {
                return Err(Error::FetchFailure(format!(
                    "Refusing symlink {} -> {}",
                    path.display(),
                    link.display()
                )));
            }
        }
    }
    Ok(())
}

/// Drop the first path component; `None` for the root directory itself
fn strip_root(path: &Path) -> Result<Option<PathBuf>> {
    let mut components = path.components();
    components.next();

    let mut relative = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return Err(unsafe_entry(path)),
        }
    }

    Ok(if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn write_archive(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, content) in files {
            append_file(&mut builder, name, content);
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn append_symlink<W: io::Write>(builder: &mut tar::Builder<W>, name: &str, target: &Path) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        header.set_mode(0o777);
        builder.append_link(&mut header, name, target).unwrap();
    }

    fn append_file<W: io::Write>(builder: &mut tar::Builder<W>, name: &str, content: &str) {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }

    #[test]
    fn test_extract_strips_root() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("src.tar.gz");
        write_archive(
            &archive,
            &[
                ("mariadb-connector-cpp-1.0.3/CMakeLists.txt", "INCLUDE(SetValueMacro)\n"),
                ("mariadb-connector-cpp-1.0.3/src/Driver.cpp", "// driver\n"),
            ],
        );

        let dest = dir.path().join("out");
        extract_tar_gz(&archive, &dest).unwrap();

        assert!(dest.join("CMakeLists.txt").is_file());
        assert!(dest.join("src/Driver.cpp").is_file());
        assert!(!staging_path(&dest).exists());
    }

    #[test]
    fn test_extract_replaces_existing_tree() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("src.tar.gz");
        write_archive(&archive, &[("root/CMakeLists.txt", "new\n")]);

        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.txt"), "old").unwrap();

        extract_tar_gz(&archive, &dest).unwrap();
        assert!(!dest.join("stale.txt").exists());
        assert_eq!(fs::read_to_string(dest.join("CMakeLists.txt")).unwrap(), "new\n");
    }

    #[test]
    fn test_extract_not_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("src.tar.gz");
        fs::write(&archive, "plain text").unwrap();

        let err = extract_tar_gz(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::FetchFailure(_)));
    }

    #[test]
    fn test_extract_refuses_write_through_absolute_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();

        let archive = dir.path().join("src.tar.gz");
        let file = File::create(&archive).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        append_symlink(&mut builder, "root/escape", &outside);
        append_file(&mut builder, "root/escape/pwned.txt", "x");
        builder.into_inner().unwrap().finish().unwrap();

        let dest = dir.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, Error::FetchFailure(_)));
        assert!(!outside.join("pwned.txt").exists());
        assert!(!dest.exists());
        assert!(!staging_path(&dest).exists());
    }

    #[test]
    fn test_extract_refuses_relative_symlink_escape() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("outside")).unwrap();

        let archive = dir.path().join("src.tar.gz");
        let file = File::create(&archive).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        append_symlink(&mut builder, "root/sub/escape", Path::new("../../outside"));
        append_file(&mut builder, "root/sub/escape/pwned.txt", "x");
        builder.into_inner().unwrap().finish().unwrap();

        let err = extract_tar_gz(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::FetchFailure(_)));
        assert!(!dir.path().join("outside/pwned.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_keeps_internal_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("src.tar.gz");
        let file = File::create(&archive).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        append_file(&mut builder, "root/include/conncpp.hpp", "// api\n");
        append_symlink(&mut builder, "root/include/mariadb.hpp", Path::new("conncpp.hpp"));
        builder.into_inner().unwrap().finish().unwrap();

        let dest = dir.path().join("out");
        extract_tar_gz(&archive, &dest).unwrap();
        assert_eq!(
            fs::read_link(dest.join("include/mariadb.hpp")).unwrap(),
            PathBuf::from("conncpp.hpp")
        );
    }

    #[test]
    fn test_check_symlink_target() {
        let entry = Path::new("root/a/link");
        assert!(check_symlink_target(Path::new("a/link"), Path::new("../b"), entry).is_ok());
        assert!(check_symlink_target(Path::new("a/link"), Path::new("../../b"), entry).is_err());
        assert!(check_symlink_target(Path::new("a/link"), Path::new("/etc"), entry).is_err());
    }

    #[test]
    fn test_strip_root() {
        assert_eq!(strip_root(Path::new("root")).unwrap(), None);
        assert_eq!(strip_root(Path::new("root/")).unwrap(), None);
        assert_eq!(
            strip_root(Path::new("root/a/b.txt")).unwrap(),
            Some(PathBuf::from("a/b.txt"))
        );
        assert!(strip_root(Path::new("root/../../etc/passwd")).is_err());
    }

    #[test]
    fn test_cached_archive_reused() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpSourceFetcher::new(dir.path()).unwrap();
        let source = SourceArchive {
            url: "http://127.0.0.1:9/pkg-1.0.tar.gz".to_string(),
            sha256: Some(crate::hash::sha256_hex(b"cached")),
        };
        fs::write(dir.path().join("pkg-1.0.tar.gz"), b"cached").unwrap();

        // Cache hit means no network access
        let path = fetcher.download(&source).unwrap();
        assert_eq!(path, dir.path().join("pkg-1.0.tar.gz"));
    }
}
