//! Streaming file hashing and the `<file>.<ext>` sidecar naming convention
//! (§6.2).

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use md5::{Digest as _, Md5};
use sha2::{Digest as _, Sha256};

use crate::config::ChecksumAlgorithm;

const CHUNK_SIZE: usize = 64 * 1024;

pub fn hash_file(path: &Path, algorithm: ChecksumAlgorithm) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    match algorithm {
        ChecksumAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(format!("{:x}", hasher.finalize()))
        }
        ChecksumAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(format!("{:x}", hasher.finalize()))
        }
    }
}

/// `<file>.<ext>`, per §6.2. No whitespace, no trailing newline is written
/// into the sidecar's contents.
pub fn sidecar_path(file: &Path, algorithm: ChecksumAlgorithm) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".");
    name.push(algorithm.extension());
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_and_md5_differ_for_the_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");
        std::fs::write(&path, b"dvd archiver").unwrap();

        let sha = hash_file(&path, ChecksumAlgorithm::Sha256).unwrap();
        let md5 = hash_file(&path, ChecksumAlgorithm::Md5).unwrap();
        assert_ne!(sha, md5);
        assert_eq!(sha.len(), 64);
        assert_eq!(md5.len(), 32);
    }

    #[test]
    fn sidecar_path_appends_extension() {
        let path = Path::new("/archive/01_intro/01_button.mp4");
        let sidecar = sidecar_path(path, ChecksumAlgorithm::Sha256);
        assert_eq!(sidecar, PathBuf::from("/archive/01_intro/01_button.mp4.sha256"));
    }
}
