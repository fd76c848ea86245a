//! Archive extraction

use crate::error::{BuildpackError, BuildpackResult};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tar::Archive;
use tracing::{debug, warn};

/// Extract a gzip-compressed tarball into `dest`, keeping the archive's
/// layout and file modes.
///
/// Entries that would land outside `dest` are skipped.
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> BuildpackResult<()> {
    unpack(archive_path, dest).map_err(|source| BuildpackError::Extract {
        archive: archive_path.to_path_buf(),
        destination: dest.to_path_buf(),
        source,
    })
}

fn unpack(archive_path: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;

    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut archive = Archive::new(decoder);

    let mut count = 0usize;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        if entry.unpack_in(dest)? {
            count += 1;
        } else {
            warn!("Skipping archive entry outside destination: {}", path.display());
        }
    }

    debug!(
        "Extracted {} entries from {} to {}",
        count,
        archive_path.display(),
        dest.display()
    );
    Ok(())
}
