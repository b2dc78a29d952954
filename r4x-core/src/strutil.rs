//! Buffer helpers.
//!
//! [`read_conf_file`] loads whole files (configuration, scripts) once per
//! configuration load; `r4x-configuration` reads everything through it.
//!
//! [`substr`] and [`substr_terminated`] are bounded copies offered to code
//! embedding the gateway crates that slices raw buffers itself. The gateway's
//! own template compiler works on already validated `str` slices and does not
//! need them. Nothing here runs per request.
//!
//! ```
//! use r4x_core::strutil::{substr, substr_terminated};
//!
//! let source = b"GET user:42";
//! assert_eq!(substr(source, 4, 7).unwrap(), "user:42");
//! assert!(substr(source, 8, 10).is_err());
//! assert_eq!(substr_terminated(Some(&source[..]), 0, 3).unwrap(), &b"GET\0"[..]);
//! assert_eq!(substr_terminated(None, 0, 3), None);
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, error};

use crate::Error;

/// Copies `len` bytes at `offset` from `source` and appends a NUL byte.
///
/// Returns `None` when there is no data to copy: the source is absent, empty,
/// or shorter than the requested range. Callers treat `None` as "no data",
/// not as an error.
pub fn substr_terminated(source: Option<&[u8]>, offset: usize, len: usize) -> Option<Bytes> {
    let source = source.filter(|source| !source.is_empty())?;
    let slice = source.get(offset..offset.checked_add(len)?)?;
    let mut copy = Vec::with_capacity(len + 1);
    copy.extend_from_slice(slice);
    copy.push(0);
    Some(Bytes::from(copy))
}

/// Copies `len` bytes at `offset` from `source`, without a terminator.
pub fn substr(source: &[u8], offset: usize, len: usize) -> Result<Bytes, Error> {
    offset
        .checked_add(len)
        .and_then(|end| source.get(offset..end))
        .map(Bytes::copy_from_slice)
        .ok_or(Error::OutOfRange {
            offset,
            len,
            size: source.len(),
        })
}

/// Failure to read a file at configuration time.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file does not exist. Soft: the caller decides whether that matters.
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Any other I/O failure while opening, inspecting or reading the file.
    #[error("{op} {} failed: {source}", path.display())]
    Io {
        /// Operation that failed.
        op: &'static str,
        /// The file.
        path: PathBuf,
        /// The OS error.
        #[source]
        source: io::Error,
    },

    /// Fewer bytes were read than the file's size.
    #[error("read {} returned only {read} bytes instead of {expected}", path.display())]
    ShortRead {
        /// The file.
        path: PathBuf,
        /// Bytes actually read.
        read: usize,
        /// File size at the time it was inspected.
        expected: usize,
    },
}

impl ReadError {
    /// Returns `true` for the soft "file does not exist" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReadError::NotFound(_))
    }

    fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        error!(
            path = %path.display(),
            os_error = source.raw_os_error(),
            "{op} failed: {source}"
        );
        ReadError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads a whole file into a buffer of exactly its size.
///
/// A missing file is reported as [`ReadError::NotFound`] without logging at
/// error level; every other failure is logged with the OS error code.
pub fn read_conf_file(path: impl AsRef<Path>) -> Result<Bytes, ReadError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "configuration file not found");
            return Err(ReadError::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(ReadError::io("open", path, err)),
    };

    let size = file
        .metadata()
        .map_err(|err| ReadError::io("stat", path, err))?
        .len();
    let size = usize::try_from(size).map_err(|_| {
        ReadError::io(
            "stat",
            path,
            io::Error::new(io::ErrorKind::FileTooLarge, "file does not fit in memory"),
        )
    })?;

    read_sized(file, size, path)
}

fn read_sized<R: Read>(mut reader: R, size: usize, path: &Path) -> Result<Bytes, ReadError> {
    let mut buf = vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(ReadError::io("read", path, err)),
        }
    }

    if filled != size {
        error!(
            path = %path.display(),
            read = filled,
            expected = size,
            "short read of configuration file"
        );
        return Err(ReadError::ShortRead {
            path: path.to_path_buf(),
            read: filled,
            expected: size,
        });
    }

    Ok(Bytes::from(buf))
}
