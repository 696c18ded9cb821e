use std::io::{Read, Write};
use std::path::Path;

use tracing::instrument;

use crate::entry::Entry;
use crate::error::Error;
use crate::sink::Sink;
use crate::summary::Summary;

/// Size of the buffer used by [`Strategy::Stream`].
pub const CHUNK_SIZE: usize = 16 * 1024;

/// How file bytes are moved from source to destination.
///
/// Both strategies produce identical output, the choice only affects performance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Read and write fixed size chunks.
    Stream,
    /// Map the whole source into memory and write it out at once.
    MemoryMap,
}

impl Strategy {
    /// Files strictly larger than `threshold` are memory mapped.
    pub fn select(size: u64, threshold: u64) -> Self {
        if size > threshold {
            Strategy::MemoryMap
        } else {
            Strategy::Stream
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Strategy::Stream => f.write_str("stream"),
            Strategy::MemoryMap => f.write_str("mmap"),
        }
    }
}

fn copy_stream(
    reader: &mut std::fs::File,
    writer: &mut std::fs::File,
    src: &Path,
    dst: &Path,
) -> Result<u64, Error> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(read) => read,
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::SourceUnreadable {
                    path: src.to_owned(),
                    source,
                });
            }
        };
        let written = writer
            .write(&buf[..read])
            .map_err(|source| Error::DestUnwritable {
                path: dst.to_owned(),
                source,
            })?;
        if written != read {
            return Err(Error::ShortWrite {
                path: dst.to_owned(),
                written,
                expected: read,
            });
        }
        total += written as u64;
    }
}

/// Writes all of `region`, issuing as many writes as the writer needs. A single `write(2)` moves
/// at most 0x7ffff000 bytes on Linux.
fn write_region<W: Write>(writer: &mut W, region: &[u8], dst: &Path) -> Result<u64, Error> {
    let mut written = 0;
    while written < region.len() {
        match writer.write(&region[written..]) {
            Ok(0) => {
                return Err(Error::ShortWrite {
                    path: dst.to_owned(),
                    written,
                    expected: region.len(),
                });
            }
            Ok(count) => written += count,
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::DestUnwritable {
                    path: dst.to_owned(),
                    source,
                });
            }
        }
    }
    Ok(written as u64)
}

fn copy_mmap(
    reader: &std::fs::File,
    writer: &mut std::fs::File,
    src: &Path,
    dst: &Path,
) -> Result<u64, Error> {
    // SAFETY: read-only mapping dropped before returning, the source must not be truncated
    // meanwhile
    let map = unsafe { memmap2::Mmap::map(reader) }.map_err(|source| Error::SourceUnreadable {
        path: src.to_owned(),
        source,
    })?;
    write_region(writer, &map, dst)
}

/// Copies the content of the regular file `src` into `dst` and gives `dst` the access and
/// modification times of `src`.
///
/// `dst` is created or truncated. Empty files always go through the chunked path since an
/// empty mapping is not something the platform guarantees. If the timestamps cannot be set the
/// copied data stays in place and [`Error::MtimeSyncFailed`] is returned; the next pass will
/// see the mtime difference and copy again.
#[instrument]
pub fn copy_file(src: &Path, dst: &Path, strategy: Strategy) -> Result<u64, Error> {
    let unreadable = |source| Error::SourceUnreadable {
        path: src.to_owned(),
        source,
    };
    let mut reader = std::fs::File::open(src).map_err(unreadable)?;
    let src_metadata = reader.metadata().map_err(unreadable)?;
    let mut writer = std::fs::File::create(dst).map_err(|source| Error::DestUnwritable {
        path: dst.to_owned(),
        source,
    })?;
    let strategy = if src_metadata.len() == 0 {
        Strategy::Stream
    } else {
        strategy
    };
    tracing::debug!("copying data using {} strategy", strategy);
    let bytes_copied = match strategy {
        Strategy::Stream => copy_stream(&mut reader, &mut writer, src, dst)?,
        Strategy::MemoryMap => copy_mmap(&reader, &mut writer, src, dst)?,
    };
    tracing::debug!("setting timestamps");
    let atime = filetime::FileTime::from_last_access_time(&src_metadata);
    let mtime = filetime::FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_handle_times(&writer, Some(atime), Some(mtime)).map_err(|source| {
        Error::MtimeSyncFailed {
            path: dst.to_owned(),
            bytes_copied,
            source,
        }
    })?;
    Ok(bytes_copied)
}

/// Copies the regular file `src` to `dst`, picking the strategy from the source size, and
/// narrates the outcome.
pub fn mirror_file(src: &Entry, dst: &Path, size_threshold: u64, sink: &dyn Sink) -> Summary {
    let strategy = Strategy::select(src.size, size_threshold);
    let result = copy_file(&src.path, dst, strategy);
    record_copy(&src.path, dst, strategy, result, sink)
}

fn record_copy(
    src: &Path,
    dst: &Path,
    strategy: Strategy,
    result: Result<u64, Error>,
    sink: &dyn Sink,
) -> Summary {
    match result {
        Ok(bytes_copied) => {
            sink.line(&format!(
                "copy {:?} -> {:?} ({}, {})",
                src,
                dst,
                strategy,
                bytesize::ByteSize(bytes_copied)
            ));
            Summary {
                bytes_copied,
                files_copied: 1,
                ..Default::default()
            }
        }
        Err(error) => {
            let mut summary = error.report(sink);
            if let Error::MtimeSyncFailed { bytes_copied, .. } = error {
                // content made it, only the change detection signal is stale
                summary.bytes_copied += bytes_copied;
                summary.files_copied += 1;
            }
            summary
        }
    }
}
