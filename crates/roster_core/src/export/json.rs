//! JSON export writer and reader.

use crate::model::user::UserRecord;
use log::{error, info};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name written inside the export directory. Re-exporting overwrites it.
pub const EXPORT_FILE_NAME: &str = "users_export.json";

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O failure at `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("export serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes `users` as a pretty-printed JSON array to `sink`.
pub fn write_json<W: Write>(users: &[UserRecord], mut sink: W) -> ExportResult<()> {
    serde_json::to_writer_pretty(&mut sink, users).map_err(|err| {
        if err.is_io() {
            sink_error(err.into())
        } else {
            ExportError::Serialize(err)
        }
    })?;
    sink.write_all(b"\n")
        .and_then(|()| sink.flush())
        .map_err(sink_error)
}

fn sink_error(source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: "<sink>".to_string(),
        source,
    }
}

/// Parses an export produced by [`write_json`].
pub fn read_json<R: Read>(source: R) -> ExportResult<Vec<UserRecord>> {
    Ok(serde_json::from_reader(source)?)
}

/// Writes `users` to `<dir>/users_export.json`, creating `dir` if needed.
///
/// Returns the resolved path of the written file.
pub fn export_to_dir(users: &[UserRecord], dir: impl AsRef<Path>) -> ExportResult<PathBuf> {
    let dir = dir.as_ref();
    let path = dir.join(EXPORT_FILE_NAME);

    let result = fs::create_dir_all(dir)
        .and_then(|()| File::create(&path))
        .map_err(|source| io_error(&path, source))
        .and_then(|file| write_json(users, BufWriter::new(file)))
        .map_err(|err| match err {
            ExportError::Io { source, .. } => io_error(&path, source),
            other => other,
        });

    match result {
        Ok(()) => {
            info!(
                "event=export module=export status=ok rows={} path={}",
                users.len(),
                path.display()
            );
            Ok(path)
        }
        Err(err) => {
            error!(
                "event=export module=export status=error rows={} error={}",
                users.len(),
                err
            );
            Err(err)
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::{read_json, write_json, ExportError};
    use crate::model::user::UserRecord;
    use chrono::{TimeZone, Utc};
    use std::io::{self, Write};

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sample() -> Vec<UserRecord> {
        vec![UserRecord {
            id: 3,
            name: "Anna".to_string(),
            email: "ann@x.com".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }]
    }

    #[test]
    fn output_is_pretty_array_with_all_fields() {
        let mut buf = Vec::new();
        write_json(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("[\n"));
        for field in [
            "\"id\": 3",
            "\"name\": \"Anna\"",
            "\"email\": \"ann@x.com\"",
            "\"created_at\": \"2024-03-01T12:00:00Z\"",
        ] {
            assert!(text.contains(field), "missing {field} in {text}");
        }
        assert_eq!(read_json(text.as_bytes()).unwrap(), sample());
    }

    #[test]
    fn empty_store_exports_empty_array() {
        let mut buf = Vec::new();
        write_json(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim(), "[]");
    }

    #[test]
    fn sink_failure_is_reported_as_io() {
        let err = write_json(&sample(), BrokenSink).unwrap_err();
        match err {
            ExportError::Io { path, source } => {
                assert_eq!(path, "<sink>");
                assert_eq!(source.kind(), io::ErrorKind::Other);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
