use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use csv::{Terminator, WriterBuilder};
use log::{debug, warn};
use ri_common::error::{ListingError, ListingErrorKind};
use tokio::fs;

/// CSV rows buffered in memory until the whole listing is known.
pub struct CsvOutput {
    _destination: PathBuf,
    _writer: csv::Writer<Vec<u8>>,
    _rows: usize,
}

impl CsvOutput {
    pub fn new<P, I, S>(destination: P, header: I) -> Result<Self, ListingError>
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut output = Self {
            _destination: destination.into(),
            _writer: WriterBuilder::new()
                .terminator(Terminator::Any(b'\n'))
                .from_writer(vec![]),
            _rows: 0,
        };

        output._write(header)?;
        Ok(output)
    }

    fn _error<E>(&self, error: E) -> ListingError
    where
        E: ToString,
    {
        ListingError::new(
            ListingErrorKind::OutputWriteError,
            self._destination.to_string_lossy(),
            error.to_string(),
        )
    }

    fn _write<I, S>(&mut self, fields: I) -> Result<(), ListingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self._writer
            .write_record(fields)
            .map_err(|e| self._error(e))
    }

    pub fn push<I, S>(&mut self, fields: I) -> Result<(), ListingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self._write(fields)?;
        self._rows += 1;
        Ok(())
    }

    /// Data rows so far, excluding the header.
    pub fn rows(&self) -> usize {
        self._rows
    }

    pub fn destination(&self) -> &Path {
        &self._destination
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, ListingError> {
        let destination = self._destination;
        self._writer.into_inner().map_err(|e| {
            ListingError::new(
                ListingErrorKind::OutputWriteError,
                destination.to_string_lossy(),
                e.to_string(),
            )
        })
    }

    /// Write everything to a sibling temporary file, then rename it over the destination.
    pub async fn persist(self) -> Result<usize, ListingError> {
        let rows = self._rows;
        let destination = self._destination.clone();
        let error = |e: io::Error| {
            ListingError::new(
                ListingErrorKind::OutputWriteError,
                destination.to_string_lossy(),
                e.to_string(),
            )
        };

        let data = self.into_bytes()?;

        let mut temporary = OsString::from(destination.as_os_str());
        temporary.push(".tmp");
        let temporary = PathBuf::from(temporary);

        debug!("Writing {} bytes to {}", data.len(), temporary.display());
        fs::write(&temporary, &data).await.map_err(error)?;

        if let Err(e) = fs::rename(&temporary, &destination).await {
            if let Err(cleanup) = fs::remove_file(&temporary).await {
                warn!("Unable to remove {}: {cleanup}", temporary.display());
            }
            return Err(error(e));
        }

        Ok(rows)
    }
}
