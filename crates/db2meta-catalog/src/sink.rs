//! Record sink for the importer's CSV format

use crate::adapter::ExtractError;
use db2meta_core::{to_records, Metadata};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes each completed table as one record group
///
/// Every group is flushed as soon as it is written, so output already in the
/// sink survives a failure later in the run.
pub struct CsvSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the table record, its column records and the closing blank line
    pub async fn write(&mut self, meta: &Metadata) -> Result<(), ExtractError> {
        self.writer.write_all(to_records(meta).as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
