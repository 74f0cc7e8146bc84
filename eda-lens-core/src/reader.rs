use crate::dataset::Dataset;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use eda_lens_common::Result;
use memmap2::Mmap;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::path::Path;
use tracing::debug;

/// Loads a whole Parquet file into a [`Dataset`].
pub fn open_parquet_dataset(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    // memory-map, then copy once into an owned buffer the reader can hold
    let mmap: Mmap = unsafe { Mmap::map(&file)? };
    let dataset = read_parquet_bytes(Bytes::copy_from_slice(&mmap))?;
    debug!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "loaded parquet dataset"
    );
    Ok(dataset)
}

/// Decodes an in-memory Parquet file, concatenating every record batch.
pub fn read_parquet_bytes(bytes: Bytes) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;
    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;
    Ok(Dataset::new(batch))
}
