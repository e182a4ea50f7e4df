//! Compressed CSV to Parquet transcoding
//!
//! Reads a gzipped CSV archive and writes a Parquet sibling file with the
//! same logical rows. Column types are inferred from the content, no
//! explicit schema is supplied. The input archive is left in place.

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use eyre::{Context, Result, bail};
use flate2::read::GzDecoder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SOURCE_SUFFIX: &str = ".csv.gz";

/// Transcode a `.csv.gz` file into a Parquet sibling file.
///
/// The output lands next to the input with the suffix replaced by
/// `.parquet`. Re-running on the same input rewrites the same output, rows
/// never accumulate.
///
/// # Errors
/// Returns an error, without producing an output file, if the input
/// filename does not end in `.csv.gz`. Also errors on unreadable input or
/// a failed write. These are local errors; retrying will not help.
pub fn transcode(src: &Path) -> Result<PathBuf> {
    let Some(file_name) = src.file_name().and_then(|name| name.to_str()) else {
        bail!("Source path {} has no usable filename", src.display());
    };
    let Some(stem) = file_name.strip_suffix(SOURCE_SUFFIX) else {
        bail!("Can only accept source files in compressed CSV format, got {file_name}");
    };
    let dest = src.with_file_name(format!("{stem}.parquet"));

    // First pass over the archive infers the column types
    let format = Format::default().with_header(true);
    let reader = gz_reader(src)?;
    let (schema, _) = format
        .infer_schema(reader, None)
        .wrap_err_with(|| format!("Failed to infer schema from {}", src.display()))?;
    let schema = Arc::new(schema);

    // Second pass streams record batches into the Parquet writer
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(gz_reader(src)?)
        .wrap_err_with(|| format!("Failed to open CSV reader for {}", src.display()))?;

    let output = File::create(&dest)
        .wrap_err_with(|| format!("Failed to create {}", dest.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(output, schema, Some(props))
        .wrap_err_with(|| format!("Failed to open Parquet writer for {}", dest.display()))?;

    let mut rows = 0;
    for batch in reader {
        let batch = batch.wrap_err_with(|| format!("Failed to read rows from {}", src.display()))?;
        rows += batch.num_rows();
        writer
            .write(&batch)
            .wrap_err_with(|| format!("Failed to write rows to {}", dest.display()))?;
    }
    writer
        .close()
        .wrap_err_with(|| format!("Failed to finalize {}", dest.display()))?;

    log::info!("Transcoded {} rows from {} to {}", rows, src.display(), dest.display());
    Ok(dest)
}

fn gz_reader(src: &Path) -> Result<GzDecoder<BufReader<File>>> {
    let file =
        File::open(src).wrap_err_with(|| format!("Failed to open {}", src.display()))?;
    Ok(GzDecoder::new(BufReader::new(file)))
}
