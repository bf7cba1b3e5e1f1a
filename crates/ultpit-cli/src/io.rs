//! Block value ingestion and selection output.
//!
//! Value files are either one number per line or a GSLIB GEOEAS table; either
//! may be gzip-compressed, recognised by a `.gz` suffix. Selections are
//! written as one `0`/`1` line per block per realization.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use ultpit::{BlockValues, InputConfig, InputFormat, PitSolution, UltpitError};

use crate::error::{CliError, CliResult};

/// Title, column count and column name written ahead of stdout output.
pub const OUTPUT_HEADER: [&str; 3] = ["ultpit output", "1", "Pit"];

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

fn open_values(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads every realization from `path`.
///
/// Consecutive runs of `block_count` values form realizations.
pub fn read_values(path: &Path, input: &InputConfig, block_count: usize) -> CliResult<BlockValues> {
    let reader = open_values(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let stream = match input.format {
        InputFormat::Plain => parse_plain(reader)?,
        InputFormat::Geoeas => parse_geoeas(reader, input.ebv_column)?,
    };
    info!(
        event = "values_read",
        path = %path.display(),
        values = stream.len(),
    );

    Ok(BlockValues::from_stream(stream, block_count)?)
}

fn read_error(line: usize, err: io::Error) -> UltpitError {
    UltpitError::InputData(format!("line {line}: {err}"))
}

fn parse_value(token: &str, line: usize) -> Result<f64, UltpitError> {
    token
        .parse()
        .map_err(|_| UltpitError::InputData(format!("line {line}: invalid value {token:?}")))
}

/// One value per line. Blank lines are skipped.
pub fn parse_plain<R: BufRead>(reader: R) -> Result<Vec<f64>, UltpitError> {
    let mut values = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| read_error(idx + 1, e))?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        values.push(parse_value(token, idx + 1)?);
    }
    Ok(values)
}

/// GEOEAS table: a title line, the column count, one name per column, then
/// whitespace-separated rows. Takes the 1-based `column` of every row.
pub fn parse_geoeas<R: BufRead>(reader: R, column: usize) -> Result<Vec<f64>, UltpitError> {
    let mut lines = reader.lines().enumerate();
    let mut header_line = |what: &str| -> Result<String, UltpitError> {
        match lines.next() {
            Some((idx, line)) => line.map_err(|e| read_error(idx + 1, e)),
            None => Err(UltpitError::InputData(format!(
                "GEOEAS header ends before the {what}"
            ))),
        }
    };

    header_line("title")?;
    let count_line = header_line("column count")?;
    let columns: usize = count_line
        .split_whitespace()
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| {
            UltpitError::InputData(format!("line 2: invalid column count {count_line:?}"))
        })?;
    if column == 0 || column > columns {
        return Err(UltpitError::InputData(format!(
            "value column {column} is outside the {columns} GEOEAS columns"
        )));
    }
    for _ in 0..columns {
        header_line("column names")?;
    }

    let mut values = Vec::new();
    for (idx, line) in lines {
        let line = line.map_err(|e| read_error(idx + 1, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let token = line.split_whitespace().nth(column - 1).ok_or_else(|| {
            UltpitError::InputData(format!("line {}: missing column {column}", idx + 1))
        })?;
        values.push(parse_value(token, idx + 1)?);
    }
    Ok(values)
}

/// Writes one `0`/`1` line per block, realization after realization.
pub fn write_rows<W: Write>(w: &mut W, pit: &PitSolution) -> io::Result<()> {
    for r in 0..pit.realization_count() {
        for &selected in pit.selection(r) {
            writeln!(w, "{}", u8::from(selected))?;
        }
    }
    Ok(())
}

/// Writes the selections to `output`, or to stdout with a GEOEAS header.
///
/// Files are staged next to their destination and renamed into place once
/// complete, so a failure leaves any existing file untouched.
pub fn write_selections(output: Option<&Path>, pit: &PitSolution) -> CliResult<()> {
    match output {
        None => write_stdout(pit).map_err(|source| CliError::Write {
            path: PathBuf::from("<stdout>"),
            source,
        }),
        Some(path) => {
            write_file(path, pit).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(event = "selection_written", path = %path.display());
            Ok(())
        }
    }
}

fn write_stdout(pit: &PitSolution) -> io::Result<()> {
    let stdout = io::stdout();
    let mut w = BufWriter::new(stdout.lock());
    for line in OUTPUT_HEADER {
        writeln!(w, "{line}")?;
    }
    write_rows(&mut w, pit)?;
    w.flush()
}

fn write_file(path: &Path, pit: &PitSolution) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;

    if is_gzip(path) {
        let mut enc = GzEncoder::new(BufWriter::new(staged.as_file_mut()), Compression::default());
        write_rows(&mut enc, pit)?;
        enc.finish()?.flush()?;
    } else {
        let mut w = BufWriter::new(staged.as_file_mut());
        write_rows(&mut w, pit)?;
        w.flush()?;
    }

    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
#[path = "io_tests.rs"]
mod tests;
