//! Streaming record loader.
//!
//! Opens a (possibly compressed) delimited storm event file, resolves the
//! eight analysis columns from its header, and yields one
//! [`RawEventRecord`] per row. Rows with an unparseable timestamp, count or
//! amount are skipped and counted rather than failing the load.
//!
//! The file handle and decompression stream live inside [`EventRecords`]
//! and are released when it is dropped, whether or not iteration ran to
//! completion.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use csv::ByteRecord;
use storm_impact_source_models::{MalformedField, MalformedRowError, RawEventRecord};

use crate::SourceError;
use crate::dataset_def::{Compression, DatasetDefinition};
use crate::parsing::{parse_amount, parse_begin_date, parse_count};
use crate::progress::{ProgressCallback, null_progress};

/// Rows between progress updates.
const PROGRESS_BATCH: u64 = 10_000;

// Slots in `ColumnMapping::names()` order.
const CATEGORY: usize = 0;
const OCCURRED_AT: usize = 1;
const FATALITIES: usize = 2;
const INJURIES: usize = 3;
const PROPERTY_DAMAGE: usize = 4;
const PROPERTY_DAMAGE_UNIT: usize = 5;
const CROP_DAMAGE: usize = 6;
const CROP_DAMAGE_UNIT: usize = 7;

/// Row counts gathered while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows read from the file (excluding the header).
    pub rows_read: u64,
    /// Rows skipped because a field could not be parsed.
    pub malformed_rows: u64,
}

/// Opens storm event files described by a [`DatasetDefinition`].
pub struct RecordLoader<'a> {
    definition: &'a DatasetDefinition,
    progress: Arc<dyn ProgressCallback>,
}

impl<'a> RecordLoader<'a> {
    /// Creates a loader for the given dataset layout with no progress
    /// reporting.
    #[must_use]
    pub fn new(definition: &'a DatasetDefinition) -> Self {
        Self {
            definition,
            progress: null_progress(),
        }
    }

    /// Reports rows read to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Opens `path`, decompressing it according to the dataset's
    /// compression setting, and reads the header row.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be opened or decompressed,
    /// or if any required column is missing from the header.
    pub fn open(&self, path: &Path) -> Result<EventRecords, SourceError> {
        let compression = self.definition.compression.resolve(path);
        log::info!(
            "[{}] Opening {} (compression: {compression})",
            self.definition.id(),
            path.display()
        );

        let file = File::open(path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let reader: Box<dyn Read> = match compression {
            Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(BufReader::new(file))),
            Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(BufReader::new(file))),
            Compression::Zstd => Box::new(zstd::Decoder::new(file).map_err(|e| SourceError::Io {
                path: path.display().to_string(),
                source: e,
            })?),
            Compression::None | Compression::Auto => Box::new(BufReader::new(file)),
        };

        self.read(reader, &path.display().to_string())
    }

    /// Reads records from an already-open, already-decompressed stream.
    /// `label` names the stream in errors and log messages.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the header row cannot be read or any
    /// required column is missing from it.
    pub fn read(
        &self,
        reader: Box<dyn Read>,
        label: &str,
    ) -> Result<EventRecords, SourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.definition.delimiter_byte()?)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| csv_error(label, e))?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let names = self.definition.columns.names();
        let mut indices = [0usize; 8];
        for (slot, name) in names.iter().enumerate() {
            indices[slot] = headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SourceError::MissingColumn {
                    path: label.to_owned(),
                    column: (*name).to_owned(),
                })?;
        }

        log::debug!(
            "[{}] Resolved columns {names:?} to indices {indices:?}",
            self.definition.id()
        );

        self.progress
            .set_message(format!("Reading {}", self.definition.name()));

        Ok(EventRecords {
            reader: csv_reader,
            row: ByteRecord::new(),
            indices,
            column_names: names.map(str::to_owned),
            date_format: self.definition.date_format.clone(),
            label: label.to_owned(),
            progress: self.progress.clone(),
            stats: LoadStats::default(),
            finished: false,
        })
    }
}

/// Lazy sequence of [`RawEventRecord`]s read from one source file.
///
/// Yields `Err` only for failures that abort the load (I/O, decompression
/// or framing errors); iteration stops after the first one. Malformed rows
/// are skipped and counted in [`Self::stats`].
pub struct EventRecords {
    reader: csv::Reader<Box<dyn Read>>,
    row: ByteRecord,
    indices: [usize; 8],
    column_names: [String; 8],
    date_format: String,
    label: String,
    progress: Arc<dyn ProgressCallback>,
    stats: LoadStats,
    finished: bool,
}

impl EventRecords {
    /// Row counts so far. Final once the iterator has returned `None`.
    #[must_use]
    pub const fn stats(&self) -> LoadStats {
        self.stats
    }

    fn field(&self, slot: usize) -> Cow<'_, str> {
        String::from_utf8_lossy(self.row.get(self.indices[slot]).unwrap_or_default())
    }

    fn malformed(&self, line: u64, slot: usize, field: MalformedField) -> MalformedRowError {
        MalformedRowError {
            line,
            column: self.column_names[slot].clone(),
            value: self.field(slot).into_owned(),
            field,
        }
    }

    /// Projects the current row onto the analysis columns.
    fn project(&self, line: u64) -> Result<RawEventRecord, MalformedRowError> {
        let occurred_at = parse_begin_date(&self.field(OCCURRED_AT), &self.date_format)
            .ok_or_else(|| self.malformed(line, OCCURRED_AT, MalformedField::Timestamp))?;
        let fatalities = parse_count(&self.field(FATALITIES))
            .ok_or_else(|| self.malformed(line, FATALITIES, MalformedField::Count))?;
        let injuries = parse_count(&self.field(INJURIES))
            .ok_or_else(|| self.malformed(line, INJURIES, MalformedField::Count))?;
        let property_damage = parse_amount(&self.field(PROPERTY_DAMAGE))
            .ok_or_else(|| self.malformed(line, PROPERTY_DAMAGE, MalformedField::Amount))?;
        let crop_damage = parse_amount(&self.field(CROP_DAMAGE))
            .ok_or_else(|| self.malformed(line, CROP_DAMAGE, MalformedField::Amount))?;

        Ok(RawEventRecord {
            category: self.field(CATEGORY).into_owned(),
            occurred_at,
            fatalities,
            injuries,
            property_damage,
            property_damage_unit: self.field(PROPERTY_DAMAGE_UNIT).into_owned(),
            crop_damage,
            crop_damage_unit: self.field(CROP_DAMAGE_UNIT).into_owned(),
        })
    }

    fn finish(&mut self) {
        self.finished = true;
        self.progress.inc(self.stats.rows_read % PROGRESS_BATCH);

        let LoadStats {
            rows_read,
            malformed_rows,
        } = self.stats;
        if malformed_rows > 0 {
            log::warn!("[{}] Skipped {malformed_rows} malformed rows", self.label);
        }
        log::info!(
            "[{}] Read {rows_read} rows ({malformed_rows} malformed)",
            self.label
        );
        self.progress
            .finish(format!("Read {rows_read} rows from {}", self.label));
    }
}

impl Iterator for EventRecords {
    type Item = Result<RawEventRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.reader.read_byte_record(&mut self.row) {
                Ok(true) => {}
                Ok(false) => {
                    self.finish();
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(csv_error(&self.label, e)));
                }
            }

            self.stats.rows_read += 1;
            if self.stats.rows_read % PROGRESS_BATCH == 0 {
                self.progress.inc(PROGRESS_BATCH);
            }

            let line = self
                .row
                .position()
                .map_or(self.stats.rows_read + 1, csv::Position::line);

            match self.project(line) {
                Ok(record) => return Some(Ok(record)),
                Err(malformed) => {
                    log::debug!("[{}] Skipping {malformed}", self.label);
                    self.stats.malformed_rows += 1;
                }
            }
        }
    }
}

/// Converts a CSV error, surfacing decompression/read failures as I/O
/// errors.
fn csv_error(label: &str, e: csv::Error) -> SourceError {
    let io_kind = match e.kind() {
        csv::ErrorKind::Io(io) => Some(io.kind()),
        _ => None,
    };
    match io_kind {
        Some(kind) => SourceError::Io {
            path: label.to_owned(),
            source: std::io::Error::new(kind, e),
        },
        None => SourceError::Csv {
            path: label.to_owned(),
            source: e,
        },
    }
}
