use crate::error::TreeError;
use crate::trees::node::SplitRule;
use csv::{ReaderBuilder, WriterBuilder};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt::{self, Debug, Formatter};
use std::path::Path;
use tracing::debug;

/// A single row: attribute fields followed by the class label.
pub type Record = Vec<String>;

/// A rectangular collection of string-typed records.
///
/// The final field of every record is the class label. All records share the
/// same field count, which is checked on construction.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    records: Vec<Record>,
    n_columns: usize,
}

impl Debug for Dataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    records: [\n")?;

        for record in &self.records {
            write!(f, "        [")?;
            for field in record {
                write!(f, "{:?}, ", field)?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ]\n}}")
    }
}

impl Dataset {
    /// Creates a dataset, checking that every record has the same number of fields.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyRecord`] if a record has no fields and
    /// [`TreeError::RaggedRecord`] if field counts differ.
    pub fn new(records: Vec<Record>) -> Result<Self, TreeError> {
        let n_columns = records.first().map_or(0, Vec::len);
        for (row, record) in records.iter().enumerate() {
            if record.is_empty() {
                return Err(TreeError::EmptyRecord { row });
            }
            if record.len() != n_columns {
                return Err(TreeError::RaggedRecord {
                    row,
                    expected: n_columns,
                    got: record.len(),
                });
            }
        }
        Ok(Self { records, n_columns })
    }

    /// Builds a dataset from borrowed string rows.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::new`].
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Self, TreeError> {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|field| field.as_ref().to_string()).collect())
                .collect(),
        )
    }

    // Rows taken from an already validated dataset keep its shape.
    fn from_validated(records: Vec<Record>, n_columns: usize) -> Self {
        Self { records, n_columns }
    }

    /// Reads a delimited file into a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Csv`] if the file can't be read or parsed, and the
    /// shape errors of [`Dataset::new`].
    pub fn from_csv<P: AsRef<Path>>(path: P, has_headers: bool) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let csv_error = |source| TreeError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(csv_error)?;
            records.push(record.iter().map(str::to_string).collect());
        }
        debug!(path = %path.display(), n_records = records.len(), "read csv");

        Self::new(records)
    }

    /// Writes every record as one delimited line.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Csv`] if the file can't be written.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), TreeError> {
        let path = path.as_ref();
        let csv_error = |source| TreeError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = WriterBuilder::new().from_path(path).map_err(csv_error)?;
        for record in &self.records {
            writer.write_record(record).map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|err| csv_error(csv::Error::from(err)))?;
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of fields per record, label included.
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Number of attribute columns, i.e. every column but the label.
    pub fn n_attributes(&self) -> usize {
        self.n_columns.saturating_sub(1)
    }

    /// Column holding the class label.
    pub fn label_index(&self) -> usize {
        self.n_attributes()
    }

    /// Label of a single record.
    pub fn label_of(record: &[String]) -> &str {
        record.last().map_or("", String::as_str)
    }

    /// Labels of all records, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.column(self.label_index())
    }

    /// Values of one column, in record order.
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.records.iter().map(|r| r[index].as_str()).collect()
    }

    /// Splits the records in two by the given rule.
    ///
    /// Rows matching `rule` against `value` in column `attribute` go to the
    /// left dataset, all others to the right. Both halves own copies of
    /// their rows.
    pub fn partition(&self, attribute: usize, value: &str, rule: SplitRule) -> (Self, Self) {
        let (left, right): (Vec<Record>, Vec<Record>) = self
            .records
            .iter()
            .cloned()
            .partition(|record| rule.goes_left(&record[attribute], value));

        (
            Self::from_validated(left, self.n_columns),
            Self::from_validated(right, self.n_columns),
        )
    }

    /// Splits records by whether their label equals `label`.
    pub fn partition_by_label(&self, label: &str) -> (Self, Self) {
        let (matching, other): (Vec<Record>, Vec<Record>) = self
            .records
            .iter()
            .cloned()
            .partition(|record| Self::label_of(record) == label);

        (
            Self::from_validated(matching, self.n_columns),
            Self::from_validated(other, self.n_columns),
        )
    }

    /// Appends the records of `other`, which must have the same shape.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::RaggedRecord`] if the field counts differ.
    pub fn extend(&mut self, other: Self) -> Result<(), TreeError> {
        if self.records.is_empty() {
            *self = other;
            return Ok(());
        }
        if !other.is_empty() && other.n_columns != self.n_columns {
            return Err(TreeError::RaggedRecord {
                row: self.records.len(),
                expected: self.n_columns,
                got: other.n_columns,
            });
        }
        self.records.extend(other.records);
        Ok(())
    }

    /// Draws `sample_size` records uniformly with replacement.
    pub fn samples<R: Rng + ?Sized>(&self, sample_size: usize, rng: &mut R) -> Self {
        if self.records.is_empty() {
            return Self::from_validated(Vec::new(), self.n_columns);
        }
        let nrows = self.records.len();
        let sampled = (0..sample_size)
            .map(|_| self.records[rng.gen_range(0..nrows)].clone())
            .collect();
        Self::from_validated(sampled, self.n_columns)
    }

    /// Reorders the records uniformly at random.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.records.shuffle(rng);
    }

    /// Shuffles, then holds out the trailing `test_ratio` share of the records.
    ///
    /// The first half holds `floor(n * (1 - test_ratio))` records.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidRatio`] if `test_ratio` is outside `[0, 1]`.
    pub fn train_test_split<R: Rng + ?Sized>(
        &self,
        test_ratio: f64,
        rng: &mut R,
    ) -> Result<(Self, Self), TreeError> {
        if !(0.0..=1.0).contains(&test_ratio) {
            return Err(TreeError::InvalidRatio { ratio: test_ratio });
        }

        let mut records = self.records.clone();
        records.shuffle(rng);
        let split_index = (records.len() as f64 * (1.0 - test_ratio)).floor() as usize;
        let test = records.split_off(split_index);

        Ok((
            Self::from_validated(records, self.n_columns),
            Self::from_validated(test, self.n_columns),
        ))
    }
}
