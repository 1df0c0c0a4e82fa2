//! Cleaning steps applied to raw records before training.
//!
//! Each step takes ownership of the records and returns the cleaned rows.
//! [`bank_marketing`] chains them into the preset used for the bank
//! marketing campaign data.
use super::dataset::{Dataset, Record};
use crate::error::TreeError;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

fn check_column(records: &[Record], column: usize) -> Result<(), TreeError> {
    match records.first() {
        Some(first) if column >= first.len() => Err(TreeError::ColumnOutOfRange {
            column,
            n_columns: first.len(),
        }),
        _ => Ok(()),
    }
}

/// Drops every record with at least one empty field.
pub fn drop_incomplete(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(row, record)| {
            if record.iter().any(String::is_empty) {
                debug!(row, "dropping record with missing values");
                None
            } else {
                Some(record)
            }
        })
        .collect()
}

/// Removes one column from every record.
pub fn drop_column(mut records: Vec<Record>, column: usize) -> Result<Vec<Record>, TreeError> {
    check_column(&records, column)?;
    for record in &mut records {
        record.remove(column);
    }
    Ok(records)
}

/// Replaces category names with codes, matching names case-insensitively.
///
/// Values without an entry in `mapping` become `default`.
pub fn encode_categories(
    mut records: Vec<Record>,
    column: usize,
    mapping: &[(&str, &str)],
    default: &str,
) -> Result<Vec<Record>, TreeError> {
    check_column(&records, column)?;
    for record in &mut records {
        let code = mapping
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&record[column]))
            .map_or(default, |&(_, code)| code);
        record[column] = code.to_string();
    }
    Ok(records)
}

/// Rewrites a column as `"true"` where it equals `truthy` and `"false"` elsewhere.
pub fn encode_booleans(
    mut records: Vec<Record>,
    column: usize,
    truthy: &str,
) -> Result<Vec<Record>, TreeError> {
    check_column(&records, column)?;
    for record in &mut records {
        let value = record[column] == truthy;
        record[column] = value.to_string();
    }
    Ok(records)
}

/// Parses the given columns as integers and writes them back in canonical form.
pub fn parse_integers(mut records: Vec<Record>, columns: &[usize]) -> Result<Vec<Record>, TreeError> {
    for &column in columns {
        check_column(&records, column)?;
    }
    for (row, record) in records.iter_mut().enumerate() {
        for &column in columns {
            let value: i64 = record[column]
                .trim()
                .parse()
                .map_err(|_| TreeError::InvalidNumber {
                    row,
                    column,
                    value: record[column].clone(),
                })?;
            record[column] = value.to_string();
        }
    }
    Ok(records)
}

/// Keeps records whose integer value in `column` lies in `min..=max`.
///
/// Records that don't hold an integer there are dropped as well.
pub fn filter_range(
    records: Vec<Record>,
    column: usize,
    min: i64,
    max: i64,
) -> Result<Vec<Record>, TreeError> {
    check_column(&records, column)?;
    Ok(records
        .into_iter()
        .enumerate()
        .filter(|(row, record)| match record[column].trim().parse::<i64>() {
            Ok(value) => (min..=max).contains(&value),
            Err(_) => {
                warn!(row, column, value = %record[column], "dropping record with non-integer value");
                false
            }
        })
        .map(|(_, record)| record)
        .collect())
}

/// Rescales a numeric column to zero mean and unit (population) variance.
///
/// Values are written back with six decimal places.
pub fn standardize(mut records: Vec<Record>, column: usize) -> Result<Vec<Record>, TreeError> {
    check_column(&records, column)?;
    if records.is_empty() {
        return Ok(records);
    }

    let values = records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            record[column]
                .trim()
                .parse::<f64>()
                .map_err(|_| TreeError::InvalidNumber {
                    row,
                    column,
                    value: record[column].clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt();
    if std_dev == 0.0 {
        return Err(TreeError::ZeroVariance { column });
    }

    for (record, value) in records.iter_mut().zip(values) {
        record[column] = format!("{:.6}", (value - mean) / std_dev);
    }
    Ok(records)
}

/// Replaces a nominal column with one `"1"`/`"0"` indicator column per category.
///
/// Indicators take the column's place, ordered by category name.
pub fn one_hot(mut records: Vec<Record>, column: usize) -> Result<Vec<Record>, TreeError> {
    check_column(&records, column)?;
    let categories: Vec<String> = records
        .iter()
        .map(|record| record[column].clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    for record in &mut records {
        let mut tail = record.split_off(column);
        let value = tail.remove(0);
        record.extend(
            categories
                .iter()
                .map(|category| if *category == value { "1" } else { "0" }.to_string()),
        );
        record.extend(tail);
    }
    Ok(records)
}

// Column positions once the leading id column is gone.
const JOB: usize = 1;
const MARITAL: usize = 2;
const EDUCATION: usize = 3;
const BALANCE: usize = 5;
const AGE: usize = 0;
const INTEGER_COLUMNS: [usize; 7] = [0, 5, 9, 11, 12, 13, 14];
const YES_NO_COLUMNS: [usize; 4] = [4, 6, 7, 16];

/// Cleaning preset for the bank marketing campaign data.
///
/// Expects the header to be stripped already. Drops incomplete rows and the
/// id column, encodes marital status and education as codes, checks the
/// integer columns, keeps ages 0 to 120, turns yes/no columns into
/// `true`/`false`, standardizes the balance and one-hot encodes the job.
pub fn bank_marketing(dataset: Dataset) -> Result<Dataset, TreeError> {
    let n_raw = dataset.len();
    let mut records = drop_incomplete(dataset.into_records());
    records = drop_column(records, 0)?;
    records = encode_categories(
        records,
        EDUCATION,
        &[("tertiary", "3"), ("secondary", "2"), ("primary", "1")],
        "0",
    )?;
    records = encode_categories(
        records,
        MARITAL,
        &[("married", "1"), ("single", "2"), ("divorced", "3")],
        "0",
    )?;
    records = parse_integers(records, &INTEGER_COLUMNS)?;
    records = filter_range(records, AGE, 0, 120)?;
    for column in YES_NO_COLUMNS {
        records = encode_booleans(records, column, "yes")?;
    }
    records = standardize(records, BALANCE)?;
    records = one_hot(records, JOB)?;

    let cleaned = Dataset::new(records)?;
    info!(
        n_raw,
        n_cleaned = cleaned.len(),
        n_columns = cleaned.n_columns(),
        "data cleaning completed"
    );
    Ok(cleaned)
}
