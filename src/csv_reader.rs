use std::fs::File;
use std::io;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LoadError;

pub const REQUIRED_COLUMNS: &[&str] = &[
    "sports",
    "country",
    "views",
    "continent",
    "age",
    "gender",
    "occupation",
    "time",
];

/// One viewer's record. Columns are matched by header name, so their order in
/// the file does not matter and extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub sports: String,
    pub continent: String,
    pub gender: String,
    pub occupation: String,
    #[serde(deserialize_with = "whole_number")]
    pub age: u32,
    pub time: String,
    pub views: f64,
}

/// Spreadsheet exports write integer columns as `25.0`; accept those but
/// still reject fractional or negative ages.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a whole non-negative number, got {}",
            value
        )))
    }
}

pub fn read_data<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_from(file)
}

pub fn read_from<R: io::Read>(reader: R) -> Result<Vec<Record>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Malformed { row: 1, source })?
        .clone();
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut records = Vec::<Record>::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        // header is row 1
        let row = idx as u64 + 2;
        let record: Record = result.map_err(|source| LoadError::Malformed { row, source })?;
        validate(&record, row)?;
        records.push(record);
    }
    debug!("read {} records", records.len());
    Ok(records)
}

fn validate(record: &Record, row: u64) -> Result<(), LoadError> {
    let categories = [
        ("country", &record.country),
        ("sports", &record.sports),
        ("continent", &record.continent),
        ("gender", &record.gender),
        ("occupation", &record.occupation),
        ("time", &record.time),
    ];
    for (column, value) in categories {
        if value.is_empty() {
            return Err(LoadError::InvalidField {
                row,
                column,
                reason: "empty value".to_string(),
            });
        }
    }
    if !record.views.is_finite() || record.views < 0.0 {
        return Err(LoadError::InvalidField {
            row,
            column: "views",
            reason: format!("expected a non-negative number, got {}", record.views),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "sports,country,views,continent,age,gender,occupation,time";

    #[test]
    fn reads_rows_by_header_name() {
        let data = "time,views,age,sports,country,continent,gender,occupation,extra\n\
                    morning,10,25,athletics,USA,NA,male,student,x\n";
        let records = read_from(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country, "USA");
        assert_eq!(records[0].time, "morning");
        assert_eq!(records[0].views, 10.0);
        assert_eq!(records[0].age, 25);
    }

    #[test]
    fn accepts_whole_float_ages() {
        let data = format!(
            "{}\nathletics,USA,10,NA,25.0,male,student,morning\nswimming,UK,3,EU,31,female,teacher,night\n",
            HEADER
        );
        let records = read_from(data.as_bytes()).unwrap();
        assert_eq!(records[0].age, 25);
        assert_eq!(records[1].age, 31);
    }

    #[test]
    fn rejects_fractional_and_negative_ages() {
        for age in ["25.5", "-3", "NaN"] {
            let data = format!("{}\nathletics,USA,10,NA,{},male,student,morning\n", HEADER, age);
            match read_from(data.as_bytes()) {
                Err(LoadError::Malformed { row, .. }) => assert_eq!(row, 2, "age {}", age),
                other => panic!("age {} gave {:?}", age, other),
            }
        }
    }

    #[test]
    fn reports_every_missing_column() {
        let data = "sports,country,continent,age,gender,occupation\nathletics,USA,NA,25,male,student\n";
        match read_from(data.as_bytes()) {
            Err(LoadError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["views".to_string(), "time".to_string()])
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_input_is_missing_every_column() {
        match read_from("".as_bytes()) {
            Err(LoadError::MissingColumns(missing)) => assert_eq!(missing.len(), 8),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let data = format!("{}\nathletics,USA,lots,NA,25,male,student,morning\n", HEADER);
        match read_from(data.as_bytes()) {
            Err(LoadError::Malformed { row, .. }) => assert_eq!(row, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_negative_views() {
        let data = format!(
            "{}\nathletics,USA,1,NA,25,male,student,morning\nathletics,USA,-3,NA,25,male,student,morning\n",
            HEADER
        );
        match read_from(data.as_bytes()) {
            Err(LoadError::InvalidField { row, column, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(column, "views");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_empty_category() {
        let data = format!("{}\nathletics,,1,NA,25,male,student,morning\n", HEADER);
        match read_from(data.as_bytes()) {
            Err(LoadError::InvalidField { column, .. }) => assert_eq!(column, "country"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_data("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
