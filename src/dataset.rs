use std::fmt;
use std::path::Path;

use indexmap::IndexSet;
use serde::Serialize;

use crate::csv_reader::{read_data, Record};
use crate::error::LoadError;

const COLUMNS: &'static [Column] = &[
    Column::Country,
    Column::Sports,
    Column::Continent,
    Column::Gender,
    Column::Occupation,
    Column::Time,
];

/// Categorical columns whose vocabulary is discovered from the loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Country,
    Sports,
    Continent,
    Gender,
    Occupation,
    Time,
}

impl Column {
    pub fn all() -> &'static [Column] {
        COLUMNS
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Country => "country",
            Column::Sports => "sports",
            Column::Continent => "continent",
            Column::Gender => "gender",
            Column::Occupation => "occupation",
            Column::Time => "time",
        }
    }

    pub fn value(self, record: &Record) -> &str {
        match self {
            Column::Country => &record.country,
            Column::Sports => &record.sports,
            Column::Continent => &record.continent,
            Column::Gender => &record.gender,
            Column::Occupation => &record.occupation,
            Column::Time => &record.time,
        }
    }

    fn index(self) -> usize {
        match self {
            Column::Country => 0,
            Column::Sports => 1,
            Column::Continent => 2,
            Column::Gender => 3,
            Column::Occupation => 4,
            Column::Time => 5,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The loaded table. Immutable once built; aggregators only ever borrow it.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    distinct: Vec<IndexSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub total_views: f64,
    pub countries: usize,
    pub sports: usize,
    pub continents: usize,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Dataset, LoadError> {
        Ok(Dataset::from_records(read_data(path)?))
    }

    pub fn from_records(records: Vec<Record>) -> Dataset {
        let mut distinct = vec![IndexSet::<String>::new(); COLUMNS.len()];
        for record in &records {
            for column in COLUMNS {
                let values = &mut distinct[column.index()];
                let value = column.value(record);
                if !values.contains(value) {
                    values.insert(value.to_string());
                }
            }
        }
        Dataset { records, distinct }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unique values of `column` in order of first appearance.
    pub fn distinct_values(&self, column: Column) -> &IndexSet<String> {
        &self.distinct[column.index()]
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            rows: self.records.len(),
            total_views: self.records.iter().map(|r| r.views).sum(),
            countries: self.distinct_values(Column::Country).len(),
            sports: self.distinct_values(Column::Sports).len(),
            continents: self.distinct_values(Column::Continent).len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::csv_reader::Record;

    pub fn record(sports: &str, country: &str, views: f64, continent: &str, age: u32) -> Record {
        Record {
            country: country.to_string(),
            sports: sports.to_string(),
            continent: continent.to_string(),
            gender: "female".to_string(),
            occupation: "student".to_string(),
            age,
            time: "morning".to_string(),
            views,
        }
    }

    /// The three-row table used throughout the aggregator tests.
    pub fn three_rows() -> Vec<Record> {
        vec![
            record("athletics", "USA", 10.0, "NA", 25),
            record("athletics", "USA", 5.0, "NA", 30),
            record("swimming", "UK", 8.0, "EU", 22),
        ]
    }
}
