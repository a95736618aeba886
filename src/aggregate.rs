//! Derived views, one per chart.
//!
//! Every function here borrows the dataset, filters it by the selected
//! categorical values and returns a freshly built view. An unknown selection
//! value simply matches no rows, so the result is empty rather than an error.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::csv_reader::Record;
use crate::dataset::Dataset;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRow<'a> {
    pub country: &'a str,
    pub views: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeGroup<'a> {
    pub country: &'a str,
    pub age: u32,
    pub views: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeSeries<'a> {
    pub continent: &'a str,
    pub groups: Vec<AgeGroup<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenderBars<'a> {
    pub gender: &'a str,
    /// (sport, summed views), sports in order of first appearance.
    pub bars: Vec<(&'a str, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupationPoint<'a> {
    pub occupation: &'a str,
    pub views: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SportPoints<'a> {
    pub sport: &'a str,
    pub points: Vec<OccupationPoint<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapRow<'a> {
    pub label: &'a str,
    /// (time bucket, summed views), buckets sorted ascending.
    pub cells: Vec<(&'a str, f64)>,
}

impl HeatmapRow<'_> {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn matching<'a, F>(dataset: &'a Dataset, predicate: F) -> impl Iterator<Item = &'a Record>
where
    F: Fn(&Record) -> bool,
{
    dataset.records().iter().filter(move |r| predicate(*r))
}

/// One bar per matching record. Repeated countries are kept as separate bars.
pub fn views_by_country<'a>(dataset: &'a Dataset, sport: &str) -> Vec<BarRow<'a>> {
    matching(dataset, |r| r.sports == sport)
        .map(|r| BarRow {
            country: &r.country,
            views: r.views,
        })
        .collect()
}

/// Views summed per (continent, country, age), split into one series per
/// continent. Groups are ordered by their key.
pub fn age_distribution<'a>(dataset: &'a Dataset, sport: &str) -> Vec<AgeSeries<'a>> {
    let mut grouped = BTreeMap::<(&str, &str, u32), f64>::new();
    for r in matching(dataset, |r| r.sports == sport) {
        *grouped
            .entry((r.continent.as_str(), r.country.as_str(), r.age))
            .or_insert(0.0) += r.views;
    }
    if grouped.is_empty() {
        return Vec::new();
    }

    let mut series = Vec::<AgeSeries>::new();
    for ((continent, country, age), views) in grouped {
        let group = AgeGroup {
            country,
            age,
            views,
        };
        match series.last_mut() {
            Some(last) if last.continent == continent => last.groups.push(group),
            _ => series.push(AgeSeries {
                continent,
                groups: vec![group],
            }),
        }
    }
    series
}

/// Views summed per (sport, gender), one bar group per gender.
pub fn views_by_sport_and_gender<'a>(dataset: &'a Dataset, country: &str) -> Vec<GenderBars<'a>> {
    let mut by_gender = IndexMap::<&str, IndexMap<&str, f64>>::new();
    for r in matching(dataset, |r| r.country == country) {
        *by_gender
            .entry(r.gender.as_str())
            .or_default()
            .entry(r.sports.as_str())
            .or_insert(0.0) += r.views;
    }
    by_gender
        .into_iter()
        .map(|(gender, sports)| GenderBars {
            gender,
            bars: sports.into_iter().collect(),
        })
        .collect()
}

/// One point per matching record, bucketed by sport for colouring.
pub fn views_by_occupation<'a>(dataset: &'a Dataset, country: &str) -> Vec<SportPoints<'a>> {
    let mut by_sport = IndexMap::<&str, Vec<OccupationPoint>>::new();
    for r in matching(dataset, |r| r.country == country) {
        by_sport
            .entry(r.sports.as_str())
            .or_default()
            .push(OccupationPoint {
                occupation: &r.occupation,
                views: r.views,
            });
    }
    by_sport
        .into_iter()
        .map(|(sport, points)| SportPoints { sport, points })
        .collect()
}

pub fn views_by_time<'a>(dataset: &'a Dataset, country: &'a str, sport: &str) -> HeatmapRow<'a> {
    let mut by_time = BTreeMap::<&str, f64>::new();
    for r in matching(dataset, |r| r.country == country && r.sports == sport) {
        *by_time.entry(r.time.as_str()).or_insert(0.0) += r.views;
    }
    HeatmapRow {
        label: country,
        cells: by_time.into_iter().collect(),
    }
}
