use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use crate::aggregate;
use crate::chart::{self, Figure};
use crate::dataset::{Column, Dataset};

const VIEWS: &'static [View] = &[
    View::Bar,
    View::AgeLine,
    View::Histogram,
    View::Scatter,
    View::Heatmap,
];

/// Sport preselected by the bar and line views when the dataset has it.
pub const DEFAULT_SPORT: &str = "athletics";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Bar,
    #[serde(rename = "line")]
    AgeLine,
    Histogram,
    Scatter,
    Heatmap,
}

impl View {
    pub fn all() -> &'static [View] {
        VIEWS
    }

    pub fn slug(self) -> &'static str {
        match self {
            View::Bar => "bar",
            View::AgeLine => "line",
            View::Histogram => "histogram",
            View::Scatter => "scatter",
            View::Heatmap => "heatmap",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Bar => "Bar Chart",
            View::AgeLine => "Age Distribution Line Graph",
            View::Histogram => "Histogram",
            View::Scatter => "Scatter Plot",
            View::Heatmap => "Heatmap",
        }
    }

    pub fn controls(self) -> &'static [Control] {
        match self {
            View::Bar | View::AgeLine => &[Control::Sport],
            View::Histogram | View::Scatter => &[Control::Country],
            View::Heatmap => &[Control::Country, Control::Sport],
        }
    }

    pub fn next(self) -> View {
        let idx = VIEWS.iter().position(|v| *v == self).unwrap_or(0);
        VIEWS[(idx + 1) % VIEWS.len()]
    }

    pub fn previous(self) -> View {
        let idx = VIEWS.iter().position(|v| *v == self).unwrap_or(0);
        VIEWS[(idx + VIEWS.len() - 1) % VIEWS.len()]
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownView(pub String);

impl fmt::Display for UnknownView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown view: {}", self.0)
    }
}

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VIEWS
            .iter()
            .copied()
            .find(|v| v.slug() == s)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Sport,
    Country,
}

impl Control {
    pub fn column(self) -> Column {
        match self {
            Control::Sport => Column::Sports,
            Control::Country => Column::Country,
        }
    }

    /// Query parameter name.
    pub fn key(self) -> &'static str {
        match self {
            Control::Sport => "sport",
            Control::Country => "country",
        }
    }
}

/// The values currently picked for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Bar { sport: String },
    AgeLine { sport: String },
    Histogram { country: String },
    Scatter { country: String },
    Heatmap { country: String, sport: String },
}

impl Selection {
    pub fn view(&self) -> View {
        match self {
            Selection::Bar { .. } => View::Bar,
            Selection::AgeLine { .. } => View::AgeLine,
            Selection::Histogram { .. } => View::Histogram,
            Selection::Scatter { .. } => View::Scatter,
            Selection::Heatmap { .. } => View::Heatmap,
        }
    }

    pub fn get(&self, control: Control) -> Option<&str> {
        match (self, control) {
            (Selection::Bar { sport }, Control::Sport)
            | (Selection::AgeLine { sport }, Control::Sport)
            | (Selection::Heatmap { sport, .. }, Control::Sport) => Some(sport.as_str()),
            (Selection::Histogram { country }, Control::Country)
            | (Selection::Scatter { country }, Control::Country)
            | (Selection::Heatmap { country, .. }, Control::Country) => Some(country.as_str()),
            _ => None,
        }
    }

    /// Replaces the value of `control`, ignoring controls the view lacks.
    pub fn set(&mut self, control: Control, value: &str) {
        let slot = match (self, control) {
            (Selection::Bar { sport }, Control::Sport)
            | (Selection::AgeLine { sport }, Control::Sport)
            | (Selection::Heatmap { sport, .. }, Control::Sport) => sport,
            (Selection::Histogram { country }, Control::Country)
            | (Selection::Scatter { country }, Control::Country)
            | (Selection::Heatmap { country, .. }, Control::Country) => country,
            _ => return,
        };
        *slot = value.to_string();
    }

    fn with(view: View, sport: String, country: String) -> Selection {
        match view {
            View::Bar => Selection::Bar { sport },
            View::AgeLine => Selection::AgeLine { sport },
            View::Histogram => Selection::Histogram { country },
            View::Scatter => Selection::Scatter { country },
            View::Heatmap => Selection::Heatmap { country, sport },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlOptions<'a> {
    pub control: Control,
    pub options: Vec<&'a str>,
    pub default: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDescriptor<'a> {
    pub view: View,
    pub label: &'static str,
    pub controls: Vec<ControlOptions<'a>>,
}

/// Read-only context shared by every interaction.
#[derive(Debug)]
pub struct Dashboard {
    dataset: Dataset,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Self {
        Dashboard { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self, control: Control) -> Vec<&str> {
        self.dataset
            .distinct_values(control.column())
            .iter()
            .map(String::as_str)
            .collect()
    }

    pub fn default_value(&self, view: View, control: Control) -> Option<&str> {
        let values = self.dataset.distinct_values(control.column());
        let prefers_athletics = matches!(view, View::Bar | View::AgeLine);
        if prefers_athletics && control == Control::Sport && values.contains(DEFAULT_SPORT) {
            return Some(DEFAULT_SPORT);
        }
        values.first().map(String::as_str)
    }

    pub fn default_selection(&self, view: View) -> Selection {
        let sport = self.default_value(view, Control::Sport).unwrap_or_default();
        let country = self.default_value(view, Control::Country).unwrap_or_default();
        Selection::with(view, sport.to_string(), country.to_string())
    }

    /// Builds a selection from request parameters. Controls the caller does
    /// not mention keep their defaults.
    pub fn selection_from_pairs<'p, I>(&self, view: View, pairs: I) -> Selection
    where
        I: IntoIterator<Item = (&'p str, &'p str)>,
    {
        let mut selection = self.default_selection(view);
        for (key, value) in pairs {
            if let Some(control) = view.controls().iter().find(|c| c.key() == key) {
                selection.set(*control, value);
            }
        }
        selection
    }

    pub fn describe(&self, view: View) -> ViewDescriptor<'_> {
        ViewDescriptor {
            view,
            label: view.label(),
            controls: view
                .controls()
                .iter()
                .map(|control| ControlOptions {
                    control: *control,
                    options: self.options(*control),
                    default: self.default_value(view, *control),
                })
                .collect(),
        }
    }

    pub fn describe_all(&self) -> Vec<ViewDescriptor<'_>> {
        View::all().iter().map(|v| self.describe(*v)).collect()
    }

    /// Runs the aggregator and renderer for one selection.
    pub fn render(&self, selection: &Selection) -> Figure {
        let dataset = &self.dataset;
        let figure = match selection {
            Selection::Bar { sport } => {
                chart::bar_chart(sport, &aggregate::views_by_country(dataset, sport))
            }
            Selection::AgeLine { sport } => {
                chart::age_line_chart(sport, &aggregate::age_distribution(dataset, sport))
            }
            Selection::Histogram { country } => chart::gender_histogram(
                country,
                &aggregate::views_by_sport_and_gender(dataset, country),
            ),
            Selection::Scatter { country } => chart::occupation_scatter(
                country,
                &aggregate::views_by_occupation(dataset, country),
            ),
            Selection::Heatmap { country, sport } => {
                chart::time_heatmap(sport, &aggregate::views_by_time(dataset, country, sport))
            }
        };
        debug!(
            "rendered {} view: {} trace(s), {} mark(s)",
            selection.view(),
            figure.data.len(),
            figure.marks()
        );
        figure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Trace;
    use crate::dataset::fixtures::three_rows;

    fn dashboard() -> Dashboard {
        Dashboard::new(Dataset::from_records(three_rows()))
    }

    #[test]
    fn view_slugs_round_trip() {
        for view in View::all() {
            assert_eq!(view.slug().parse::<View>(), Ok(*view));
        }
        assert_eq!("pie".parse::<View>(), Err(UnknownView("pie".to_string())));
    }

    #[test]
    fn tabs_cycle() {
        assert_eq!(View::Heatmap.next(), View::Bar);
        assert_eq!(View::Bar.previous(), View::Heatmap);
        assert_eq!(View::Bar.next(), View::AgeLine);
    }

    #[test]
    fn defaults_prefer_athletics_for_sport_views() {
        let dashboard = Dashboard::new(Dataset::from_records(
            three_rows().into_iter().rev().collect(),
        ));
        assert_eq!(
            dashboard.default_selection(View::Bar),
            Selection::Bar { sport: "athletics".to_string() }
        );
        assert_eq!(
            dashboard.default_selection(View::Heatmap),
            Selection::Heatmap {
                country: "UK".to_string(),
                sport: "swimming".to_string(),
            }
        );
    }

    #[test]
    fn defaults_on_empty_dataset_are_blank() {
        let dashboard = Dashboard::new(Dataset::from_records(Vec::new()));
        assert_eq!(
            dashboard.default_selection(View::Scatter),
            Selection::Scatter { country: String::new() }
        );
        assert!(dashboard.render(&dashboard.default_selection(View::AgeLine)).is_empty());
    }

    #[test]
    fn pairs_override_only_known_controls() {
        let dashboard = dashboard();
        let selection = dashboard.selection_from_pairs(
            View::Heatmap,
            vec![("sport", "swimming"), ("colour", "red")],
        );
        assert_eq!(
            selection,
            Selection::Heatmap {
                country: "USA".to_string(),
                sport: "swimming".to_string(),
            }
        );
        let selection = dashboard.selection_from_pairs(View::Bar, vec![("country", "UK")]);
        assert_eq!(selection, Selection::Bar { sport: "athletics".to_string() });
    }

    #[test]
    fn describe_lists_options_in_first_seen_order() {
        let dashboard = dashboard();
        let heatmap = dashboard.describe(View::Heatmap);
        assert_eq!(heatmap.label, "Heatmap");
        assert_eq!(heatmap.controls.len(), 2);
        assert_eq!(heatmap.controls[0].options, vec!["USA", "UK"]);
        assert_eq!(heatmap.controls[1].options, vec!["athletics", "swimming"]);
        assert_eq!(dashboard.describe_all().len(), 5);
    }

    #[test]
    fn three_row_scenario() {
        let dashboard = dashboard();

        let bar = dashboard.render(&Selection::Bar { sport: "athletics".to_string() });
        assert_eq!(
            bar.data,
            vec![Trace::Bar {
                name: None,
                x: vec!["USA".to_string(), "USA".to_string()],
                y: vec![10.0, 5.0],
            }]
        );

        let line = dashboard.render(&Selection::AgeLine { sport: "swimming".to_string() });
        assert_eq!(line.data.len(), 1);
        match &line.data[0] {
            Trace::Scatter { name, x, y, .. } => {
                assert_eq!(name, "EU");
                assert_eq!(x, &crate::chart::Values::Number(vec![22.0]));
                assert_eq!(y, &vec![8.0]);
            }
            other => panic!("unexpected trace: {:?}", other),
        }

        let heatmap = dashboard.render(&Selection::Heatmap {
            country: "UK".to_string(),
            sport: "athletics".to_string(),
        });
        match &heatmap.data[0] {
            Trace::Heatmap { x, y, .. } => {
                assert!(x.is_empty());
                assert_eq!(y, &vec!["UK".to_string()]);
            }
            other => panic!("unexpected trace: {:?}", other),
        }
    }

    #[test]
    fn unknown_values_render_empty_views() {
        let dashboard = dashboard();
        let bar = dashboard.render(&Selection::Bar { sport: "curling".to_string() });
        assert_eq!(bar.marks(), 0);
        let scatter = dashboard.render(&Selection::Scatter { country: "Atlantis".to_string() });
        assert!(scatter.is_empty());
        assert_eq!(
            scatter.title(),
            Some("Viewership by Occupation and Sports in Atlantis")
        );
    }
}
