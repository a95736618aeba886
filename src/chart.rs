//! Figure specifications handed to the browser.
//!
//! The shapes serialize to the plotly.js figure format (`data` + `layout`), so
//! the page can pass them straight to `Plotly.react`.

use serde::Serialize;

use crate::aggregate::{AgeSeries, BarRow, GenderBars, HeatmapRow, SportPoints};

pub const HEATMAP_COLORSCALE: &str = "Viridis";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Values {
    Text(Vec<String>),
    Number(Vec<f64>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Text(v) => v.len(),
            Values::Number(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Lines,
    Markers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        x: Vec<String>,
        y: Vec<f64>,
    },
    Scatter {
        name: String,
        mode: Mode,
        x: Values,
        y: Vec<f64>,
    },
    Heatmap {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<f64>>,
        colorscale: String,
    },
}

impl Trace {
    /// Number of plotted marks (bars, points, or cells).
    pub fn len(&self) -> usize {
        match self {
            Trace::Bar { y, .. } | Trace::Scatter { y, .. } => y.len(),
            Trace::Heatmap { z, .. } => z.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the plotted values.
    pub fn total(&self) -> f64 {
        match self {
            Trace::Bar { y, .. } | Trace::Scatter { y, .. } => y.iter().sum(),
            Trace::Heatmap { z, .. } => z.iter().flatten().sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl From<&str> for Title {
    fn from(text: &str) -> Self {
        Title {
            text: text.to_string(),
        }
    }
}

impl From<String> for Title {
    fn from(text: String) -> Self {
        Title { text }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Group,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<AxisLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<AxisLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<BarMode>,
}

impl Layout {
    fn titled<T: Into<Title>>(title: T) -> Self {
        Layout {
            title: Some(title.into()),
            ..Layout::default()
        }
    }

    fn axes(mut self, x: &str, y: &str) -> Self {
        self.xaxis = Some(AxisLayout { title: x.into() });
        self.yaxis = Some(AxisLayout { title: y.into() });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// A figure with no traces and a blank layout.
    pub fn empty() -> Self {
        Figure::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn title(&self) -> Option<&str> {
        self.layout.title.as_ref().map(|t| t.text.as_str())
    }

    pub fn total(&self) -> f64 {
        self.data.iter().map(Trace::total).sum()
    }

    pub fn marks(&self) -> usize {
        self.data.iter().map(Trace::len).sum()
    }
}

pub fn bar_chart(sport: &str, rows: &[BarRow]) -> Figure {
    let trace = Trace::Bar {
        name: None,
        x: rows.iter().map(|r| r.country.to_string()).collect(),
        y: rows.iter().map(|r| r.views).collect(),
    };
    Figure {
        data: vec![trace],
        layout: Layout::titled(format!("Views for {}", sport)).axes("country", "views"),
    }
}

pub fn age_line_chart(sport: &str, series: &[AgeSeries]) -> Figure {
    if series.is_empty() {
        return Figure::empty();
    }
    let data = series
        .iter()
        .map(|s| Trace::Scatter {
            name: s.continent.to_string(),
            mode: Mode::Lines,
            x: Values::Number(s.groups.iter().map(|g| f64::from(g.age)).collect()),
            y: s.groups.iter().map(|g| g.views).collect(),
        })
        .collect();
    let mut layout = Layout::titled(format!("Viewership Distribution by Age for {}", sport))
        .axes("Age", "Total Views");
    layout.legend = Some(Legend {
        title: "Continent".into(),
    });
    Figure { data, layout }
}

pub fn gender_histogram(country: &str, groups: &[GenderBars]) -> Figure {
    let data = groups
        .iter()
        .map(|g| Trace::Bar {
            name: Some(g.gender.to_string()),
            x: g.bars.iter().map(|(sport, _)| sport.to_string()).collect(),
            y: g.bars.iter().map(|(_, views)| *views).collect(),
        })
        .collect();
    let mut layout = Layout::titled(format!("Viewership of Sports by Gender in {}", country))
        .axes("sports", "sum of views");
    layout.legend = Some(Legend {
        title: "gender".into(),
    });
    layout.barmode = Some(BarMode::Group);
    Figure { data, layout }
}

pub fn occupation_scatter(country: &str, by_sport: &[SportPoints]) -> Figure {
    let data = by_sport
        .iter()
        .map(|s| Trace::Scatter {
            name: s.sport.to_string(),
            mode: Mode::Markers,
            x: Values::Text(s.points.iter().map(|p| p.occupation.to_string()).collect()),
            y: s.points.iter().map(|p| p.views).collect(),
        })
        .collect();
    let mut layout = Layout::titled(format!(
        "Viewership by Occupation and Sports in {}",
        country
    ))
    .axes("Occupation", "Views");
    layout.legend = Some(Legend {
        title: "sports".into(),
    });
    Figure { data, layout }
}

pub fn time_heatmap(sport: &str, row: &HeatmapRow) -> Figure {
    let trace = Trace::Heatmap {
        x: row.cells.iter().map(|(time, _)| time.to_string()).collect(),
        y: vec![row.label.to_string()],
        z: vec![row.cells.iter().map(|(_, views)| *views).collect()],
        colorscale: HEATMAP_COLORSCALE.to_string(),
    };
    Figure {
        data: vec![trace],
        layout: Layout::titled(format!(
            "Viewership Heatmap for {} in {}",
            sport, row.label
        ))
        .axes("Time", "Country"),
    }
}
