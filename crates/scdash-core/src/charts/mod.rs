//! Chart specifications
//!
//! Builders in this module turn aggregated data into a [`ChartSpec`], a
//! plain serializable description of series, axes and layout. Nothing here
//! renders; the presentation layer draws whatever it receives.

mod basic;
mod catalogue;

pub use basic::{bar_chart, box_plot_by_type, grouped_bar_chart, type_line_chart, BarGroup, Observation};
pub use catalogue::{
    funnel_chart, heatmap, multi_metric_chart, radar_chart, scatter_matrix, sunburst, Dimension,
    HeatCell,
};

use serde::Serialize;

/// Fixed color sequence shared by every chart
pub const PALETTE: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];

/// Palette color for a category index, cycling past the last color
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Box,
    Heatmap,
    Sunburst,
    ScatterMatrix,
    Funnel,
    Radar,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Axis {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            range: None,
        }
    }
}

/// Data of one series, shaped by the chart kind that draws it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SeriesData {
    /// Paired x/y values; `None` is a gap
    Xy { x: Vec<String>, y: Vec<Option<f64>> },
    /// Raw samples for a distribution, one category label per sample
    Samples { x: Vec<String>, y: Vec<f64> },
    /// Pivoted grid; `z[row][col]` is `None` where no cell exists
    Grid {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<Option<f64>>>,
    },
    /// Flattened tree; `parents[i]` is empty for a root
    Hierarchy {
        ids: Vec<String>,
        labels: Vec<String>,
        parents: Vec<String>,
        values: Vec<f64>,
        colors: Vec<String>,
    },
    /// One row per observation, one column per dimension
    Matrix {
        dimensions: Vec<String>,
        rows: Vec<Vec<f64>>,
    },
    Stages {
        stages: Vec<String>,
        values: Vec<f64>,
        percent_of_initial: Vec<Option<f64>>,
    },
    Polar {
        theta: Vec<String>,
        r: Vec<f64>,
        fill: bool,
    },
}

impl SeriesData {
    /// Number of data points
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Xy { y, .. } => y.len(),
            SeriesData::Samples { y, .. } => y.len(),
            SeriesData::Grid { z, .. } => z.iter().map(|row| row.iter().flatten().count()).sum(),
            SeriesData::Hierarchy { ids, .. } => ids.len(),
            SeriesData::Matrix { rows, .. } => rows.len(),
            SeriesData::Stages { values, .. } => values.len(),
            SeriesData::Polar { r, .. } => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub line: LineStyle,
    pub axis: AxisSide,
    pub data: SeriesData,
}

impl Series {
    pub fn new(name: impl Into<String>, data: SeriesData) -> Self {
        Self {
            name: name.into(),
            color: None,
            line: LineStyle::Solid,
            axis: AxisSide::Primary,
            data,
        }
    }

    pub fn xy(name: impl Into<String>, x: Vec<String>, y: Vec<Option<f64>>) -> Self {
        Self::new(name, SeriesData::Xy { x, y })
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn dashed(mut self) -> Self {
        self.line = LineStyle::Dashed;
        self
    }

    pub fn on_secondary_axis(mut self) -> Self {
        self.axis = AxisSide::Secondary;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Group,
    Stack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<BarMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag_mode: Option<String>,
    pub show_legend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Continuous color scale, used by heatmaps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colorscale: Vec<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            bar_mode: None,
            hover_mode: None,
            drag_mode: None,
            show_legend: true,
            height: None,
            colorscale: Vec::new(),
        }
    }
}

/// Render-ready description of one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_axis: Axis,
    /// Value axis; the radial axis for radar charts
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_y_axis: Option<Axis>,
    pub series: Vec<Series>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            secondary_y_axis: None,
            series: Vec::new(),
            layout: Layout::default(),
        }
    }

    pub fn with_axes(mut self, x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        self.x_axis = Axis::titled(x_title);
        self.y_axis = Axis::titled(y_title);
        self
    }

    pub fn push_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// True when no series carries a data point
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.data.is_empty())
    }

    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// Several charts stacked vertically under one title
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedFigure {
    pub title: String,
    pub height: u32,
    pub panels: Vec<ChartSpec>,
}

impl StackedFigure {
    pub fn is_empty(&self) -> bool {
        self.panels.iter().all(ChartSpec::is_empty)
    }
}
