//! Chart description handed to the presentation layer.
//!
//! Serializes to a Plotly figure (`{"data": [...], "layout": {...}}`) so a
//! browser can render it with `Plotly.newPlot(el, fig.data, fig.layout)`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dash,
    Dot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub dash: Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    #[serde(rename = "type")]
    pub trace_type: String,
    pub mode: String,
    pub x: Vec<NaiveDate>,
    /// `null` entries render as gaps (indicator warm-up)
    pub y: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

impl Trace {
    pub fn line(name: impl Into<String>, x: Vec<NaiveDate>, y: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            trace_type: "scatter".to_string(),
            mode: "lines".to_string(),
            x,
            y,
            line: None,
            yaxis: None,
        }
    }

    pub fn with_dash(mut self, dash: Dash) -> Self {
        self.line = Some(LineStyle { dash });
        self
    }

    pub fn on_secondary_axis(mut self) -> Self {
        self.yaxis = Some("y2".to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub x: NaiveDate,
    pub y: f64,
    pub text: String,
    pub showarrow: bool,
    pub arrowhead: u32,
    pub arrowsize: u32,
    pub arrowwidth: u32,
    pub arrowcolor: String,
    pub font: Font,
    pub align: String,
    pub xanchor: String,
    pub yanchor: String,
}

impl Annotation {
    /// Performance label pinned to a series' last point, green for gains and red for losses
    pub fn performance(symbol: &str, x: NaiveDate, y: f64, performance_pct: f64) -> Self {
        let color = if performance_pct >= 0.0 { "green" } else { "red" };
        Self {
            x,
            y,
            text: format!("{}: {:.2}%", symbol, performance_pct),
            showarrow: true,
            arrowhead: 4,
            arrowsize: 1,
            arrowwidth: 2,
            arrowcolor: "#636363".to_string(),
            font: Font {
                size: 12,
                color: color.to_string(),
            },
            align: "left".to_string(),
            xanchor: "right".to_string(),
            yanchor: "bottom".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Axis {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            overlaying: None,
            side: None,
            range: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub orientation: String,
    pub yanchor: String,
    pub y: f64,
    pub xanchor: String,
    pub x: f64,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            orientation: "h".to_string(),
            yanchor: "bottom".to_string(),
            y: 1.02,
            xanchor: "right".to_string(),
            x: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<Axis>,
    pub legend: Legend,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout {
                title: title.into(),
                xaxis: Axis::titled("Date"),
                yaxis: Axis::titled("Price (USD)"),
                yaxis2: None,
                legend: Legend::default(),
                annotations: Vec::new(),
            },
        }
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.data.push(trace);
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.layout.annotations.push(annotation);
    }

    /// Adds the right-hand 0..100 axis used by RSI traces
    pub fn enable_rsi_axis(&mut self) {
        self.layout.yaxis2 = Some(Axis {
            title: "RSI".to_string(),
            overlaying: Some("y".to_string()),
            side: Some("right".to_string()),
            range: Some([0.0, 100.0]),
        });
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.data.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_colors() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let up = Annotation::performance("AAPL", day, 10.0, 0.0);
        assert_eq!(up.font.color, "green");
        assert_eq!(up.text, "AAPL: 0.00%");
        let down = Annotation::performance("AAPL", day, 10.0, -1.234);
        assert_eq!(down.font.color, "red");
        assert_eq!(down.text, "AAPL: -1.23%");
    }

    #[test]
    fn test_figure_json_shape() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut chart = ChartSpec::new("Prices");
        chart.add_trace(Trace::line("AAPL Close Price", vec![day], vec![Some(1.5)]));
        chart.add_trace(Trace::line("AAPL 14-day RSI", vec![day], vec![None]).on_secondary_axis());

        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["data"][0]["type"], "scatter");
        assert_eq!(value["data"][0]["x"][0], "2024-01-02");
        assert!(value["data"][0].get("yaxis").is_none());
        assert!(value["data"][1]["y"][0].is_null());
        assert_eq!(value["data"][1]["yaxis"], "y2");
        assert!(value["layout"].get("yaxis2").is_none());

        chart.enable_rsi_axis();
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["layout"]["yaxis2"]["range"][1], 100.0);
    }
}
