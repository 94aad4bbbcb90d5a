//! Chart specifications.
//!
//! Charts are drawn in the browser by Vega-Lite; this module validates the
//! user's selection against the dataset and produces the JSON spec.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::dataset::Dataset;
use crate::Result;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

const TICK_LABEL_SIZE: u32 = 8;
const X_LABEL_ANGLE: i32 = -45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Bar, ChartKind::Scatter];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Line => "Line Graph",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Scatter => "Scatter Plot",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
        }
    }

    fn mark(&self) -> Value {
        match self {
            ChartKind::Line => json!({ "type": "line" }),
            ChartKind::Bar => json!({ "type": "bar" }),
            ChartKind::Scatter => json!({ "type": "point", "filled": true }),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|k| k.key() == wanted || k.label().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown chart type: {}", s))
    }
}

/// The user's chart selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x_column: String,
    pub y_column: String,
}

/// A Vega-Lite specification ready to hand to the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub request: ChartRequest,
    pub points: usize,
    pub spec: Value,
}

impl ChartSpec {
    pub fn to_json(&self) -> String {
        self.spec.to_string()
    }
}

impl ChartRequest {
    pub fn new(kind: ChartKind, x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        Self {
            kind,
            x_column: x_column.into(),
            y_column: y_column.into(),
        }
    }

    /// Resolve both axis columns and build the chart spec.
    pub fn build(&self, dataset: &Dataset) -> Result<ChartSpec> {
        let x_idx = dataset.column_index(&self.x_column)?;
        let y_idx = dataset.column_index(&self.y_column)?;
        let x_type = field_type(dataset, &self.x_column)?;
        let y_type = field_type(dataset, &self.y_column)?;

        let values: Vec<Value> = dataset
            .rows()
            .iter()
            .filter(|row| !row[x_idx].is_empty() && !row[y_idx].is_empty())
            .map(|row| {
                let mut point = Map::new();
                point.insert(self.x_column.clone(), row[x_idx].to_json());
                point.insert(self.y_column.clone(), row[y_idx].to_json());
                Value::Object(point)
            })
            .collect();

        if values.is_empty() {
            log::warn!(
                "Chart of {} against {} has no complete rows",
                self.y_column,
                self.x_column
            );
        }

        let mut x_encoding = json!({
            "field": escape_field(&self.x_column),
            "type": x_type,
            "title": self.x_column,
            "axis": {
                "labelAngle": X_LABEL_ANGLE,
                "labelAlign": "right",
                "labelFontSize": TICK_LABEL_SIZE,
            },
        });
        // Keep row order for categorical axes
        if x_type == "nominal" {
            x_encoding["sort"] = Value::Null;
        }

        let points = values.len();
        let spec = json!({
            "$schema": VEGA_LITE_SCHEMA,
            "width": "container",
            "height": 320,
            "data": { "values": values },
            "mark": self.kind.mark(),
            "encoding": {
                "x": x_encoding,
                "y": {
                    "field": escape_field(&self.y_column),
                    "type": y_type,
                    "title": self.y_column,
                    "axis": { "labelFontSize": TICK_LABEL_SIZE },
                },
            },
        });

        Ok(ChartSpec {
            request: self.clone(),
            points,
            spec,
        })
    }
}

fn field_type(dataset: &Dataset, column: &str) -> Result<&'static str> {
    Ok(if dataset.is_numeric(column)? {
        "quantitative"
    } else {
        "nominal"
    })
}

/// Vega-Lite reads `.` and `[]` in field names as nested access.
fn escape_field(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if matches!(ch, '.' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
