//! Radar-chart descriptor for the external chart-rendering service.
//!
//! The chart itself is drawn by a third-party service; this module only
//! builds the chart-description object and encodes it into the service URL
//! that goes out in the report-delivery webhook payload.

use serde_json::{json, Value};

use crate::scoring::ScoreSummary;

pub const DEFAULT_CHART_BASE_URL: &str = "https://quickchart.io/chart";

/// Radar axis maximum: 4 questions x 3 points per category.
const AXIS_MAX: i32 = 12;

/// Chart-description object for the four category scores.
pub fn radar_chart_config(summary: &ScoreSummary) -> Value {
    let labels: Vec<&str> = summary
        .per_category
        .iter()
        .map(|c| c.category.label())
        .collect();
    let data: Vec<i32> = summary.per_category.iter().map(|c| c.score).collect();
    json!({
        "type": "radar",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Charm",
                "data": data,
                "backgroundColor": "rgba(59, 130, 246, 0.2)",
                "borderColor": "rgba(59, 130, 246, 1)",
                "borderWidth": 3,
                "pointBackgroundColor": "rgba(59, 130, 246, 1)",
                "pointBorderColor": "#fff"
            }]
        },
        "options": {
            "scales": {
                "r": { "min": 0, "max": AXIS_MAX, "ticks": { "stepSize": 3 } }
            },
            "plugins": { "legend": { "display": false } }
        }
    })
}

/// Rendered chart image URL: the config object URL-encoded into the chart
/// service's query parameter.
pub fn radar_chart_url(base_url: &str, summary: &ScoreSummary) -> String {
    let config = radar_chart_config(summary).to_string();
    format!(
        "{base_url}?w=500&h=300&c={}",
        urlencoding::encode(&config)
    )
}
