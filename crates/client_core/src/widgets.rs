//! Opaque option blocks for the external widget libraries (grids, charts,
//! maps, calendar, date pickers). The contents pass through to the host
//! unchanged and are not part of the tested pipeline behavior.

use anyhow::{anyhow, Result};
use locale::{holidays, LocaleConfig};
use serde_json::{json, Value};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    DataTable,
    Chart,
    Map,
    Calendar,
    DatePicker,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::DataTable => "data_table",
            WidgetKind::Chart => "chart",
            WidgetKind::Map => "map",
            WidgetKind::Calendar => "calendar",
            WidgetKind::DatePicker => "date_picker",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub kind: WidgetKind,
    pub options: Value,
}

/// Rendering-layer collaborator that actually instantiates widgets.
pub trait WidgetHost: Send + Sync {
    fn mount(&self, config: &WidgetConfig) -> Result<()>;
}

pub struct MissingWidgetHost;

impl WidgetHost for MissingWidgetHost {
    fn mount(&self, config: &WidgetConfig) -> Result<()> {
        Err(anyhow!(
            "no widget host is installed for {}",
            config.kind.as_str()
        ))
    }
}

/// Stock widget setup of the hosted dashboard, themed for the deployment
/// locale.
pub fn standard_widget_configs(locale: &LocaleConfig) -> Vec<WidgetConfig> {
    let holiday_dates: Vec<String> = holidays::public_holidays()
        .iter()
        .map(|holiday| holiday.date.to_string())
        .collect();

    vec![
        WidgetConfig {
            kind: WidgetKind::DataTable,
            options: json!({
                "page_length": 25,
                "responsive": true,
                "order": [[0, "desc"]],
                "search_placeholder": "Search...",
            }),
        },
        WidgetConfig {
            kind: WidgetKind::Chart,
            options: json!({
                "font_family": "'Inter', 'Helvetica Neue', 'Arial', sans-serif",
                "font_size": 12,
                "palette": {
                    "green": "#006A4E",
                    "red": "#BE123C",
                    "yellow": "#FCDD09",
                },
            }),
        },
        WidgetConfig {
            kind: WidgetKind::Map,
            options: json!({
                "center": [37.9062, 0.0236],
                "zoom": 6,
                "style": "streets",
            }),
        },
        WidgetConfig {
            kind: WidgetKind::Calendar,
            options: json!({
                "initial_view": "day_grid_month",
                "business_hours": {
                    "days_of_week": [1, 2, 3, 4, 5],
                    "start_time": "08:00",
                    "end_time": "18:00",
                },
                "first_day_of_week": 1,
            }),
        },
        WidgetConfig {
            kind: WidgetKind::DatePicker,
            options: json!({
                "min_date": "today",
                "date_format": "Y-m-d",
                "alt_format": "F j, Y",
                "first_day_of_week": 1,
                "time_24hr": true,
                "timezone": locale.timezone,
                "disable": holiday_dates,
            }),
        },
    ]
}

/// Mount failures are logged and skipped; a broken widget never takes the
/// page down. Returns how many widgets mounted.
pub fn mount_all(host: &dyn WidgetHost, configs: &[WidgetConfig]) -> usize {
    let mut mounted = 0;
    for config in configs {
        match host.mount(config) {
            Ok(()) => mounted += 1,
            Err(err) => {
                warn!(widget = config.kind.as_str(), error = %err, "widget mount failed; skipping");
            }
        }
    }
    mounted
}
