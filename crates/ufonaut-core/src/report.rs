//! Endpoint listings in plain text, Markdown and CSV.

use serde::{Deserialize, Serialize};

use crate::collection::Endpoint;

/// Output format of an endpoint listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `method path` per line (`| normalized` appended on request).
    #[default]
    Plain,
    /// Markdown table.
    Md,
    /// `;`-separated values, no header.
    Csv,
}

/// Render endpoints; `normalized` adds the normalized name column.
pub fn render(endpoints: &[Endpoint], format: ReportFormat, normalized: bool) -> String {
    let mut out = String::new();

    if format == ReportFormat::Md {
        if normalized {
            out.push_str("|Method|Path|Normalized|\n|---|---|---|\n");
        } else {
            out.push_str("|Method|Path|\n|---|---|\n");
        }
    }

    for endpoint in endpoints {
        let method = &endpoint.actual.method;
        let path = &endpoint.actual.path;
        let name = &endpoint.normalized;
        let line = match (format, normalized) {
            (ReportFormat::Plain, true) => format!("{method} {path} | {name}"),
            (ReportFormat::Plain, false) => format!("{method} {path}"),
            (ReportFormat::Md, true) => format!("|{method}|{path}|{name}|"),
            (ReportFormat::Md, false) => format!("|{method}|{path}|"),
            (ReportFormat::Csv, true) => format!("{method};{path};{name}"),
            (ReportFormat::Csv, false) => format!("{method};{path}"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}
