use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::engine::{config::OutputFormat, model::HistoryRecord, model::AnalysisType};
use crate::ui::dashboard::Dashboard;
use crate::ui::report;
use crate::ui::template::write_to_file;

/// Handles all final output of an analysis: dashboard, JSON or file.
pub struct OutputHandler<'a> {
    kind: AnalysisType,
    period: &'a str,
    response: &'a str,
    record: Option<&'a HistoryRecord>,
    format: OutputFormat,
    interactive: bool,
    output_file: Option<&'a Path>,
}

impl<'a> OutputHandler<'a> {
    pub fn new(
        kind: AnalysisType,
        period: &'a str,
        response: &'a str,
        format: OutputFormat,
        interactive: bool,
    ) -> Self {
        Self {
            kind,
            period,
            response,
            record: None,
            format,
            interactive,
            output_file: None,
        }
    }

    /// Output for a saved analysis.
    pub fn for_record(record: &'a HistoryRecord, format: OutputFormat, interactive: bool) -> Self {
        Self {
            record: Some(record),
            ..Self::new(record.kind, &record.month_year, &record.result, format, interactive)
        }
    }

    pub fn with_record(mut self, record: Option<&'a HistoryRecord>) -> Self {
        self.record = record;
        self
    }

    pub fn with_output_file(mut self, path: Option<&'a Path>) -> Self {
        self.output_file = path;
        self
    }

    fn title(&self) -> String {
        format!("Consultoria {} ▸ {}", self.kind.code(), self.period)
    }

    pub fn handle(&self) -> Result<()> {
        if let Some(path) = self.output_file {
            write_to_file(path, self.response)?;
        }

        let dashboard = Dashboard::from_response(self.response);
        if self.format == OutputFormat::Json {
            return self.handle_json_output(&dashboard);
        }

        if self.interactive {
            #[cfg(feature = "tui")]
            return crate::ui::dashboard::show_dashboard(&dashboard, &self.title());
        }

        print!("{}", report::render_dashboard(&dashboard, &self.title()));
        Ok(())
    }

    fn handle_json_output(&self, dashboard: &Dashboard) -> Result<()> {
        let json_out = json!({
            "id": self.record.map(|r| r.id.as_str()),
            "type": self.kind,
            "date": self.record.map(|r| r.date.as_str()),
            "period": self.period,
            "summary": self.record.map(|r| &r.summary),
            "response": self.response,
            "dashboard": dashboard,
        });
        println!("{}", serde_json::to_string_pretty(&json_out)?);
        Ok(())
    }
}

pub fn print_history(records: &[HistoryRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Text => print!("{}", report::render_history(records)),
    }
    Ok(())
}
