//! Plain-text rendering of the dashboard, for scripts, pipes and builds
//! without the full-screen view.

use std::fmt::Write;

#[cfg(feature = "colors")]
use colored::Colorize;

use crate::engine::model::{BusinessStatus, HistoryRecord};
use crate::engine::parser::ChartPoint;
use crate::ui::dashboard::{Dashboard, DashboardTab};

/// Renders the header and every tab, one after the other.
pub fn render_dashboard(d: &Dashboard, title: &str) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{rule}\n{}\n{rule}", bold(&format!("NÚCLEO ▸ {title}")));
    let _ = writeln!(
        out,
        "[{}] {}",
        status(d.status.status, d.status.status.label()),
        status(d.status.status, &d.status.label)
    );
    if !d.status.description.is_empty() {
        let _ = writeln!(out, "    {}", d.status.description);
    }
    if !d.focus.value.is_empty() {
        let _ = writeln!(out, "{}: {}", d.focus.label, bold(&d.focus.value));
    }

    for tab in DashboardTab::ALL {
        let _ = writeln!(out, "\n{}", heading(&format!("── {} ──", tab.title())));
        let sections = d.sections(tab);
        let chart = match tab {
            DashboardTab::Overview => d.chart.as_deref().filter(|c| !c.is_empty()),
            _ => None,
        };
        if sections.is_empty() && chart.is_none() {
            let _ = writeln!(out, "(nada para mostrar)");
        }
        for section in sections {
            let _ = writeln!(out, "\n{}", heading(section.heading));
            for line in section.lines {
                let _ = writeln!(out, "{line}");
            }
        }
        if let Some(points) = chart {
            let _ = writeln!(out, "\n{}", heading("FLUXO FINANCEIRO"));
            out.push_str(&chart_table(points));
        }
    }
    out
}

/// Fixed-width table of the chart points with a bar for the main line.
pub fn chart_table(points: &[ChartPoint]) -> String {
    const BAR_WIDTH: f64 = 24.0;
    let max = points
        .iter()
        .map(|p| p.profitability)
        .fold(0.0_f64, f64::max);
    let name_width = points.iter().map(|p| p.name.chars().count()).max().unwrap_or(0).max(5);

    let mut out = format!(
        "{:<name_width$}  {:>10}  {:>10}  {:>10}\n",
        "Ponto", "Faixa", "Evolução", "Mínimo"
    );
    for p in points {
        let bar_len = if max > 0.0 {
            (p.profitability / max * BAR_WIDTH).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{:<name_width$}  {:>10.1}  {:>10.1}  {:>10.1}  {}",
            p.name,
            p.revenue,
            p.profitability,
            p.costs,
            "█".repeat(bar_len)
        );
    }
    out
}

/// One line per saved analysis.
pub fn render_history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "Nenhuma análise salva.\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let date = chrono::DateTime::parse_from_rfc3339(&r.date)
            .map(|d| d.format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_else(|_| r.date.clone());
        let _ = writeln!(
            out,
            "{}  {:<4} {:<11} {:<16} {:<16} Faturamento: {:<16} Lucro: {}",
            bold(short_id(&r.id)),
            r.kind.code(),
            r.kind.label(),
            date,
            r.month_year,
            r.summary.faturamento,
            r.summary.lucro_bruto
        );
    }
    out
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(feature = "colors")]
fn bold(s: &str) -> String {
    s.bold().to_string()
}
#[cfg(not(feature = "colors"))]
fn bold(s: &str) -> String {
    s.to_string()
}

#[cfg(feature = "colors")]
fn heading(s: &str) -> String {
    s.cyan().bold().to_string()
}
#[cfg(not(feature = "colors"))]
fn heading(s: &str) -> String {
    s.to_string()
}

#[cfg(feature = "colors")]
fn status(kind: BusinessStatus, s: &str) -> String {
    match kind {
        BusinessStatus::Healthy => s.green().bold().to_string(),
        BusinessStatus::Attention => s.yellow().bold().to_string(),
        BusinessStatus::Risk => s.red().bold().to_string(),
    }
}
#[cfg(not(feature = "colors"))]
fn status(_kind: BusinessStatus, s: &str) -> String {
    s.to_string()
}
