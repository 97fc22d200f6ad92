//! Extracts dashboard fields from the model's free-text answer.
//!
//! The answer is expected to follow the layout fixed by the system
//! instruction (`### HEADING` sections, a `[DATASET: ...]` block), but none of
//! it is guaranteed: every lookup degrades to "missing" rather than failing.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::common::format::parse_float_prefix;
use crate::engine::model::{BusinessStatus, HistorySummary};

static SECTION_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"###\s").unwrap());
static HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"###.*?\n").unwrap());
static DATASET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[DATASET:\s*(.*?)\]").unwrap());
static POINT_VALUES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((.*?)\)").unwrap());
static SERIES_F: Lazy<Regex> = Lazy::new(|| Regex::new(r"F:([\d.]+)").unwrap());
static SERIES_L: Lazy<Regex> = Lazy::new(|| Regex::new(r"L:([\d.]+)").unwrap());
static SERIES_C: Lazy<Regex> = Lazy::new(|| Regex::new(r"C:([\d.]+)").unwrap());
static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\.").unwrap());
static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\.\s").unwrap());

static REVENUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Faturamento:\s*(R\$\s*[\d.,]+)").unwrap());
static INCOME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Renda Total:\s*(R\$\s*[\d.,]+)").unwrap());
static GROSS_PROFIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Lucro Bruto:\s*(R\$\s*[\d.,]+)").unwrap());
static LEFTOVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Sobra Real:\s*(R\$\s*[\d.,]+)").unwrap());

/// Placeholder shown in history when a headline figure was not found.
pub const NOT_AVAILABLE: &str = "N/A";

/// The named sections the dashboard knows how to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Status,
    Focus,
    Dashboard,
    Reading,
    SimpleBottlenecks,
    SimpleActions,
    Alert,
    Flow,
    DetailedBottlenecks,
    DetailedActions,
    Question,
}

/// Heading keywords (upper case) for each section, business and personal.
const SECTION_KEYWORDS: &[(SectionKey, &[&str])] = &[
    (SectionKey::Status, &["STATUS GERAL", "STATUS FINANCEIRO"]),
    (SectionKey::Focus, &["NÚMERO ÚNICO DE FOCO"]),
    (SectionKey::Dashboard, &["DASHBOARD RESUMIDO", "RESUMO DO MÊS"]),
    (SectionKey::Reading, &["LEITURA INTELIGENTE"]),
    (SectionKey::SimpleBottlenecks, &["PRINCIPAIS GARGALOS"]),
    (SectionKey::SimpleActions, &["AÇÕES RECOMENDADAS"]),
    (SectionKey::Alert, &["ALERTA OU OPORTUNIDADE", "DICA DE OURO"]),
    (SectionKey::Flow, &["MELHORIA DO FLUXO FINANCEIRO"]),
    (
        SectionKey::DetailedBottlenecks,
        &["GARGALOS IDENTIFICADOS", "ONDE ESTÁ O DESPERDÍCIO"],
    ),
    (SectionKey::DetailedActions, &["AÇÕES PRIORITÁRIAS"]),
    (SectionKey::Question, &["PERGUNTA GUIADA"]),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    /// `F:` series, drawn as the operating band.
    pub revenue: f64,
    /// `L:` series, the main line.
    pub profitability: f64,
    /// `C:` series, the minimum-point line.
    pub costs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusHeader {
    pub label: String,
    pub description: String,
    pub status: BusinessStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusMetric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bottleneck {
    pub name: String,
    pub detail: Option<String>,
    pub reason: Option<String>,
    pub risk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAction {
    pub title: String,
    pub objective: Option<String>,
    pub impact: Option<String>,
}

/// A response split into its named sections plus the chart dataset.
#[derive(Debug, Clone)]
pub struct ParsedAnalysis {
    sections: HashMap<SectionKey, String>,
    chart: Option<Vec<ChartPoint>>,
}

impl ParsedAnalysis {
    pub fn parse(content: &str) -> Self {
        let cleaned = clean_content(content);
        let mut sections = HashMap::new();
        for section in split_sections(&cleaned) {
            let upper = section.to_uppercase();
            for (key, keywords) in SECTION_KEYWORDS {
                if keywords.iter().any(|k| upper.contains(k)) {
                    // Later sections win, same as a plain map insert.
                    sections.insert(*key, section.to_string());
                }
            }
        }
        let chart = parse_chart_data(&cleaned);
        Self { sections, chart }
    }

    pub fn section(&self, key: SectionKey) -> Option<&str> {
        self.sections.get(&key).map(String::as_str)
    }

    /// Section text without its heading line.
    pub fn section_body(&self, key: SectionKey) -> Option<String> {
        self.section(key).map(strip_heading)
    }

    pub fn chart(&self) -> Option<&[ChartPoint]> {
        self.chart.as_deref()
    }

    pub fn status(&self) -> StatusHeader {
        let lines = non_blank_lines(self.section(SectionKey::Status).unwrap_or(""));
        let label = lines
            .get(1)
            .map(|l| l.replacen("###", "", 1).trim().to_string())
            .unwrap_or_default();
        let description = lines.get(2).map(|l| l.trim().to_string()).unwrap_or_default();
        StatusHeader {
            status: classify_status(&label),
            label,
            description,
        }
    }

    pub fn focus(&self) -> FocusMetric {
        let lines = non_blank_lines(self.section(SectionKey::Focus).unwrap_or(""));
        let main = lines.get(1).copied().unwrap_or("");
        let (label, value) = match main.split_once(':') {
            Some((l, v)) => (l.trim(), v.trim()),
            None => (main.trim(), ""),
        };
        FocusMetric {
            label: if label.is_empty() { "Foco" } else { label }.to_string(),
            value: if value.is_empty() { main.to_string() } else { value.to_string() },
        }
    }

    /// `- Label: value` lines of the summary section.
    pub fn kpis(&self) -> Vec<Kpi> {
        self.section(SectionKey::Dashboard)
            .unwrap_or("")
            .lines()
            .filter(|l| l.contains(':') && !l.trim_start().starts_with("[DATASET"))
            .map(|l| {
                let line = l.replacen('-', "", 1);
                let (label, value) = line.split_once(':').unwrap_or((line.as_str(), ""));
                Kpi {
                    label: label.trim().to_string(),
                    value: value.trim().to_string(),
                }
            })
            .collect()
    }

    /// `- Name | Onde: ... | Por quê: ... | Risco: ...` lines of the detailed bottleneck section.
    pub fn bottlenecks(&self) -> Vec<Bottleneck> {
        self.section(SectionKey::DetailedBottlenecks)
            .unwrap_or("")
            .lines()
            .filter(|l| l.contains('|'))
            .map(|l| {
                let line = l.replacen('-', "", 1);
                let parts: Vec<&str> = line.split('|').map(str::trim).collect();
                Bottleneck {
                    name: parts[0].to_string(),
                    detail: parts.get(1).map(|p| labelled_value(p)),
                    reason: parts.get(2).map(|p| labelled_value(p)),
                    risk: parts.get(3).map(|p| labelled_value(p)),
                }
            })
            .collect()
    }

    /// `1. Action | Objetivo: ... | Impacto: ...` lines of the priority section.
    pub fn actions(&self) -> Vec<PlannedAction> {
        self.section(SectionKey::DetailedActions)
            .unwrap_or("")
            .lines()
            .filter(|l| NUMBERED_LINE.is_match(l))
            .map(|l| {
                let parts: Vec<&str> = l.split('|').map(str::trim).collect();
                PlannedAction {
                    title: NUMBER_PREFIX.replace(parts[0], "").into_owned(),
                    objective: parts.get(1).map(|p| labelled_value(p)),
                    impact: parts.get(2).map(|p| labelled_value(p)),
                }
            })
            .collect()
    }
}

/// Removes bold markers the model adds despite being told not to.
pub fn clean_content(content: &str) -> String {
    content.replace("**", "")
}

/// Splits at every `###` that is followed by whitespace, keeping the marker
/// with the section it opens. Blank pieces are dropped.
pub fn split_sections(text: &str) -> Vec<&str> {
    let mut bounds: Vec<usize> = SECTION_START
        .find_iter(text)
        .map(|m| m.start())
        .filter(|&s| s > 0)
        .collect();
    bounds.insert(0, 0);
    bounds.push(text.len());

    bounds
        .windows(2)
        .map(|w| &text[w[0]..w[1]])
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Reads the first `[DATASET: name(F:.., L:.., C:..); ...]` block.
pub fn parse_chart_data(text: &str) -> Option<Vec<ChartPoint>> {
    let caps = DATASET.captures(text)?;
    let series = |re: &Regex, vals: &str| {
        re.captures(vals)
            .and_then(|c| parse_float_prefix(&c[1]))
            .unwrap_or(0.0)
    };

    let points = caps[1]
        .split(';')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            let name = p.split('(').next().unwrap_or("").trim().to_string();
            let vals = POINT_VALUES
                .captures(p)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            ChartPoint {
                name,
                revenue: series(&SERIES_F, &vals),
                profitability: series(&SERIES_L, &vals),
                costs: series(&SERIES_C, &vals),
            }
        })
        .collect();
    Some(points)
}

/// Headline figures for the history list: revenue (or income) and gross
/// profit (or what is left over).
pub fn extract_summary(result: &str) -> HistorySummary {
    let first = |primary: &Regex, fallback: &Regex| {
        primary
            .captures(result)
            .or_else(|| fallback.captures(result))
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };
    HistorySummary {
        faturamento: first(&REVENUE, &INCOME),
        lucro_bruto: first(&GROSS_PROFIT, &LEFTOVER),
    }
}

pub fn classify_status(label: &str) -> BusinessStatus {
    const HEALTHY: [&str; 3] = ["Saudável", "Equilibrado", "Confortável"];
    const RISK: [&str; 2] = ["Risco", "Crítico"];
    if HEALTHY.iter().any(|w| label.contains(w)) {
        BusinessStatus::Healthy
    } else if RISK.iter().any(|w| label.contains(w)) {
        BusinessStatus::Risk
    } else {
        BusinessStatus::Attention
    }
}

fn strip_heading(section: &str) -> String {
    HEADING_LINE.replace(section, "").trim().to_string()
}

fn non_blank_lines(text: &str) -> Vec<&str> {
    text.split('\n').filter(|l| !l.trim().is_empty()).collect()
}

/// `"Objetivo: reduzir 10%"` → `"reduzir 10%"`; unlabelled text is returned as is.
fn labelled_value(part: &str) -> String {
    match part.split_once(':') {
        Some((_, v)) if !v.trim().is_empty() => v.trim().to_string(),
        _ => part.to_string(),
    }
}
