//! The three-tab result dashboard.
//!
//! [`Dashboard`] is the renderer-independent view of a parsed response. The
//! full-screen renderer below and the plain-text one in `report` both draw
//! from [`Dashboard::sections`].

use serde::Serialize;

use crate::engine::parser::{
    Bottleneck, ChartPoint, FocusMetric, Kpi, ParsedAnalysis, PlannedAction, SectionKey,
    StatusHeader,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Overview,
    Diagnosis,
    Strategy,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [
        DashboardTab::Overview,
        DashboardTab::Diagnosis,
        DashboardTab::Strategy,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DashboardTab::Overview => "Visão Geral",
            DashboardTab::Diagnosis => "Análise",
            DashboardTab::Strategy => "Estratégia",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A titled block of text lines inside a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: &'static str,
    pub lines: Vec<String>,
}

/// Everything the dashboard shows, pulled out of one response.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub status: StatusHeader,
    pub focus: FocusMetric,
    pub kpis: Vec<Kpi>,
    pub chart: Option<Vec<ChartPoint>>,
    pub reading: Option<String>,
    pub bottlenecks: Vec<Bottleneck>,
    pub bottleneck_notes: Option<String>,
    pub flow: Option<String>,
    pub actions: Vec<PlannedAction>,
    pub action_notes: Option<String>,
    pub alert: Option<String>,
    pub question: Option<String>,
}

impl Dashboard {
    pub fn from_response(text: &str) -> Self {
        Self::from(&ParsedAnalysis::parse(text))
    }

    /// Text blocks for a tab. The overview chart is drawn separately.
    pub fn sections(&self, tab: DashboardTab) -> Vec<Section> {
        let mut out = Vec::new();
        match tab {
            DashboardTab::Overview => {
                if !self.kpis.is_empty() {
                    out.push(Section {
                        heading: "INDICADORES",
                        lines: self
                            .kpis
                            .iter()
                            .map(|k| format!("{}: {}", k.label, k.value))
                            .collect(),
                    });
                }
            }
            DashboardTab::Diagnosis => {
                push_text(&mut out, "LEITURA INTELIGENTE", self.reading.as_deref());
                if self.bottlenecks.is_empty() {
                    push_text(
                        &mut out,
                        "GARGALOS E PONTOS DE ATENÇÃO",
                        self.bottleneck_notes.as_deref(),
                    );
                } else {
                    let mut lines = Vec::new();
                    for b in &self.bottlenecks {
                        lines.push(format!("▸ {}", b.name));
                        push_labelled(&mut lines, "DETALHE", b.detail.as_deref());
                        push_labelled(&mut lines, "MOTIVO", b.reason.as_deref());
                        push_labelled(&mut lines, "RISCO", b.risk.as_deref());
                    }
                    out.push(Section {
                        heading: "GARGALOS E PONTOS DE ATENÇÃO",
                        lines,
                    });
                }
            }
            DashboardTab::Strategy => {
                push_text(&mut out, "OTIMIZAÇÃO DO FLUXO", self.flow.as_deref());
                if self.actions.is_empty() {
                    push_text(&mut out, "AÇÕES PRIORITÁRIAS", self.action_notes.as_deref());
                } else {
                    let mut lines = Vec::new();
                    for (i, a) in self.actions.iter().enumerate() {
                        lines.push(format!("{}. {}", i + 1, a.title));
                        push_labelled(&mut lines, "OBJETIVO", a.objective.as_deref());
                        push_labelled(&mut lines, "IMPACTO", a.impact.as_deref());
                    }
                    out.push(Section {
                        heading: "AÇÕES PRIORITÁRIAS",
                        lines,
                    });
                }
                if let Some(alert) = &self.alert {
                    out.push(Section {
                        heading: "DICA ESTRATÉGICA",
                        lines: vec![format!("\"{alert}\"")],
                    });
                }
                push_text(&mut out, "PRÓXIMO PASSO", self.question.as_deref());
            }
        }
        out
    }
}

impl From<&ParsedAnalysis> for Dashboard {
    fn from(p: &ParsedAnalysis) -> Self {
        let body = |key| p.section_body(key).filter(|s| !s.is_empty());
        Self {
            status: p.status(),
            focus: p.focus(),
            kpis: p.kpis(),
            chart: p.chart().map(<[ChartPoint]>::to_vec),
            reading: body(SectionKey::Reading),
            bottlenecks: p.bottlenecks(),
            bottleneck_notes: body(SectionKey::SimpleBottlenecks),
            flow: body(SectionKey::Flow),
            actions: p.actions(),
            action_notes: body(SectionKey::SimpleActions),
            alert: body(SectionKey::Alert),
            question: body(SectionKey::Question),
        }
    }
}

fn push_text(out: &mut Vec<Section>, heading: &'static str, text: Option<&str>) {
    if let Some(text) = text {
        out.push(Section {
            heading,
            lines: text.lines().map(str::to_string).collect(),
        });
    }
}

fn push_labelled(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        lines.push(format!("  {label}: {v}"));
    }
}

/// Tab and scroll position of the interactive view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub tab: DashboardTab,
    pub scroll: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKey {
    NextTab,
    PreviousTab,
    Tab(usize),
    Up,
    Down,
    Quit,
}

impl DashboardState {
    /// Applies a key. Returns `false` when the view should close.
    pub fn handle(&mut self, key: DashboardKey) -> bool {
        match key {
            DashboardKey::NextTab => self.switch(self.tab.next()),
            DashboardKey::PreviousTab => self.switch(self.tab.previous()),
            DashboardKey::Tab(i) => {
                if let Some(tab) = DashboardTab::from_index(i) {
                    self.switch(tab);
                }
            }
            DashboardKey::Up => self.scroll = self.scroll.saturating_sub(1),
            DashboardKey::Down => self.scroll = self.scroll.saturating_add(1),
            DashboardKey::Quit => return false,
        }
        true
    }

    fn switch(&mut self, tab: DashboardTab) {
        if tab != self.tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }
}

/// Rows for a block of `kpis` lines plus its border and heading.
pub fn kpi_block_height(kpis: usize) -> u16 {
    u16::try_from(kpis).unwrap_or(u16::MAX).saturating_add(3)
}

// ──────────────────────────────────────────────────────────────
//  Full-screen renderer
// ──────────────────────────────────────────────────────────────

#[cfg(feature = "tui")]
pub use interactive::show_dashboard;

#[cfg(feature = "tui")]
mod interactive {
    use std::io::{Stdout, stdout};
    use std::time::Duration;

    use anyhow::Result;
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::{
        Frame, Terminal,
        backend::CrosstermBackend,
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        symbols,
        text::{Line, Span},
        widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs, Wrap},
    };

    use super::{Dashboard, DashboardKey, DashboardState, DashboardTab, kpi_block_height};
    use crate::engine::model::BusinessStatus;

    const HELP_TEXT: &str = "Tab/←/→: Trocar aba | 1-3: Ir para aba | ↑/↓: Rolar | q/Esc: Sair";

    struct TerminalGuard(Terminal<CrosstermBackend<Stdout>>);

    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore_terminal(&mut self.0);
        }
    }

    /// Shows the dashboard until the user quits.
    pub fn show_dashboard(dashboard: &Dashboard, title: &str) -> Result<()> {
        let terminal = setup_terminal()?;
        let mut guard = TerminalGuard(terminal);
        drain_input_buffer()?;

        let mut state = DashboardState::default();
        loop {
            guard.0.draw(|f| ui(f, dashboard, title, &state))?;
            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if let Some(k) = map_key(key.code) {
                        if !state.handle(k) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn map_key(code: KeyCode) -> Option<DashboardKey> {
        Some(match code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => DashboardKey::NextTab,
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => DashboardKey::PreviousTab,
            KeyCode::Char(c @ '1'..='3') => DashboardKey::Tab(c as usize - '1' as usize),
            KeyCode::Up | KeyCode::Char('k') => DashboardKey::Up,
            KeyCode::Down | KeyCode::Char('j') => DashboardKey::Down,
            KeyCode::Char('q') | KeyCode::Esc => DashboardKey::Quit,
            _ => return None,
        })
    }

    fn status_color(status: BusinessStatus) -> Color {
        match status {
            BusinessStatus::Healthy => Color::Green,
            BusinessStatus::Attention => Color::Yellow,
            BusinessStatus::Risk => Color::Red,
        }
    }

    fn ui(f: &mut Frame, d: &Dashboard, title: &str, state: &DashboardState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        f.render_widget(
            Paragraph::new(format!("NÚCLEO ▸ {title}"))
                .style(Style::default().add_modifier(Modifier::BOLD)),
            chunks[0],
        );
        render_header(f, d, chunks[1]);

        let tabs = Tabs::new(DashboardTab::ALL.iter().map(|t| t.title()))
            .select(state.tab.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, chunks[2]);

        match state.tab {
            DashboardTab::Overview if d.chart.as_ref().is_some_and(|c| !c.is_empty()) => {
                let body = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(kpi_block_height(d.kpis.len())), Constraint::Min(8)])
                    .split(chunks[3]);
                render_sections(f, d, state, body[0]);
                render_chart(f, d, body[1]);
            }
            _ => render_sections(f, d, state, chunks[3]),
        }

        f.render_widget(
            Paragraph::new(HELP_TEXT).style(Style::default().fg(Color::DarkGray)),
            chunks[4],
        );
    }

    fn render_header(f: &mut Frame, d: &Dashboard, area: Rect) {
        let color = status_color(d.status.status);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let status = Paragraph::new(vec![
            Line::from(Span::styled(
                d.status.label.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(d.status.description.clone()),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", d.status.status.label())),
        );
        f.render_widget(status, cols[0]);

        let focus = Paragraph::new(vec![
            Line::from(Span::styled(
                d.focus.value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                d.focus.label.clone(),
                Style::default().fg(Color::Cyan),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title(" Foco "));
        f.render_widget(focus, cols[1]);
    }

    fn render_sections(f: &mut Frame, d: &Dashboard, state: &DashboardState, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for section in d.sections(state.tab) {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                section.heading,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.extend(section.lines.into_iter().map(Line::from));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "Nada para mostrar nesta aba.",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let body = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((state.scroll, 0))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(body, area);
    }

    fn render_chart(f: &mut Frame, d: &Dashboard, area: Rect) {
        let Some(points) = d.chart.as_deref() else {
            return;
        };
        let series = |pick: fn(&crate::engine::parser::ChartPoint) -> f64| -> Vec<(f64, f64)> {
            points
                .iter()
                .enumerate()
                .map(|(i, p)| (i as f64, pick(p)))
                .collect()
        };
        let revenue = series(|p| p.revenue);
        let profitability = series(|p| p.profitability);
        let costs = series(|p| p.costs);

        let max_y = points
            .iter()
            .flat_map(|p| [p.revenue, p.profitability, p.costs])
            .fold(0.0_f64, f64::max)
            .max(1.0);
        let max_x = (points.len().saturating_sub(1)).max(1) as f64;

        let datasets = vec![
            Dataset::default()
                .name("Faixa Operacional")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Green))
                .data(&revenue),
            Dataset::default()
                .name("Ponto Mínimo")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Red))
                .data(&costs),
            Dataset::default()
                .name("Evolução")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Blue))
                .data(&profitability),
        ];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Fluxo Financeiro "),
            )
            .x_axis(
                Axis::default()
                    .bounds([0.0, max_x])
                    .labels(points.iter().map(|p| p.name.clone()).collect::<Vec<_>>())
                    .style(Style::default().fg(Color::DarkGray)),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, max_y * 1.1])
                    .labels(vec!["0".to_string(), format!("{max_y:.0}")])
                    .style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(chart, area);
    }

    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        Ok(Terminal::new(CrosstermBackend::new(stdout))?)
    }

    fn drain_input_buffer() -> Result<()> {
        while event::poll(Duration::from_millis(0))? {
            let _ = event::read()?;
        }
        Ok(())
    }

    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }
}
