//! Guided, step-by-step collection of the figures for an analysis and of the
//! business profile.
//!
//! Step order lives in [`WizardStep`], which knows nothing about I/O. Each flow
//! asks its questions through a [`Prompter`] and reports a [`Transition`] back
//! to the state machine.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};

use crate::common::format::{format_brl, format_brl_fixed, parse_currency_input};
use crate::engine::model::{
    AnalysisType, BusinessData, BusinessProfile, ControlMethod, FOLLOW_UP_FREQUENCIES, OtherCost, PersonalData,
    StaffRole, StoreType,
};
use crate::ui::prompter::{BACK, Prompter};

pub const MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

pub const YEARS: [i32; 5] = [2023, 2024, 2025, 2026, 2027];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Business,
    Personal,
    Profile,
}

impl Flow {
    pub fn last_step(self) -> u8 {
        match self {
            Flow::Business => 7,
            Flow::Personal => 12,
            Flow::Profile => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next,
    Back,
    Restart,
}

/// Position inside a flow. Steps are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardStep {
    flow: Flow,
    number: u8,
}

impl WizardStep {
    pub fn first(flow: Flow) -> Self {
        Self { flow, number: 1 }
    }

    pub fn number(self) -> u8 {
        self.number
    }

    pub fn is_last(self) -> bool {
        self.number == self.flow.last_step()
    }

    /// The step a transition leads to, or `None` once the flow is complete.
    /// Going back from the first step stays there.
    pub fn apply(self, transition: Transition) -> Option<Self> {
        match transition {
            Transition::Next if self.is_last() => None,
            Transition::Next => Some(Self {
                number: self.number + 1,
                ..self
            }),
            Transition::Back => Some(Self {
                number: self.number.saturating_sub(1).max(1),
                ..self
            }),
            Transition::Restart => Some(Self::first(self.flow)),
        }
    }

    pub fn progress_label(self) -> String {
        match self.flow {
            Flow::Business if self.is_last() => "Revisão Final".to_string(),
            Flow::Personal if self.is_last() => "Revisão".to_string(),
            Flow::Business => {
                format!("Passo {} de 7 ({})", self.number, AnalysisType::Business.label())
            }
            Flow::Personal => {
                format!("Passo {} de 12 ({})", self.number, AnalysisType::Personal.label())
            }
            Flow::Profile => format!("Perfil {} de 3", self.number),
        }
    }
}

/// Runs `visit` on each step until the flow completes.
pub fn drive<F>(flow: Flow, mut visit: F) -> Result<()>
where
    F: FnMut(WizardStep) -> Result<Transition>,
{
    let mut step = WizardStep::first(flow);
    loop {
        let transition = visit(step)?;
        log::debug!("{:?} step {} -> {:?}", flow, step.number(), transition);
        match step.apply(transition) {
            Some(next) => step = next,
            None => return Ok(()),
        }
    }
}

// ──────────────────────────────────────────────────────────────
//  Shared questions
// ──────────────────────────────────────────────────────────────

/// Default month and year indices for the period selects.
pub fn period_defaults(today: NaiveDate) -> (usize, usize) {
    let month = today.month0() as usize;
    let year = YEARS
        .iter()
        .position(|&y| y == today.year())
        .unwrap_or(if today.year() < YEARS[0] { 0 } else { YEARS.len() - 1 });
    (month, year)
}

pub fn format_period(month: usize, year: i32) -> String {
    format!("{} {year}", MONTHS[month.min(11)])
}

fn ask_period<P: Prompter + ?Sized>(p: &mut P, title: &str, today: NaiveDate) -> Result<String> {
    let (month_default, year_default) = period_defaults(today);
    p.message(title)?;
    let months: Vec<String> = MONTHS.iter().map(|m| m.to_string()).collect();
    let years: Vec<String> = YEARS.iter().map(|y| y.to_string()).collect();
    let month = p.select("Mês", &months, month_default)?;
    let year = p.select("Ano", &years, year_default)?;
    Ok(format_period(month, YEARS[year]))
}

/// A currency question. `None` when the user asked to go back.
fn ask_amount<P: Prompter + ?Sized>(
    p: &mut P,
    label: &str,
    help: &str,
    current: f64,
) -> Result<Option<f64>> {
    let default = (current != 0.0).then(|| format_brl(current));
    let answer = p.text(label, Some(help), default.as_deref())?;
    if answer.trim() == BACK {
        return Ok(None);
    }
    Ok(Some(parse_currency_input(&answer)))
}

fn ask_count<P: Prompter + ?Sized>(p: &mut P, label: &str, current: u32) -> Result<Option<u32>> {
    let default = (current != 0).then(|| current.to_string());
    let answer = p.text(label, Some("Quantidade"), default.as_deref())?;
    if answer.trim() == BACK {
        return Ok(None);
    }
    Ok(Some(parse_currency_input(&answer).max(0.0).round() as u32))
}

/// Free text with `<` for back. `None` when the user asked to go back.
fn ask_text<P: Prompter + ?Sized>(
    p: &mut P,
    label: &str,
    help: Option<&str>,
    current: &str,
) -> Result<Option<String>> {
    let default = (!current.is_empty()).then_some(current);
    let answer = p.text(label, help, default)?;
    if answer.trim() == BACK {
        return Ok(None);
    }
    Ok(Some(answer.trim().to_string()))
}

/// Fills each `(label, help, slot)` in turn; returns `false` on back.
fn ask_amounts<P: Prompter + ?Sized>(p: &mut P, fields: &mut [(&str, &str, &mut f64)]) -> Result<bool> {
    for (label, help, slot) in fields.iter_mut() {
        match ask_amount(p, *label, *help, **slot)? {
            Some(v) => **slot = v,
            None => return Ok(false),
        }
    }
    Ok(true)
}

fn continue_or_back(ok: bool) -> Transition {
    if ok { Transition::Next } else { Transition::Back }
}

// ──────────────────────────────────────────────────────────────
//  Business flow
// ──────────────────────────────────────────────────────────────

/// Offered before the business flow when no profile exists.
/// Returns `true` if the user wants to fill in the profile first.
pub fn profile_reminder<P: Prompter + ?Sized>(p: &mut P) -> Result<bool> {
    p.message(
        "Potencialize sua Consultoria: complete o perfil do seu negócio para recomendações \
         mais precisas e personalizadas.",
    )?;
    let options = vec!["Configurar Agora".to_string(), "Pular".to_string()];
    Ok(p.select("Perfil do negócio", &options, 1)? == 0)
}

pub fn collect_business<P: Prompter + ?Sized>(p: &mut P, today: NaiveDate) -> Result<BusinessData> {
    let mut data = BusinessData::default();

    drive(Flow::Business, |step| {
        p.message(&step.progress_label())?;
        Ok(match step.number() {
            1 => {
                data.period = ask_period(p, "Qual período você deseja analisar?", today)?;
                Transition::Next
            }
            2 => match ask_amount(p, "Faturamento Total", "R$ 0,00", data.revenue)? {
                Some(v) => {
                    data.revenue = v;
                    Transition::Next
                }
                None => Transition::Back,
            },
            3 => match ask_amount(p, "Custo de Insumos/Estoque", "R$ 0,00", data.direct_costs)? {
                Some(v) => {
                    data.direct_costs = v;
                    Transition::Next
                }
                None => Transition::Back,
            },
            4 => {
                p.message("Despesas Fixas")?;
                let fc = &mut data.fixed_costs;
                continue_or_back(ask_amounts(
                    p,
                    &mut [
                        ("Energia", "Conta de luz", &mut fc.energy),
                        ("Água", "Conta de água", &mut fc.water),
                        ("Internet", "Internet e telefone", &mut fc.internet),
                        ("Software", "Sistemas e assinaturas", &mut fc.software),
                        ("Aluguel", "Aluguel do ponto", &mut fc.rent),
                        ("Manutenção", "Reparos e conservação", &mut fc.maintenance),
                    ],
                )?)
            }
            5 => continue_or_back(ask_payroll(p, &mut data)?),
            6 => {
                p.message("Impostos e Custos Variáveis")?;
                let vc = &mut data.variable_costs;
                let ok = ask_amounts(
                    p,
                    &mut [
                        ("Impostos", "Impostos sobre vendas", &mut vc.taxes),
                        ("Marketing", "Anúncios e divulgação", &mut vc.marketing),
                        ("Comissões", "Comissões de vendas", &mut vc.commissions),
                        ("Logística", "Fretes e entregas", &mut vc.logistics),
                    ],
                )?;
                match ok.then(|| ask_other_costs(p)).transpose()?.flatten() {
                    Some(costs) => {
                        data.other_costs = costs;
                        Transition::Next
                    }
                    None => Transition::Back,
                }
            }
            _ => {
                for line in business_review_lines(&data) {
                    p.message(&line)?;
                }
                let options = vec!["Analisar".to_string(), "Voltar".to_string()];
                if p.select("Confirmar dados?", &options, 0)? == 0 {
                    Transition::Next
                } else {
                    Transition::Back
                }
            }
        })
    })?;

    Ok(data)
}

/// Roles first, then the headcount (defaulting to the sum of the roles).
fn ask_payroll<P: Prompter + ?Sized>(p: &mut P, data: &mut BusinessData) -> Result<bool> {
    p.message("Folha de Pagamento")?;
    let mut roles = Vec::new();
    loop {
        let Some(role) = ask_text(p, "Cargo", Some("Deixe vazio para encerrar"), "")? else {
            return Ok(false);
        };
        if role.is_empty() {
            break;
        }
        let Some(count) = ask_count(p, "Quantidade de pessoas", 0)? else {
            return Ok(false);
        };
        let Some(total_salary) = ask_amount(p, "Total de salários e encargos", "R$ 0,00", 0.0)?
        else {
            return Ok(false);
        };
        roles.push(StaffRole {
            role,
            count,
            total_salary,
        });
    }

    let headcount: u32 = roles.iter().map(|r| r.count).sum();
    let Some(total) = ask_count(p, "Total de Funcionários", headcount)? else {
        return Ok(false);
    };
    data.staff.roles = roles;
    data.staff.total_count = total;
    Ok(true)
}

/// Description/value pairs until an empty description. `None` on back.
fn ask_other_costs<P: Prompter + ?Sized>(p: &mut P) -> Result<Option<Vec<OtherCost>>> {
    let mut costs = Vec::new();
    loop {
        let Some(description) = ask_text(p, "Outro custo", Some("Deixe vazio para encerrar"), "")?
        else {
            return Ok(None);
        };
        if description.is_empty() {
            return Ok(Some(costs));
        }
        let Some(value) = ask_amount(p, "Valor", "R$ 0,00", 0.0)? else {
            return Ok(None);
        };
        costs.push(OtherCost { description, value });
    }
}

pub fn business_review_lines(data: &BusinessData) -> Vec<String> {
    let other: f64 = data.other_costs.iter().map(|o| o.value).sum();
    vec![
        format!("Período: {}", data.period),
        format!("Faturamento: {}", format_brl_fixed(data.revenue)),
        format!("Custos Diretos: {}", format_brl_fixed(data.direct_costs)),
        format!("Despesas Fixas: {}", format_brl_fixed(data.fixed_costs.total())),
        format!(
            "Folha: {} ({} funcionários)",
            format_brl_fixed(data.staff.payroll()),
            data.staff.total_count
        ),
        format!(
            "Custos Variáveis: {}",
            format_brl_fixed(data.variable_costs.total())
        ),
        format!("Outros Custos: {}", format_brl_fixed(other)),
    ]
}

// ──────────────────────────────────────────────────────────────
//  Personal flow
// ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    Income,
    Housing,
    Utilities,
    Food,
    Transport,
    CreditCard,
    Health,
    Education,
    Leisure,
    Other,
}

impl PersonalField {
    pub fn slot(self, data: &mut PersonalData) -> &mut f64 {
        match self {
            PersonalField::Income => &mut data.income,
            PersonalField::Housing => &mut data.housing,
            PersonalField::Utilities => &mut data.utilities,
            PersonalField::Food => &mut data.food,
            PersonalField::Transport => &mut data.transport,
            PersonalField::CreditCard => &mut data.credit_card,
            PersonalField::Health => &mut data.health,
            PersonalField::Education => &mut data.education,
            PersonalField::Leisure => &mut data.leisure,
            PersonalField::Other => &mut data.other,
        }
    }
}

pub struct PersonalQuestion {
    pub field: PersonalField,
    pub label: &'static str,
    pub hint: &'static str,
}

/// Steps 2 to 11 of the personal flow, in order.
pub const PERSONAL_QUESTIONS: [PersonalQuestion; 10] = [
    PersonalQuestion { field: PersonalField::Income, label: "Renda Mensal Total", hint: "Soma de todos os seus ganhos." },
    PersonalQuestion { field: PersonalField::Housing, label: "Moradia", hint: "Aluguel ou financiamento." },
    PersonalQuestion { field: PersonalField::Utilities, label: "Energia, Água e Net", hint: "Custos básicos de utilidades." },
    PersonalQuestion { field: PersonalField::Food, label: "Alimentação", hint: "Supermercado e refeições fora." },
    PersonalQuestion { field: PersonalField::Transport, label: "Transporte", hint: "Uber, combustível ou ônibus." },
    PersonalQuestion { field: PersonalField::CreditCard, label: "Cartão de Crédito", hint: "Valor total das faturas." },
    PersonalQuestion { field: PersonalField::Health, label: "Saúde", hint: "Plano, remédios ou consultas." },
    PersonalQuestion { field: PersonalField::Education, label: "Educação", hint: "Cursos, escola ou faculdade." },
    PersonalQuestion { field: PersonalField::Leisure, label: "Lazer", hint: "Saídas e entretenimento." },
    PersonalQuestion { field: PersonalField::Other, label: "Outros Gastos", hint: "Outras despesas relevantes." },
];

/// The question asked at a personal step, if that step is a question.
pub fn personal_question(step: WizardStep) -> Option<&'static PersonalQuestion> {
    match step.number() {
        n @ 2..=11 => PERSONAL_QUESTIONS.get(usize::from(n) - 2),
        _ => None,
    }
}

pub fn collect_personal<P: Prompter + ?Sized>(p: &mut P, today: NaiveDate) -> Result<PersonalData> {
    let mut data = PersonalData::default();

    drive(Flow::Personal, |step| {
        p.message(&step.progress_label())?;
        if step.number() == 1 {
            data.period = ask_period(p, "Qual período pessoal deseja organizar?", today)?;
            return Ok(Transition::Next);
        }
        if let Some(q) = personal_question(step) {
            let slot = q.field.slot(&mut data);
            return Ok(match ask_amount(p, q.label, q.hint, *slot)? {
                Some(v) => {
                    *slot = v;
                    Transition::Next
                }
                None => Transition::Back,
            });
        }

        p.message(&format!("Período: {}", data.period))?;
        p.message(&format!("Renda: {}", format_brl_fixed(data.income)))?;
        p.message(&format!("Despesas: {}", format_brl_fixed(data.total_expenses())))?;
        let options = vec![
            "Gerar Análise".to_string(),
            "Voltar".to_string(),
            "Recomeçar".to_string(),
        ];
        Ok(match p.select("Gerar análise agora?", &options, 0)? {
            0 => Transition::Next,
            1 => Transition::Back,
            _ => Transition::Restart,
        })
    })?;

    Ok(data)
}

// ──────────────────────────────────────────────────────────────
//  Profile form
// ──────────────────────────────────────────────────────────────

/// Edits `current` in three steps and returns the updated profile.
/// `<` on a text field goes back one step.
pub fn edit_profile<P: Prompter + ?Sized>(p: &mut P, current: &BusinessProfile) -> Result<BusinessProfile> {
    let mut profile = current.clone();

    drive(Flow::Profile, |step| {
        p.message(&step.progress_label())?;
        Ok(match step.number() {
            1 => continue_or_back(profile_general(p, &mut profile)?),
            2 => continue_or_back(profile_structure(p, &mut profile)?),
            _ => continue_or_back(profile_finance(p, &mut profile)?),
        })
    })?;

    Ok(profile)
}

fn profile_general<P: Prompter + ?Sized>(p: &mut P, profile: &mut BusinessProfile) -> Result<bool> {
    p.message("1. Informações Gerais")?;
    let g = &mut profile.general;
    let fields: [(&str, Option<&str>, &mut String); 4] = [
        ("Nome Fantasia", None, &mut g.name),
        ("Segmento", Some("Ex: Restaurante, Loja Roupas"), &mut g.segment),
        ("Tempo de Negócio", Some("Ex: 2 anos"), &mut g.years_in_business),
        ("Cidade/UF", Some("Ex: São Paulo - SP"), &mut g.location),
    ];
    for (label, help, slot) in fields {
        match ask_text(p, label, help, slot.as_str())? {
            Some(v) => *slot = v,
            None => return Ok(false),
        }
    }
    Ok(true)
}

fn profile_structure<P: Prompter + ?Sized>(p: &mut P, profile: &mut BusinessProfile) -> Result<bool> {
    p.message("2. Estrutura e Operação")?;
    let options: Vec<String> = StoreType::CHOICES.iter().map(|s| s.label().to_string()).collect();
    let current = StoreType::CHOICES
        .iter()
        .position(|&s| s == profile.structure.store_type)
        .unwrap_or(0);
    profile.structure.store_type = StoreType::CHOICES[p.select("Tipo de Loja", &options, current)?];

    let Some(hours) = ask_text(
        p,
        "Horário de Funcionamento",
        Some("Ex: 09h às 18h"),
        &profile.structure.hours,
    )?
    else {
        return Ok(false);
    };
    profile.structure.hours = hours;

    let Some(offerings) = ask_text(
        p,
        "Principais Produtos/Serviços",
        None,
        &profile.operation.offerings,
    )?
    else {
        return Ok(false);
    };
    profile.operation.offerings = offerings;

    let Some(channels) = ask_text(
        p,
        "Canais de Venda",
        Some("Separados por vírgula. Ex: Balcão, iFood, Instagram"),
        &profile.operation.sales_channel.join(", "),
    )?
    else {
        return Ok(false);
    };
    profile.operation.sales_channel = channels
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    Ok(true)
}

fn profile_finance<P: Prompter + ?Sized>(p: &mut P, profile: &mut BusinessProfile) -> Result<bool> {
    p.message("3. Organização Financeira")?;
    let methods: Vec<String> = ControlMethod::CHOICES
        .iter()
        .map(|m| m.label().to_string())
        .collect();
    let current = ControlMethod::CHOICES
        .iter()
        .position(|&m| m == profile.finance.method)
        .unwrap_or(0);
    let method = ControlMethod::CHOICES[p.select("Método de Controle", &methods, current)?];
    profile.finance.method = method;
    profile.finance.has_control = method != ControlMethod::NoControl;

    let frequencies: Vec<String> = FOLLOW_UP_FREQUENCIES.iter().map(|f| f.to_string()).collect();
    let current = FOLLOW_UP_FREQUENCIES
        .iter()
        .position(|&f| f == profile.finance.frequency)
        .unwrap_or(0);
    let frequency = p.select("Frequência de Acompanhamento", &frequencies, current)?;
    profile.finance.frequency = FOLLOW_UP_FREQUENCIES[frequency].to_string();

    let Some(suppliers) = ask_text(
        p,
        "Principais Fornecedores",
        None,
        &profile.operation.suppliers,
    )?
    else {
        return Ok(false);
    };
    profile.operation.suppliers = suppliers;
    Ok(true)
}
