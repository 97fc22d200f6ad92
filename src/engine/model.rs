//! Contains the core data structures for the application.
//!
//! Every persisted record uses camelCase field names so JSON blobs written by
//! earlier releases of the web front-end load unchanged.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which flavour of analysis is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum AnalysisType {
    /// Company figures (CNPJ).
    #[serde(rename = "CNPJ")]
    #[value(name = "business", alias = "cnpj")]
    Business,
    /// Household figures (CPF).
    #[serde(rename = "CPF")]
    #[value(name = "personal", alias = "cpf")]
    Personal,
}

impl AnalysisType {
    pub fn code(self) -> &'static str {
        match self {
            AnalysisType::Business => "CNPJ",
            AnalysisType::Personal => "CPF",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisType::Business => "Empresarial",
            AnalysisType::Personal => "Pessoal",
        }
    }

    /// Sampling temperature used when the config file does not override it.
    pub fn default_temperature(self) -> f32 {
        match self {
            AnalysisType::Business => 0.1,
            AnalysisType::Personal => 0.2,
        }
    }

    /// Stable lowercase name, used for template file names.
    pub fn slug(self) -> &'static str {
        match self {
            AnalysisType::Business => "business",
            AnalysisType::Personal => "personal",
        }
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ──────────────────────────────────────────────────────────────
//  Business snapshot
// ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaffRole {
    pub role: String,
    pub count: u32,
    pub total_salary: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedCosts {
    pub energy: f64,
    pub water: f64,
    pub internet: f64,
    pub software: f64,
    pub rent: f64,
    pub maintenance: f64,
}

impl FixedCosts {
    pub fn total(&self) -> f64 {
        self.energy + self.water + self.internet + self.software + self.rent + self.maintenance
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Staff {
    pub total_count: u32,
    pub roles: Vec<StaffRole>,
}

impl Staff {
    pub fn payroll(&self) -> f64 {
        self.roles.iter().map(|r| r.total_salary).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariableCosts {
    pub taxes: f64,
    pub marketing: f64,
    pub commissions: f64,
    pub logistics: f64,
}

impl VariableCosts {
    pub fn total(&self) -> f64 {
        self.taxes + self.marketing + self.commissions + self.logistics
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OtherCost {
    pub description: String,
    pub value: f64,
}

/// One month of company figures as collected by the business wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessData {
    pub period: String,
    pub revenue: f64,
    pub direct_costs: f64,
    pub fixed_costs: FixedCosts,
    pub staff: Staff,
    pub variable_costs: VariableCosts,
    pub other_costs: Vec<OtherCost>,
}

// ──────────────────────────────────────────────────────────────
//  Personal snapshot
// ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalData {
    pub period: String,
    pub income: f64,
    pub housing: f64,
    /// Energy, water and internet.
    pub utilities: f64,
    pub food: f64,
    pub transport: f64,
    pub credit_card: f64,
    pub health: f64,
    pub education: f64,
    pub leisure: f64,
    pub other: f64,
}

impl PersonalData {
    pub fn total_expenses(&self) -> f64 {
        self.housing
            + self.utilities
            + self.food
            + self.transport
            + self.credit_card
            + self.health
            + self.education
            + self.leisure
            + self.other
    }
}

// ──────────────────────────────────────────────────────────────
//  Business profile
// ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    Physical,
    Online,
    Both,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl StoreType {
    pub const CHOICES: [StoreType; 3] = [StoreType::Physical, StoreType::Online, StoreType::Both];

    /// Raw code written into prompts.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreType::Physical => "physical",
            StoreType::Online => "online",
            StoreType::Both => "both",
            StoreType::Unset => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StoreType::Physical => "Apenas Física",
            StoreType::Online => "Apenas Online",
            StoreType::Both => "Ambas",
            StoreType::Unset => "Selecione...",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMethod {
    Spreadsheet,
    System,
    #[serde(rename = "none")]
    NoControl,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl ControlMethod {
    pub const CHOICES: [ControlMethod; 3] = [
        ControlMethod::Spreadsheet,
        ControlMethod::System,
        ControlMethod::NoControl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlMethod::Spreadsheet => "spreadsheet",
            ControlMethod::System => "system",
            ControlMethod::NoControl => "none",
            ControlMethod::Unset => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlMethod::Spreadsheet => "Planilhas",
            ControlMethod::System => "Sistema (ERP)",
            ControlMethod::NoControl => "Nenhum controle formal",
            ControlMethod::Unset => "Selecione...",
        }
    }
}

/// Follow-up cadence options offered by the profile form.
pub const FOLLOW_UP_FREQUENCIES: [&str; 4] = ["Diário", "Semanal", "Mensal", "Raramente"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileGeneral {
    pub name: String,
    pub segment: String,
    pub years_in_business: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileStructure {
    #[serde(rename = "type")]
    pub store_type: StoreType,
    pub hours: String,
    pub units: String,
}

impl Default for ProfileStructure {
    fn default() -> Self {
        Self {
            store_type: StoreType::Unset,
            hours: String::new(),
            units: "1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileTeam {
    pub total: u32,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileOperation {
    pub offerings: String,
    pub sales_channel: Vec<String>,
    pub suppliers: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileFinance {
    pub has_control: bool,
    pub method: ControlMethod,
    pub frequency: String,
}

/// Optional descriptive context about the company, folded into business prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessProfile {
    pub general: ProfileGeneral,
    pub structure: ProfileStructure,
    pub team: ProfileTeam,
    pub operation: ProfileOperation,
    pub finance: ProfileFinance,
}

impl BusinessProfile {
    /// A profile only counts once it has a trade name.
    pub fn is_configured(&self) -> bool {
        !self.general.name.is_empty()
    }
}

// ──────────────────────────────────────────────────────────────
//  History
// ──────────────────────────────────────────────────────────────

/// Headline figures pulled out of a response for the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub faturamento: String,
    pub lucro_bruto: String,
}

/// A saved prompt/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnalysisType,
    /// RFC 3339 timestamp of when the analysis finished.
    pub date: String,
    pub month_year: String,
    pub input: String,
    pub result: String,
    pub summary: HistorySummary,
}

/// Overall health classification read from the status section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BusinessStatus {
    Healthy,
    Attention,
    Risk,
}

impl BusinessStatus {
    pub fn label(self) -> &'static str {
        match self {
            BusinessStatus::Healthy => "Saudável",
            BusinessStatus::Attention => "Atenção",
            BusinessStatus::Risk => "Risco",
        }
    }
}
