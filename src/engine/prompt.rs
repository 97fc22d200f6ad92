//! Turns collected figures into the template context for the prompt, and
//! holds the built-in templates and system instructions.

use serde::Serialize;

use crate::common::format::format_brl;
use crate::engine::model::{AnalysisType, BusinessData, BusinessProfile, PersonalData};

pub const BUSINESS_TEMPLATE: &str = include_str!("../../templates/business_prompt.hbs");
pub const PERSONAL_TEMPLATE: &str = include_str!("../../templates/personal_prompt.hbs");

const BUSINESS_SYSTEM_INSTRUCTION: &str = include_str!("../../templates/business_system.txt");
const PERSONAL_SYSTEM_INSTRUCTION: &str = include_str!("../../templates/personal_system.txt");

pub fn builtin_template(kind: AnalysisType) -> &'static str {
    match kind {
        AnalysisType::Business => BUSINESS_TEMPLATE,
        AnalysisType::Personal => PERSONAL_TEMPLATE,
    }
}

/// The system instruction that fixes the response layout the parser expects.
pub fn builtin_system_instruction(kind: AnalysisType) -> &'static str {
    match kind {
        AnalysisType::Business => BUSINESS_SYSTEM_INSTRUCTION.trim_end(),
        AnalysisType::Personal => PERSONAL_SYSTEM_INSTRUCTION.trim_end(),
    }
}

// ──────────────────────────────────────────────────────────────
//  Business context
// ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub name: String,
    pub segment: String,
    pub years_in_business: String,
    pub location: String,
    pub structure_type: String,
    pub units: String,
    pub offerings: String,
    pub sales_channels: String,
    pub control_method: String,
    pub frequency: String,
}

#[derive(Debug, Serialize)]
pub struct FixedCostsContext {
    pub energy: String,
    pub water: String,
    pub internet: String,
    pub software: String,
    pub rent: String,
    pub maintenance: String,
}

#[derive(Debug, Serialize)]
pub struct RoleContext {
    pub role: String,
    pub count: u32,
    pub total_salary: String,
}

#[derive(Debug, Serialize)]
pub struct VariableCostsContext {
    pub taxes: String,
    pub marketing: String,
    pub commissions: String,
    pub logistics: String,
}

#[derive(Debug, Serialize)]
pub struct OtherCostContext {
    pub description: String,
    pub value: String,
}

/// The complete, serializable context passed to the business template.
#[derive(Debug, Serialize)]
pub struct BusinessPromptContext {
    /// Only present when the profile has been configured.
    pub profile: Option<ProfileContext>,
    pub period: String,
    pub revenue: String,
    pub direct_costs: String,
    pub fixed: FixedCostsContext,
    pub staff_count: u32,
    pub roles: Vec<RoleContext>,
    pub variable: VariableCostsContext,
    pub other_costs: Vec<OtherCostContext>,
}

impl BusinessPromptContext {
    pub fn new(data: &BusinessData, profile: Option<&BusinessProfile>) -> Self {
        let profile = profile.filter(|p| p.is_configured()).map(|p| ProfileContext {
            name: p.general.name.clone(),
            segment: p.general.segment.clone(),
            years_in_business: p.general.years_in_business.clone(),
            location: p.general.location.clone(),
            structure_type: p.structure.store_type.as_str().to_string(),
            units: p.structure.units.clone(),
            offerings: p.operation.offerings.clone(),
            sales_channels: p.operation.sales_channel.join(", "),
            control_method: p.finance.method.as_str().to_string(),
            frequency: p.finance.frequency.clone(),
        });

        let fc = &data.fixed_costs;
        let vc = &data.variable_costs;
        Self {
            profile,
            period: data.period.clone(),
            revenue: format_brl(data.revenue),
            direct_costs: format_brl(data.direct_costs),
            fixed: FixedCostsContext {
                energy: format_brl(fc.energy),
                water: format_brl(fc.water),
                internet: format_brl(fc.internet),
                software: format_brl(fc.software),
                rent: format_brl(fc.rent),
                maintenance: format_brl(fc.maintenance),
            },
            staff_count: data.staff.total_count,
            roles: data
                .staff
                .roles
                .iter()
                .map(|r| RoleContext {
                    role: r.role.clone(),
                    count: r.count,
                    total_salary: format_brl(r.total_salary),
                })
                .collect(),
            variable: VariableCostsContext {
                taxes: format_brl(vc.taxes),
                marketing: format_brl(vc.marketing),
                commissions: format_brl(vc.commissions),
                logistics: format_brl(vc.logistics),
            },
            other_costs: data
                .other_costs
                .iter()
                .map(|o| OtherCostContext {
                    description: o.description.clone(),
                    value: format_brl(o.value),
                })
                .collect(),
        }
    }
}

// ──────────────────────────────────────────────────────────────
//  Personal context
// ──────────────────────────────────────────────────────────────

/// The complete, serializable context passed to the personal template.
#[derive(Debug, Serialize)]
pub struct PersonalPromptContext {
    pub period: String,
    pub income: String,
    pub housing: String,
    pub utilities: String,
    pub food: String,
    pub transport: String,
    pub credit_card: String,
    pub health: String,
    pub education: String,
    pub leisure: String,
    pub other: String,
}

impl From<&PersonalData> for PersonalPromptContext {
    fn from(d: &PersonalData) -> Self {
        Self {
            period: d.period.clone(),
            income: format_brl(d.income),
            housing: format_brl(d.housing),
            utilities: format_brl(d.utilities),
            food: format_brl(d.food),
            transport: format_brl(d.transport),
            credit_card: format_brl(d.credit_card),
            health: format_brl(d.health),
            education: format_brl(d.education),
            leisure: format_brl(d.leisure),
            other: format_brl(d.other),
        }
    }
}
