use anyhow::{Result, bail};
use serde_json::Value;

use crate::{
    common::storage::LocalStore,
    engine::{
        client::{AnalysisClient, GenerateRequest},
        config::AnalysisConfig,
        history::save_record,
        model::{AnalysisType, BusinessData, BusinessProfile, HistoryRecord, PersonalData},
        prompt::{BusinessPromptContext, PersonalPromptContext},
    },
    ui::template::{handlebars_setup, render_template},
};

/// The only failure text users ever see for a model call.
pub const GENERIC_FAILURE: &str = "Não foi possível processar os dados agora.";

/// Collected figures for one analysis.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    Business {
        data: BusinessData,
        profile: Option<BusinessProfile>,
    },
    Personal(PersonalData),
}

impl AnalysisInput {
    pub fn kind(&self) -> AnalysisType {
        match self {
            AnalysisInput::Business { .. } => AnalysisType::Business,
            AnalysisInput::Personal(_) => AnalysisType::Personal,
        }
    }

    pub fn period(&self) -> &str {
        match self {
            AnalysisInput::Business { data, .. } => &data.period,
            AnalysisInput::Personal(data) => &data.period,
        }
    }

    /// The template context as a generic value for Handlebars.
    pub fn template_value(&self) -> Result<Value> {
        Ok(match self {
            AnalysisInput::Business { data, profile } => {
                serde_json::to_value(BusinessPromptContext::new(data, profile.as_ref()))?
            }
            AnalysisInput::Personal(data) => {
                serde_json::to_value(PersonalPromptContext::from(data))?
            }
        })
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub prompt: String,
    pub response: String,
    /// `None` when no store was given or saving failed.
    pub record: Option<HistoryRecord>,
}

/// Holds configuration and the prompt template for one run.
#[derive(Debug)]
pub struct AnalysisSession {
    pub config: AnalysisConfig,
    template: String,
}

impl AnalysisSession {
    pub fn new(config: AnalysisConfig, template: impl Into<String>) -> Self {
        Self {
            config,
            template: template.into(),
        }
    }

    fn template_name(&self) -> &'static str {
        self.config.kind.slug()
    }

    pub fn render_prompt(&self, input: &AnalysisInput) -> Result<String> {
        let name = self.template_name();
        let hb = handlebars_setup(&self.template, name)?;
        render_template(&hb, name, &input.template_value()?)
    }

    /// Renders the prompt, asks the model and records the answer in history.
    ///
    /// Template problems surface as they are. Anything that goes wrong with the
    /// model call is logged and reported as [`GENERIC_FAILURE`].
    pub fn run(
        &self,
        client: &dyn AnalysisClient,
        input: &AnalysisInput,
        store: Option<&LocalStore>,
    ) -> Result<AnalysisOutcome> {
        let prompt = self.render_prompt(input)?;
        log::debug!("prompt for {} analysis:\n{prompt}", self.config.kind);

        let request = GenerateRequest::new(&self.config, &prompt);
        let response = match client.generate(&request) {
            Ok(Some(text)) => text,
            Ok(None) => {
                log::warn!("model returned an empty answer");
                bail!(GENERIC_FAILURE);
            }
            Err(e) => {
                log::warn!("analysis request failed: {e}");
                log::debug!("{e:?}");
                bail!(GENERIC_FAILURE);
            }
        };

        let record = store.and_then(|s| {
            save_record(s, self.config.kind, input.period(), &prompt, &response)
                .map_err(|e| log::warn!("could not save analysis to history: {e:#}"))
                .ok()
        });

        Ok(AnalysisOutcome {
            prompt,
            response,
            record,
        })
    }
}
