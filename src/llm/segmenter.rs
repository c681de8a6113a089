use crate::error::{Result, VerificationError};
use crate::llm::client::GeminiClient;
use crate::period::CURRENT_MONTH_CUTOFF_DAY;
use crate::schema::{CaseContext, RawTransaction, StatementExtract};
use chrono::{Datelike, NaiveDate};
use log::debug;

const MAX_PARSE_RETRIES: usize = 2;

/// Statement segmentation collaborator: turns raw statement text into an
/// ordered sequence of candidate movement records. Extraction only; the
/// deterministic classifier remains the authority over eligibility.
pub struct StatementSegmenter {
    client: GeminiClient,
    model: String,
    system_prompt: String,
}

impl StatementSegmenter {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        let default_prompt = include_str!("../../SEGMENTER_PROMPT.md").to_string();
        Self {
            client,
            model: model.into(),
            system_prompt: default_prompt,
        }
    }

    /// Allow the caller to load a specific prompt file (e.g., for a bank
    /// with unusual statement formatting)
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub async fn segment(
        &self,
        statement_text: &str,
        context: &CaseContext,
        reference_date: NaiveDate,
    ) -> Result<Vec<RawTransaction>> {
        let system_instruction = self.build_system_instruction(context, reference_date);
        let schema = StatementExtract::gemini_response_schema()?;

        let base_request = format!(
            "Segmente este extrato em movimentações discretas:\n\n{}",
            statement_text
        );

        let mut last_error = String::new();
        for attempt in 1..=MAX_PARSE_RETRIES + 1 {
            let user_text = if attempt == 1 {
                base_request.clone()
            } else {
                format!(
                    "{}\n\nSua resposta anterior não era JSON válido conforme o schema \
                     ({}). Retorne APENAS JSON válido.",
                    base_request, last_error
                )
            };

            let raw = self
                .client
                .generate_content(&self.model, &system_instruction, &user_text, Some(schema.clone()))
                .await?;

            match serde_json::from_str::<StatementExtract>(&clean_json_output(&raw)) {
                Ok(extract) => {
                    debug!(
                        "segmenter returned {} records on attempt {}",
                        extract.records.len(),
                        attempt
                    );
                    return Ok(extract.records);
                }
                Err(e) => {
                    debug!("segmenter parse failure on attempt {}: {}", attempt, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(VerificationError::MalformedInput(format!(
            "segmenter output did not match the statement schema after {} attempts: {}",
            MAX_PARSE_RETRIES + 1,
            last_error
        )))
    }

    fn build_system_instruction(&self, context: &CaseContext, reference_date: NaiveDate) -> String {
        let not_informed = "Não informado".to_string();
        format!(
            "{}\n\n### CONTEXTO\nHoje é dia {} de {}/{}. Entradas de meses com dia {} \
             ou posterior podem pertencer a um ciclo incompleto; extraia-as mesmo assim.\n\
             Cliente: {}\nPai: {}\nMãe: {}\n",
            self.system_prompt,
            reference_date.day(),
            reference_date.month(),
            reference_date.year(),
            CURRENT_MONTH_CUTOFF_DAY,
            context.client_name,
            context.father_name.as_ref().unwrap_or(&not_informed),
            context.mother_name.as_ref().unwrap_or(&not_informed),
        )
    }
}

fn clean_json_output(raw: &str) -> String {
    if let Some(start) = raw.find('{') {
        if let Some(end) = raw.rfind('}') {
            return raw[start..=end].to_string();
        }
    }
    if let Some(start) = raw.find('[') {
        if let Some(end) = raw.rfind(']') {
            return raw[start..=end].to_string();
        }
    }
    raw.trim().to_string()
}
