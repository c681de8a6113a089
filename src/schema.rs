use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity context for one verification run. Used by the classifier to
/// exclude self-transfers, same-surname senders and kinship transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseContext {
    pub client_name: String,
    #[serde(default)]
    pub father_name: Option<String>,
    #[serde(default)]
    pub mother_name: Option<String>,
}

impl CaseContext {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            father_name: None,
            mother_name: None,
        }
    }

    pub fn with_parents(
        mut self,
        father_name: Option<String>,
        mother_name: Option<String>,
    ) -> Self {
        self.father_name = father_name;
        self.mother_name = mother_name;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[schemars(description = "Credit: money entering the account")]
    Inflow,

    #[schemars(description = "Debit: money leaving the account")]
    Outflow,
}

/// One statement movement as produced by the segmenter, before
/// classification. The `is_valid` field is a provisional judgment only;
/// the classifier is the authority of record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawTransaction {
    #[schemars(description = "Movement date in YYYY-MM-DD format")]
    pub date: NaiveDate,

    #[schemars(description = "Free-text description/history line from the statement")]
    pub description: String,

    #[schemars(description = "Absolute monetary value of the movement, in the statement currency")]
    pub amount: f64,

    #[schemars(description = "Bank the statement belongs to. Keep banks separate when the text contains more than one.")]
    pub bank: String,

    #[schemars(description = "Counterparty name (sender for inflows, recipient for outflows)")]
    pub sender: String,

    #[schemars(description = "Whether this movement is a credit (inflow) or a debit (outflow)")]
    pub direction: Direction,

    #[serde(default)]
    #[schemars(
        description = "Optional provisional judgment of whether an inflow looks like valid income. Advisory only: the deterministic classifier decides."
    )]
    pub is_valid: Option<bool>,
}

/// The segmenter's wire contract: an ordered sequence of discrete
/// movements extracted from raw statement text.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatementExtract {
    #[schemars(
        description = "All discrete movements found in the statement, in the order they appear. Do not filter or aggregate."
    )]
    pub records: Vec<RawTransaction>,
}

impl StatementExtract {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(StatementExtract)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Generates a Gemini-compatible JSON schema (no $ref, $schema, or definitions)
    pub fn gemini_response_schema() -> serde_json::Result<serde_json::Value> {
        clean_schema(Self::generate_json_schema())
    }
}

fn clean_schema(root: schemars::schema::RootSchema) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(&root)?;

    let definitions = value
        .get("definitions")
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("definitions");
        obj.remove("title");
    }

    inline_refs(&mut value, &definitions);
    Ok(value)
}

fn inline_refs(node: &mut serde_json::Value, definitions: &serde_json::Value) {
    match node {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(reference)) = map.get("$ref") {
                if let Some(name) = reference.strip_prefix("#/definitions/") {
                    if let Some(definition) = definitions.get(name) {
                        let mut replacement = definition.clone();
                        inline_refs(&mut replacement, definitions);
                        if let Some(rep) = replacement.as_object_mut() {
                            rep.remove("title");
                        }
                        *node = replacement;
                        return;
                    }
                }
            }
            for value in map.values_mut() {
                inline_refs(value, definitions);
            }
        }
        serde_json::Value::Array(items) => {
            for value in items {
                inline_refs(value, definitions);
            }
        }
        _ => {}
    }
}

/// Why the classifier excluded an inflow from the income totals.
/// Informational metadata: a manual `set_validity` override does not
/// rewrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    SelfTransfer,
    SameSurname,
    Kinship,
    ProhibitedTransactionType,
    GamblingOrigin,
    PayrollNaming,
    BelowMinimum,
    ChurnPattern,
    OutOfWindow,
}

impl ExclusionReason {
    /// Operator-facing label, as shown in the review grid.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelfTransfer => "Entrada do próprio favorecido",
            Self::SameSurname => "Sobrenome idêntico ao do cliente",
            Self::Kinship => "Transferência de pai ou mãe",
            Self::ProhibitedTransactionType => "Tipo de transação proibido",
            Self::GamblingOrigin => "Origem de apostas/jogos",
            Self::PayrollNaming => "Nomenclatura de salário/vencimento",
            Self::BelowMinimum => "Valor abaixo do mínimo de R$ 30,00",
            Self::ChurnPattern => "Valor corriqueiro (entra e sai)",
            Self::OutOfWindow => "Fora do período de apuração",
        }
    }
}

/// A classified inflow inside a month bucket. Immutable except for the
/// two user-editable fields, which only the ledger operations touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub bank: String,
    pub sender: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_reason: Option<ExclusionReason>,
}

impl Transaction {
    pub fn from_record(
        record: &RawTransaction,
        is_valid: bool,
        exclusion_reason: Option<ExclusionReason>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: record.date,
            description: record.description.clone(),
            amount: record.amount,
            bank: record.bank.clone(),
            sender: record.sender.clone(),
            is_valid,
            exclusion_reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthBucket {
    /// Canonical "Mês/Ano" label, unique within a verification.
    pub month: String,
    /// Insertion order = classification order.
    pub transactions: Vec<Transaction>,
    /// Sum of `amount` over valid transactions. Always recomputed,
    /// never trusted from upstream.
    pub total: f64,
}

impl MonthBucket {
    pub fn empty(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            transactions: Vec::new(),
            total: 0.0,
        }
    }

    pub fn valid_total(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.is_valid)
            .map(|t| t.amount)
            .sum()
    }
}

/// One complete income-analysis run for a client over a resolved month
/// window. Identity is immutable; content is only mutated through the
/// ledger operations, which re-derive every aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeVerification {
    pub id: Uuid,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub period_start: String,
    pub period_end: String,
    pub monthly_data: Vec<MonthBucket>,
    pub total_income: f64,
    pub average_income: f64,
    /// Retained source text for audit.
    pub raw_input: String,
}
