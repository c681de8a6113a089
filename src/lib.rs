//! # Income Analyzer
//!
//! A library for deterministic six-month income verification ("apuração de
//! renda") over bank-statement movements that have already been segmented
//! into discrete records.
//!
//! ## Core Concepts
//!
//! - **Window**: the 6 calendar months in scope for a reference date. On or
//!   after day 25 the current month is dropped as incomplete.
//! - **Classification**: nine ordered exclusion rules (self-transfer, exact
//!   surname, kinship, prohibited transaction types, gambling origins,
//!   payroll naming, minimum amount, churn round-trips, out-of-window);
//!   the first match decides the reported reason.
//! - **Aggregation**: one bucket per resolved month, empty months included,
//!   with totals always re-derived from the valid rows.
//! - **Ledger**: `set_validity` and `set_amount` are the only sanctioned
//!   mutations after creation; both recompute every aggregate.
//!
//! ## Example
//!
//! ```rust,ignore
//! use income_analyzer::*;
//! use chrono::NaiveDate;
//!
//! let context = CaseContext::new("Ana Silva");
//! let records = vec![RawTransaction {
//!     date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
//!     description: "PIX recebido".to_string(),
//!     amount: 1500.0,
//!     bank: "Banco Azul".to_string(),
//!     sender: "Empresa XYZ".to_string(),
//!     direction: Direction::Inflow,
//!     is_valid: None,
//! }];
//!
//! let reference = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
//! let verification = analyze_records(&records, &context, reference, "raw text")?;
//! assert_eq!(verification.monthly_data.len(), 6);
//! ```

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod export;
pub mod ledger;
pub mod period;
pub mod schema;
pub mod store;

#[cfg(feature = "gemini")]
pub mod llm;

pub use aggregator::build_verification;
pub use classifier::{
    normalize_text, ChurnIndex, Classification, TransactionClassifier, CHURN_WINDOW_DAYS,
    MIN_ELIGIBLE_AMOUNT,
};
pub use error::{Result, VerificationError};
pub use export::{MonthTotal, ValidTransactionRow, VerificationExport, VerificationSummary};
pub use period::{resolve_window, MonthRef, CURRENT_MONTH_CUTOFF_DAY, WINDOW_MONTHS};
pub use schema::*;
pub use store::{MemoryStore, VerificationStore};

#[cfg(feature = "gemini")]
pub use llm::{GeminiClient, StatementSegmenter};

use chrono::NaiveDate;
use log::{debug, info};

/// Validates segmenter output and builds a complete verification. Rejects
/// malformed records before any classification happens, so a failure never
/// leaves a partial verification behind.
pub fn analyze_records(
    records: &[RawTransaction],
    context: &CaseContext,
    reference_date: NaiveDate,
    raw_input: &str,
) -> Result<IncomeVerification> {
    validate_context(context)?;
    validate_records(records)?;

    info!(
        "Building income verification for client: {}",
        context.client_name
    );
    debug!(
        "{} candidate records, reference date {}",
        records.len(),
        reference_date
    );

    Ok(build_verification(records, context, reference_date, raw_input))
}

/// Segments raw statement text through the LLM collaborator, then runs the
/// deterministic pipeline over its output.
#[cfg(feature = "gemini")]
pub async fn analyze_statement(
    segmenter: &StatementSegmenter,
    statement_text: &str,
    context: &CaseContext,
    reference_date: NaiveDate,
) -> Result<IncomeVerification> {
    let records = segmenter
        .segment(statement_text, context, reference_date)
        .await?;
    analyze_records(&records, context, reference_date, statement_text)
}

fn validate_context(context: &CaseContext) -> Result<()> {
    if context.client_name.trim().is_empty() {
        return Err(VerificationError::MalformedInput(
            "client name is empty".to_string(),
        ));
    }
    Ok(())
}

/// Checks the required fields the segmenter contract promises. Serde
/// already rejects structurally missing fields; this catches values that
/// parse but cannot be classified.
pub fn validate_records(records: &[RawTransaction]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        if !record.amount.is_finite() || record.amount < 0.0 {
            return Err(VerificationError::MalformedInput(format!(
                "record #{} has invalid amount {}",
                index, record.amount
            )));
        }
        if record.sender.trim().is_empty() {
            return Err(VerificationError::MalformedInput(format!(
                "record #{} is missing the sender name",
                index
            )));
        }
        if record.description.trim().is_empty() {
            return Err(VerificationError::MalformedInput(format!(
                "record #{} is missing the description",
                index
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn inflow(sender: &str, amount: f64, on: NaiveDate) -> RawTransaction {
        RawTransaction {
            date: on,
            description: "PIX recebido".to_string(),
            amount,
            bank: "Banco Azul".to_string(),
            sender: sender.to_string(),
            direction: Direction::Inflow,
            is_valid: None,
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let records = vec![
            inflow("Empresa XYZ", 1500.0, date(2026, 1, 12)),
            inflow("Empresa XYZ", 25.0, date(2026, 1, 15)),
        ];
        let context = CaseContext::new("Ana Silva");

        let verification =
            analyze_records(&records, &context, date(2026, 2, 10), "extrato bruto").unwrap();

        assert_eq!(verification.monthly_data.len(), 6);
        assert_eq!(verification.period_start, "Setembro/2025");
        assert_eq!(verification.period_end, "Fevereiro/2026");

        let january = verification
            .monthly_data
            .iter()
            .find(|m| m.month == "Janeiro/2026")
            .unwrap();
        assert_eq!(january.total, 1500.0);
        assert_eq!(january.transactions.len(), 2);

        assert_eq!(verification.total_income, 1500.0);
        assert_eq!(verification.average_income, 250.0);
        assert_eq!(verification.raw_input, "extrato bruto");
    }

    #[test]
    fn test_zero_records_is_a_valid_degenerate_case() {
        let context = CaseContext::new("Ana Silva");
        let verification = analyze_records(&[], &context, date(2026, 2, 10), "").unwrap();

        assert_eq!(verification.monthly_data.len(), 6);
        assert!(verification
            .monthly_data
            .iter()
            .all(|m| m.transactions.is_empty() && m.total == 0.0));
        assert_eq!(verification.total_income, 0.0);
        assert_eq!(verification.average_income, 0.0);
    }

    #[test]
    fn test_malformed_records_rejected_before_classification() {
        let context = CaseContext::new("Ana Silva");

        let negative = vec![inflow("Empresa XYZ", -10.0, date(2026, 1, 12))];
        assert!(matches!(
            analyze_records(&negative, &context, date(2026, 2, 10), ""),
            Err(VerificationError::MalformedInput(_))
        ));

        let no_sender = vec![inflow("  ", 100.0, date(2026, 1, 12))];
        assert!(matches!(
            analyze_records(&no_sender, &context, date(2026, 2, 10), ""),
            Err(VerificationError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_empty_client_name_rejected() {
        let context = CaseContext::new("   ");
        assert!(matches!(
            analyze_records(&[], &context, date(2026, 2, 10), ""),
            Err(VerificationError::MalformedInput(_))
        ));
    }
}
