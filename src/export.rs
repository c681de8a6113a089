use crate::schema::IncomeVerification;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthTotal {
    pub month: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub period_start: String,
    pub period_end: String,
    pub total_income: f64,
    pub average_income: f64,
    pub monthly_totals: Vec<MonthTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidTransactionRow {
    pub date: NaiveDate,
    pub description: String,
    pub sender: String,
    pub bank: String,
    pub amount: f64,
    pub month: String,
}

/// Pure export contract for presentation/export collaborators: a summary
/// record plus the flat list of valid transactions. Invalid rows are
/// excluded at construction time, not hidden behind a filter flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationExport {
    pub summary: VerificationSummary,
    pub transactions: Vec<ValidTransactionRow>,
}

impl VerificationExport {
    pub fn from_verification(verification: &IncomeVerification) -> Self {
        let monthly_totals = verification
            .monthly_data
            .iter()
            .map(|m| MonthTotal {
                month: m.month.clone(),
                total: m.total,
            })
            .collect();

        let transactions = verification
            .monthly_data
            .iter()
            .flat_map(|bucket| {
                bucket
                    .transactions
                    .iter()
                    .filter(|t| t.is_valid)
                    .map(|t| ValidTransactionRow {
                        date: t.date,
                        description: t.description.clone(),
                        sender: t.sender.clone(),
                        bank: t.bank.clone(),
                        amount: t.amount,
                        month: bucket.month.clone(),
                    })
            })
            .collect();

        Self {
            summary: VerificationSummary {
                client_name: verification.client_name.clone(),
                father_name: verification.father_name.clone(),
                mother_name: verification.mother_name.clone(),
                created_at: verification.created_at,
                period_start: verification.period_start.clone(),
                period_end: verification.period_end.clone(),
                total_income: verification.total_income,
                average_income: verification.average_income,
                monthly_totals,
            },
            transactions,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Flat valid-transaction sheet, one row per transaction.
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("DATA,DESCRIÇÃO,REMETENTE,BANCO,VALOR,MÊS REF\n");

        for row in &self.transactions {
            output.push_str(&format!(
                "{},{},{},{},{:.2},{}\n",
                row.date.format("%Y-%m-%d"),
                csv_field(&row.description),
                csv_field(&row.sender),
                csv_field(&row.bank),
                row.amount,
                csv_field(&row.month)
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# Apuração de Renda - {}\n\n",
            self.summary.client_name
        ));
        output.push_str(&format!(
            "**Período:** {} a {}\n\n",
            self.summary.period_start, self.summary.period_end
        ));
        output.push_str(&format!(
            "**Renda Total Acumulada:** {:.2}\n\n",
            self.summary.total_income
        ));
        output.push_str(&format!(
            "**Média Mensal Apurada:** {:.2}\n\n",
            self.summary.average_income
        ));

        output.push_str("## Detalhamento Mensal\n\n");
        for month in &self.summary.monthly_totals {
            output.push_str(&format!("- {}: {:.2}\n", month.month, month.total));
        }
        output.push('\n');

        output.push_str("## Transações Válidas\n\n");
        output.push_str("| Data | Descrição | Remetente | Banco | Valor | Mês |\n");
        output.push_str("|------|-----------|-----------|-------|-------|-----|\n");
        for row in &self.transactions {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {:.2} | {} |\n",
                row.date.format("%Y-%m-%d"),
                row.description,
                row.sender,
                row.bank,
                row.amount,
                row.month
            ));
        }

        output
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_verification;
    use crate::schema::{CaseContext, Direction, RawTransaction};
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_export() -> VerificationExport {
        let records = vec![
            RawTransaction {
                date: date(2026, 1, 5),
                description: "PIX recebido, referência obra".to_string(),
                amount: 1500.0,
                bank: "Banco Azul".to_string(),
                sender: "Empresa XYZ".to_string(),
                direction: Direction::Inflow,
                is_valid: None,
            },
            RawTransaction {
                date: date(2026, 1, 6),
                description: "PIX recebido".to_string(),
                amount: 25.0,
                bank: "Banco Azul".to_string(),
                sender: "Empresa XYZ".to_string(),
                direction: Direction::Inflow,
                is_valid: None,
            },
        ];
        let verification =
            build_verification(&records, &CaseContext::new("Ana Silva"), date(2026, 2, 10), "");
        VerificationExport::from_verification(&verification)
    }

    #[test]
    fn test_invalid_rows_excluded_by_construction() {
        let export = sample_export();
        assert_eq!(export.transactions.len(), 1);
        assert_eq!(export.transactions[0].amount, 1500.0);
        assert_eq!(export.transactions[0].month, "Janeiro/2026");
    }

    #[test]
    fn test_summary_carries_per_month_totals() {
        let export = sample_export();
        assert_eq!(export.summary.monthly_totals.len(), 6);
        assert_eq!(export.summary.total_income, 1500.0);
        assert_eq!(export.summary.average_income, 250.0);
    }

    #[test]
    fn test_csv_quotes_embedded_commas() {
        let export = sample_export();
        let csv = export.to_csv();
        assert!(csv.starts_with("DATA,DESCRIÇÃO"));
        assert!(csv.contains("\"PIX recebido, referência obra\""));
        assert!(!csv.contains("25.00"));
    }

    #[test]
    fn test_markdown_sections() {
        let export = sample_export();
        let markdown = export.to_markdown();
        assert!(markdown.contains("# Apuração de Renda - Ana Silva"));
        assert!(markdown.contains("## Detalhamento Mensal"));
        assert!(markdown.contains("| Empresa XYZ |"));
    }
}
