//! Deterministic income-eligibility rules for statement inflows.
//!
//! The rules are evaluated in a fixed order and the first match wins, so
//! the reported exclusion reason is deterministic even when several rules
//! would apply. Keyword sets for prohibited transaction types, gambling
//! origins and payroll naming are conservative heuristics over normalized
//! text.

use crate::period::MonthRef;
use crate::schema::{CaseContext, Direction, ExclusionReason, RawTransaction};
use chrono::NaiveDate;
use log::debug;

/// Inflows strictly below this value are never counted as income.
pub const MIN_ELIGIBLE_AMOUNT: f64 = 30.0;

/// An equal-amount outflow to the same counterparty within this many days
/// after the inflow marks the pair as a round trip.
pub const CHURN_WINDOW_DAYS: i64 = 3;

const AMOUNT_EPSILON: f64 = 0.005;

const PROHIBITED_TYPE_KEYWORDS: &[&str] = &[
    "pix cartao",
    "cartao de credito",
    "reembolso",
    "estorno",
    "chargeback",
    "rendimento",
    "aplicacao",
    "resgate",
    "investimento",
    "boleto",
];

const GAMBLING_TOKENS: &[&str] = &[
    "aposta", "apostas", "cassino", "casino", "bingo", "jogo", "jogos", "game", "games",
    "loteria",
];

const PAYROLL_KEYWORDS: &[&str] = &["salario", "liquido de vencimento"];

/// Outcome of classifying one candidate inflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_valid: bool,
    pub reason: Option<ExclusionReason>,
}

impl Classification {
    fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    fn excluded(reason: ExclusionReason) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason),
        }
    }
}

/// Lowercases, strips Portuguese diacritics and collapses whitespace so
/// that name and keyword comparisons are exact on the folded form.
pub fn normalize_text(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(fold_accent)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

fn surname(normalized: &str) -> Option<&str> {
    normalized.split_whitespace().last()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Token-level gambling match. "bet" also matches as a token prefix to
/// cover house names like bet365 and Betano.
fn is_gambling(normalized: &str) -> bool {
    normalized
        .split_whitespace()
        .any(|token| token.starts_with("bet") || GAMBLING_TOKENS.contains(&token))
}

/// Same-amount outflow lookup for the churn rule, built once over the
/// full statement so each inflow check is a scan of outflows only.
#[derive(Debug, Default)]
pub struct ChurnIndex {
    outflows: Vec<(String, f64, NaiveDate)>,
}

impl ChurnIndex {
    pub fn build(records: &[RawTransaction]) -> Self {
        let outflows = records
            .iter()
            .filter(|r| r.direction == Direction::Outflow)
            .map(|r| (normalize_text(&r.sender), r.amount, r.date))
            .collect();
        Self { outflows }
    }

    /// True when an equal-magnitude outflow to the same counterparty
    /// exists on the inflow date or within the churn window after it.
    pub fn is_round_trip(&self, sender_normalized: &str, amount: f64, date: NaiveDate) -> bool {
        self.outflows.iter().any(|(out_sender, out_amount, out_date)| {
            out_sender == sender_normalized
                && (out_amount - amount).abs() < AMOUNT_EPSILON
                && *out_date >= date
                && (*out_date - date).num_days() <= CHURN_WINDOW_DAYS
        })
    }
}

/// Applies the ordered exclusion rules to candidate inflows. Context
/// names are normalized once at construction.
pub struct TransactionClassifier {
    client: String,
    client_surname: Option<String>,
    father: Option<String>,
    mother: Option<String>,
    window: Vec<MonthRef>,
    churn: ChurnIndex,
}

impl TransactionClassifier {
    pub fn new(context: &CaseContext, window: &[MonthRef], records: &[RawTransaction]) -> Self {
        let client = normalize_text(&context.client_name);
        let client_surname = surname(&client).map(str::to_string);
        Self {
            client,
            client_surname,
            father: context.father_name.as_deref().map(normalize_text),
            mother: context.mother_name.as_deref().map(normalize_text),
            window: window.to_vec(),
            churn: ChurnIndex::build(records),
        }
    }

    /// First matching rule wins. The window check runs before the
    /// identity and pattern rules; a record matching nothing is valid
    /// income with no reason.
    pub fn classify(&self, record: &RawTransaction) -> Classification {
        let verdict = self.apply_rules(record);

        if let Some(hint) = record.is_valid {
            if hint != verdict.is_valid {
                debug!(
                    "overriding segmenter validity hint for '{}' ({} -> {})",
                    record.sender, hint, verdict.is_valid
                );
            }
        }

        verdict
    }

    fn apply_rules(&self, record: &RawTransaction) -> Classification {
        if !self.window.contains(&MonthRef::from_date(record.date)) {
            return Classification::excluded(ExclusionReason::OutOfWindow);
        }

        let sender = normalize_text(&record.sender);
        let description = normalize_text(&record.description);

        if !sender.is_empty() && sender == self.client {
            return Classification::excluded(ExclusionReason::SelfTransfer);
        }

        if let (Some(sender_surname), Some(client_surname)) =
            (surname(&sender), self.client_surname.as_deref())
        {
            if sender_surname == client_surname {
                return Classification::excluded(ExclusionReason::SameSurname);
            }
        }

        let kin = [self.father.as_deref(), self.mother.as_deref()];
        if !sender.is_empty() && kin.iter().flatten().any(|name| *name == sender) {
            return Classification::excluded(ExclusionReason::Kinship);
        }

        if contains_any(&description, PROHIBITED_TYPE_KEYWORDS) {
            return Classification::excluded(ExclusionReason::ProhibitedTransactionType);
        }

        if is_gambling(&sender) || is_gambling(&description) {
            return Classification::excluded(ExclusionReason::GamblingOrigin);
        }

        if contains_any(&description, PAYROLL_KEYWORDS) {
            return Classification::excluded(ExclusionReason::PayrollNaming);
        }

        if record.amount < MIN_ELIGIBLE_AMOUNT {
            return Classification::excluded(ExclusionReason::BelowMinimum);
        }

        if self.churn.is_round_trip(&sender, record.amount, record.date) {
            return Classification::excluded(ExclusionReason::ChurnPattern);
        }

        Classification::valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::resolve_window;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn inflow(sender: &str, description: &str, amount: f64, day: u32) -> RawTransaction {
        RawTransaction {
            date: date(2026, 1, day),
            description: description.to_string(),
            amount,
            bank: "Banco Azul".to_string(),
            sender: sender.to_string(),
            direction: Direction::Inflow,
            is_valid: None,
        }
    }

    fn outflow(sender: &str, amount: f64, day: u32) -> RawTransaction {
        RawTransaction {
            direction: Direction::Outflow,
            ..inflow(sender, "PIX enviado", amount, day)
        }
    }

    fn classifier_for(client: &str, records: &[RawTransaction]) -> TransactionClassifier {
        let context = CaseContext::new(client);
        let window = resolve_window(date(2026, 2, 10));
        TransactionClassifier::new(&context, &window, records)
    }

    #[test]
    fn test_normalize_text_folds_accents_and_case() {
        assert_eq!(normalize_text("João  da SILVA"), "joao da silva");
        assert_eq!(normalize_text("Conceição Araújo"), "conceicao araujo");
    }

    #[test]
    fn test_self_transfer_excluded() {
        let record = inflow("Ana Silva", "PIX recebido", 500.0, 10);
        let classifier = classifier_for("Ana Silva", &[record.clone()]);
        assert_eq!(
            classifier.classify(&record).reason,
            Some(ExclusionReason::SelfTransfer)
        );
    }

    #[test]
    fn test_exact_surname_excluded() {
        let record = inflow("Maria Souza Lima", "PIX recebido", 500.0, 10);
        let classifier = classifier_for("João Lima", &[record.clone()]);
        assert_eq!(
            classifier.classify(&record).reason,
            Some(ExclusionReason::SameSurname)
        );
    }

    #[test]
    fn test_similar_surname_not_excluded() {
        for sender in ["Maria Souza Lim", "Maria Souza Lima Jr"] {
            let record = inflow(sender, "PIX recebido", 500.0, 10);
            let classifier = classifier_for("João Lima", &[record.clone()]);
            let verdict = classifier.classify(&record);
            assert!(verdict.is_valid, "sender {:?} should pass", sender);
        }
    }

    #[test]
    fn test_kinship_excluded() {
        let record = inflow("José Pereira", "PIX recebido", 500.0, 10);
        let context = CaseContext::new("Ana Silva")
            .with_parents(Some("José Pereira".to_string()), None);
        let window = resolve_window(date(2026, 2, 10));
        let classifier = TransactionClassifier::new(&context, &window, &[record.clone()]);
        assert_eq!(
            classifier.classify(&record).reason,
            Some(ExclusionReason::Kinship)
        );
    }

    #[test]
    fn test_prohibited_transaction_types_excluded() {
        for description in [
            "Estorno de compra",
            "Reembolso pedido 1234",
            "Rendimento de aplicação",
            "Resgate CDB",
            "Recebimento de boleto",
        ] {
            let record = inflow("Empresa XYZ", description, 500.0, 10);
            let classifier = classifier_for("Ana Silva", &[record.clone()]);
            assert_eq!(
                classifier.classify(&record).reason,
                Some(ExclusionReason::ProhibitedTransactionType),
                "description {:?}",
                description
            );
        }
    }

    #[test]
    fn test_gambling_origin_excluded() {
        for sender in ["Bet365 Pagamentos", "Betano", "Cassino Real", "Jogos Online LTDA"] {
            let record = inflow(sender, "PIX recebido", 500.0, 10);
            let classifier = classifier_for("Ana Silva", &[record.clone()]);
            assert_eq!(
                classifier.classify(&record).reason,
                Some(ExclusionReason::GamblingOrigin),
                "sender {:?}",
                sender
            );
        }
    }

    #[test]
    fn test_gambling_prefix_does_not_hit_ordinary_words() {
        let record = inflow("Roberto Nunes", "PIX recebido", 500.0, 10);
        let classifier = classifier_for("Ana Silva", &[record.clone()]);
        assert!(classifier.classify(&record).is_valid);
    }

    #[test]
    fn test_payroll_naming_excluded() {
        for description in ["Salário Novembro", "Líquido de vencimento"] {
            let record = inflow("Empresa XYZ", description, 2000.0, 10);
            let classifier = classifier_for("Ana Silva", &[record.clone()]);
            assert_eq!(
                classifier.classify(&record).reason,
                Some(ExclusionReason::PayrollNaming),
                "description {:?}",
                description
            );
        }
    }

    #[test]
    fn test_minimum_amount_boundary() {
        let below = inflow("Empresa XYZ", "PIX recebido", 29.99, 10);
        let classifier = classifier_for("Ana Silva", &[below.clone()]);
        assert_eq!(
            classifier.classify(&below).reason,
            Some(ExclusionReason::BelowMinimum)
        );

        let at = inflow("Empresa XYZ", "PIX recebido", 30.0, 10);
        let classifier = classifier_for("Ana Silva", &[at.clone()]);
        assert!(classifier.classify(&at).is_valid);
    }

    #[test]
    fn test_churn_round_trip_excluded() {
        let records = vec![
            inflow("Carlos Mendes", "PIX recebido", 800.0, 10),
            outflow("Carlos Mendes", 800.0, 12),
        ];
        let classifier = classifier_for("Ana Silva", &records);
        assert_eq!(
            classifier.classify(&records[0]).reason,
            Some(ExclusionReason::ChurnPattern)
        );
    }

    #[test]
    fn test_outflow_past_churn_window_is_not_churn() {
        let records = vec![
            inflow("Carlos Mendes", "PIX recebido", 800.0, 2),
            outflow("Carlos Mendes", 800.0, 10),
        ];
        let classifier = classifier_for("Ana Silva", &records);
        assert!(classifier.classify(&records[0]).is_valid);
    }

    #[test]
    fn test_different_amount_is_not_churn() {
        let records = vec![
            inflow("Carlos Mendes", "PIX recebido", 800.0, 10),
            outflow("Carlos Mendes", 750.0, 11),
        ];
        let classifier = classifier_for("Ana Silva", &records);
        assert!(classifier.classify(&records[0]).is_valid);
    }

    #[test]
    fn test_out_of_window_reported_first() {
        // Below-minimum AND out of window: the window check wins.
        let mut record = inflow("Empresa XYZ", "PIX recebido", 10.0, 10);
        record.date = date(2025, 1, 10);
        let classifier = classifier_for("Ana Silva", &[record.clone()]);
        assert_eq!(
            classifier.classify(&record).reason,
            Some(ExclusionReason::OutOfWindow)
        );
    }

    #[test]
    fn test_rule_order_self_transfer_before_minimum() {
        let record = inflow("Ana Silva", "PIX recebido", 5.0, 10);
        let classifier = classifier_for("Ana Silva", &[record.clone()]);
        assert_eq!(
            classifier.classify(&record).reason,
            Some(ExclusionReason::SelfTransfer)
        );
    }

    #[test]
    fn test_hint_is_advisory_only() {
        let mut record = inflow("Empresa XYZ", "PIX recebido", 25.0, 10);
        record.is_valid = Some(true);
        let classifier = classifier_for("Ana Silva", &[record.clone()]);
        let verdict = classifier.classify(&record);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason, Some(ExclusionReason::BelowMinimum));
    }
}
