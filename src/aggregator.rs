use crate::classifier::TransactionClassifier;
use crate::period::{resolve_window, MonthRef};
use crate::schema::{
    CaseContext, Direction, IncomeVerification, MonthBucket, RawTransaction, Transaction,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

/// Groups classified inflows into one bucket per resolved month and
/// derives the verification aggregates. Buckets cover exactly the window:
/// months with no eligible transactions stay as empty buckets, and
/// out-of-window inflows have no bucket to land in, so they are dropped.
pub fn build_verification(
    records: &[RawTransaction],
    context: &CaseContext,
    reference_date: NaiveDate,
    raw_input: impl Into<String>,
) -> IncomeVerification {
    let window = resolve_window(reference_date);
    let classifier = TransactionClassifier::new(context, &window, records);

    let mut buckets: Vec<MonthBucket> = window.iter().map(|m| MonthBucket::empty(m.label())).collect();

    for record in records.iter().filter(|r| r.direction == Direction::Inflow) {
        let verdict = classifier.classify(record);
        let month = MonthRef::from_date(record.date);
        if let Some(index) = window.iter().position(|m| *m == month) {
            buckets[index]
                .transactions
                .push(Transaction::from_record(record, verdict.is_valid, verdict.reason));
        }
    }

    let mut verification = IncomeVerification {
        id: Uuid::new_v4(),
        client_name: context.client_name.clone(),
        father_name: context.father_name.clone(),
        mother_name: context.mother_name.clone(),
        created_at: Utc::now(),
        period_start: buckets.first().map(|m| m.month.clone()).unwrap_or_default(),
        period_end: buckets.last().map(|m| m.month.clone()).unwrap_or_default(),
        monthly_data: buckets,
        total_income: 0.0,
        average_income: 0.0,
        raw_input: raw_input.into(),
    };
    verification.recompute_totals();
    verification
}

impl IncomeVerification {
    /// Re-derives every aggregate from the transaction rows. The stored
    /// totals are never ground truth on their own.
    pub fn recompute_totals(&mut self) {
        for bucket in &mut self.monthly_data {
            bucket.total = bucket.valid_total();
        }
        self.total_income = self.monthly_data.iter().map(|m| m.total).sum();
        self.average_income = if self.monthly_data.is_empty() {
            0.0
        } else {
            self.total_income / self.monthly_data.len() as f64
        };
    }
}
