//! Post-hoc manual corrections over an existing verification.
//!
//! `set_validity` and `set_amount` are the only sanctioned mutation paths
//! after creation; both re-derive the month total and the verification
//! aggregates on success, and both are idempotent.

use crate::error::{Result, VerificationError};
use crate::schema::{IncomeVerification, Transaction};
use uuid::Uuid;

impl IncomeVerification {
    /// Flips a transaction's validity flag. The automatic exclusion
    /// reason is kept as evidence; the flag alone decides what counts.
    pub fn set_validity(
        &mut self,
        month_index: usize,
        transaction_id: Uuid,
        is_valid: bool,
    ) -> Result<()> {
        let transaction = self.find_transaction_mut(month_index, transaction_id)?;
        transaction.is_valid = is_valid;
        self.recompute_totals();
        Ok(())
    }

    /// Overwrites a transaction's amount (manual correction of an
    /// extraction error). Rejects negative or non-finite values.
    pub fn set_amount(
        &mut self,
        month_index: usize,
        transaction_id: Uuid,
        new_amount: f64,
    ) -> Result<()> {
        if !new_amount.is_finite() || new_amount < 0.0 {
            return Err(VerificationError::InvalidAmount(new_amount));
        }

        let transaction = self.find_transaction_mut(month_index, transaction_id)?;
        transaction.amount = new_amount;
        self.recompute_totals();
        Ok(())
    }

    fn find_transaction_mut(
        &mut self,
        month_index: usize,
        transaction_id: Uuid,
    ) -> Result<&mut Transaction> {
        self.monthly_data
            .get_mut(month_index)
            .and_then(|bucket| {
                bucket
                    .transactions
                    .iter_mut()
                    .find(|t| t.id == transaction_id)
            })
            .ok_or(VerificationError::NotFound {
                month_index,
                transaction_id,
            })
    }
}
