use std::sync::Arc;

use tracing::{info, warn};

use crate::store::{RecordStore, StoreError};
use crate::{ChargeRequest, PaymentRecord};

/// What [`RetryRecordStore::record_if_degraded`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The charge was not degraded; nothing touched the store.
    Skipped,
    /// A record was appended. `duplicates` counts existing records that
    /// already looked like this charge.
    Recorded { duplicates: usize },
}

/// Persists degraded charges so they can be reconciled later.
pub struct RetryRecordStore {
    store: Arc<dyn RecordStore>,
}

impl RetryRecordStore {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Append a retry record when `degraded`; otherwise a no-op.
    ///
    /// Existing records matching the request are only logged: the new record
    /// is appended regardless. No lock is held between the scan and the
    /// append, so concurrent charges may both miss each other.
    pub async fn record_if_degraded(
        &self,
        req: &ChargeRequest,
        degraded: bool,
    ) -> Result<RetryOutcome, StoreError> {
        if !degraded {
            return Ok(RetryOutcome::Skipped);
        }

        let duplicates = self
            .store
            .find_all()
            .await?
            .iter()
            .filter(|record| record.matches(req))
            .count();
        if duplicates > 0 {
            info!(
                duplicates,
                ending = crate::card::masked_suffix(&req.card.number),
                "payment already on record"
            );
        }

        let amount = req.amount.legacy_decimal().unwrap_or_else(|| {
            warn!(amount = %req.amount, "amount does not compose, storing whole units");
            req.amount.units_as_f64()
        });
        self.store
            .save(PaymentRecord::rate_limited(req, amount))
            .await?;
        info!(amount, "retry record appended");

        Ok(RetryOutcome::Recorded { duplicates })
    }
}

impl std::fmt::Debug for RetryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryRecordStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RATE_LIMITED_STATUS;
    use crate::store::InMemoryRecordStore;
    use crate::{CreditCard, Money};
    use async_trait::async_trait;

    fn request(units: i64, nanos: i32) -> ChargeRequest {
        ChargeRequest::new(
            Money::new("USD", units, nanos),
            CreditCard {
                number: "5500000000000004".to_string(),
                cvv: 321,
                expiration_month: 12,
                expiration_year: 2029,
            },
        )
    }

    fn retry() -> (RetryRecordStore, Arc<InMemoryRecordStore>) {
        let store = Arc::new(InMemoryRecordStore::new());
        (RetryRecordStore::new(store.clone()), store)
    }

    #[tokio::test]
    async fn not_degraded_is_noop() {
        let (retry, store) = retry();
        let outcome = retry.record_if_degraded(&request(10, 0), false).await.unwrap();
        assert_eq!(outcome, RetryOutcome::Skipped);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn degraded_appends_rate_limited_record() {
        let (retry, store) = retry();
        let outcome = retry.record_if_degraded(&request(10, 25), true).await.unwrap();
        assert_eq!(outcome, RetryOutcome::Recorded { duplicates: 0 });

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, 10.25);
        assert_eq!(all[0].card_number, "5500000000000004");
        assert_eq!(all[0].cvv, "321");
        assert_eq!(all[0].status, RATE_LIMITED_STATUS);
    }

    #[tokio::test]
    async fn duplicate_is_reported_but_still_appended() {
        let (retry, store) = retry();
        retry.record_if_degraded(&request(10, 0), true).await.unwrap();
        let outcome = retry.record_if_degraded(&request(10, 0), true).await.unwrap();

        assert_eq!(outcome, RetryOutcome::Recorded { duplicates: 1 });
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn negative_nanos_fall_back_to_units() {
        let (retry, store) = retry();
        retry.record_if_degraded(&request(-3, -5), true).await.unwrap();
        assert_eq!(store.find_all().await.unwrap()[0].amount, -3.0);
    }

    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn find_all(&self) -> Result<Vec<PaymentRecord>, StoreError> {
            Ok(Vec::new())
        }

        async fn save(&self, _record: PaymentRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let retry = RetryRecordStore::new(Arc::new(BrokenStore));
        let result = retry.record_if_degraded(&request(1, 0), true).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
