//! In-process backend used for demos and tests when no payment API is
//! reachable. Applies the same transition rules the real backend enforces.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::payment_api::{ApiError, PaymentApi, QueueKind, QueueStage};
use crate::models::{
    Decision, NewPayment, PaymentRecord, PaymentStatus, PaymentType, RecordId,
};
use crate::workflow::Transition;

#[derive(Default)]
struct Store {
    records: Vec<PaymentRecord>,
    resubmitted: HashSet<RecordId>,
}

#[derive(Default)]
pub struct InMemoryPaymentApi {
    store: RwLock<Store>,
}

impl InMemoryPaymentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<PaymentRecord>) -> Self {
        Self {
            store: RwLock::new(Store {
                records,
                resubmitted: HashSet::new(),
            }),
        }
    }

    /// A handful of records spread over every stage.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let sample = |n: u32, fms: &str, pay_to: &str, amount: f64, status: PaymentStatus| {
            PaymentRecord {
                id: RecordId::new(format!("seed-{n}")),
                unique_no: format!("PAY-{:03}", n),
                fms_name: fms.to_string(),
                pay_to: pay_to.to_string(),
                amount,
                remarks: None,
                stage_remarks: None,
                attachment: None,
                payment_type: matches!(status, PaymentStatus::Paid | PaymentStatus::Processed)
                    .then_some(PaymentType::BankTransfer),
                status,
                created_at: now - Duration::days(i64::from(n)),
            }
        };

        Self::with_records(vec![
            sample(1, "Store", "Shree Traders", 12_500.0, PaymentStatus::Pending),
            sample(2, "Repair", "City Motors", 4_200.0, PaymentStatus::Pending),
            sample(3, "Freight", "Blue Dart", 1_850.0, PaymentStatus::Approved),
            sample(4, "Subscription", "Zoho", 999.0, PaymentStatus::Paid),
            sample(5, "Sales", "Metro Retail", 23_000.0, PaymentStatus::Processed),
            sample(6, "Production", "Tata Steel", 61_000.0, PaymentStatus::Rejected),
        ])
    }

    pub async fn snapshot(&self) -> Vec<PaymentRecord> {
        self.store.read().await.records.clone()
    }

    async fn transition(
        &self,
        id: &RecordId,
        transition: Transition,
        update: impl FnOnce(&mut PaymentRecord),
    ) -> Result<(), ApiError> {
        let mut store = self.store.write().await;
        let record = store
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ApiError::NotFound(id.clone()))?;

        record.status = record
            .status
            .apply(transition)
            .map_err(|e| ApiError::Rejected(e.to_string()))?;
        update(record);
        Ok(())
    }
}

#[async_trait]
impl PaymentApi for InMemoryPaymentApi {
    async fn list_requests(&self) -> Result<Vec<PaymentRecord>, ApiError> {
        let mut records = self.snapshot().await;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn fetch_queue(
        &self,
        stage: QueueStage,
        kind: QueueKind,
    ) -> Result<Vec<PaymentRecord>, ApiError> {
        let store = self.store.read().await;
        let mut records: Vec<PaymentRecord> = store
            .records
            .iter()
            .filter(|r| stage.admits(kind, r.status))
            .filter(|r| {
                stage != QueueStage::Rectify
                    || kind != QueueKind::History
                    || store.resubmitted.contains(&r.id)
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn create(&self, payment: &NewPayment) -> Result<PaymentRecord, ApiError> {
        let record = PaymentRecord {
            id: RecordId::new(Uuid::new_v4().to_string()),
            unique_no: payment.unique_no.clone(),
            fms_name: payment.fms_name.clone(),
            pay_to: payment.pay_to.clone(),
            amount: payment.amount,
            remarks: payment.remarks.clone(),
            stage_remarks: None,
            attachment: payment.attachment.clone(),
            payment_type: None,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        };

        self.store.write().await.records.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        let mut store = self.store.write().await;
        let position = store
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| ApiError::NotFound(id.clone()))?;

        if !store.records[position].status.is_deletable() {
            return Err(ApiError::Rejected(format!(
                "record {} is {}",
                id, store.records[position].status
            )));
        }

        store.records.remove(position);
        Ok(())
    }

    async fn decide(
        &self,
        id: &RecordId,
        decision: Decision,
        remarks: &str,
    ) -> Result<(), ApiError> {
        let remarks = remarks.to_string();
        self.transition(id, decision.into(), move |record| {
            record.stage_remarks = Some(remarks).filter(|r| !r.trim().is_empty());
        })
        .await
    }

    async fn pay(&self, id: &RecordId, payment_type: PaymentType) -> Result<(), ApiError> {
        self.transition(id, Transition::Pay, move |record| {
            record.payment_type = Some(payment_type);
        })
        .await
    }

    async fn tally(&self, ids: &[RecordId]) -> Result<(), ApiError> {
        let mut store = self.store.write().await;

        // Validate the whole batch before touching anything.
        for id in ids {
            let record = store
                .records
                .iter()
                .find(|r| &r.id == id)
                .ok_or_else(|| ApiError::NotFound(id.clone()))?;
            record
                .status
                .apply(Transition::Tally)
                .map_err(|e| ApiError::Rejected(e.to_string()))?;
        }

        for record in store.records.iter_mut().filter(|r| ids.contains(&r.id)) {
            record.status = PaymentStatus::Processed;
        }
        Ok(())
    }

    async fn resubmit(&self, id: &RecordId, remarks: &str) -> Result<(), ApiError> {
        let remarks = remarks.to_string();
        self.transition(id, Transition::Resubmit, move |record| {
            record.stage_remarks = Some(remarks).filter(|r| !r.trim().is_empty());
        })
        .await?;

        self.store.write().await.resubmitted.insert(id.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_payment(unique_no: &str) -> NewPayment {
        NewPayment {
            unique_no: unique_no.to_string(),
            fms_name: "Store".to_string(),
            pay_to: "Acme".to_string(),
            amount: 500.0,
            remarks: None,
            attachment: None,
        }
    }

    #[tokio::test]
    async fn created_records_start_pending() {
        let api = InMemoryPaymentApi::new();
        let record = api.create(&new_payment("PAY-1")).await.unwrap();

        assert_eq!(record.status, PaymentStatus::Pending);
        let pending = api
            .fetch_queue(QueueStage::Approval, QueueKind::Pending)
            .await
            .unwrap();
        assert_eq!(pending, vec![record]);
    }

    #[tokio::test]
    async fn rejects_out_of_order_transitions() {
        let api = InMemoryPaymentApi::new();
        let record = api.create(&new_payment("PAY-1")).await.unwrap();

        let err = api.pay(&record.id, PaymentType::Cash).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
    }

    #[tokio::test]
    async fn tally_batch_is_all_or_nothing() {
        let api = InMemoryPaymentApi::seeded();
        let paid = RecordId::from("seed-4");
        let pending = RecordId::from("seed-1");

        assert!(api.tally(&[paid.clone(), pending]).await.is_err());

        let snapshot = api.snapshot().await;
        let record = snapshot.iter().find(|r| r.id == paid).unwrap();
        assert_eq!(record.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn only_pending_records_can_be_deleted() {
        let api = InMemoryPaymentApi::seeded();

        assert!(api.delete(&RecordId::from("seed-3")).await.is_err());
        api.delete(&RecordId::from("seed-1")).await.unwrap();
        assert!(matches!(
            api.delete(&RecordId::from("seed-1")).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn resubmitted_records_show_in_rectify_history() {
        let api = InMemoryPaymentApi::seeded();
        let rejected = RecordId::from("seed-6");

        api.resubmit(&rejected, "fixed vendor name").await.unwrap();

        let history = api
            .fetch_queue(QueueStage::Rectify, QueueKind::History)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, PaymentStatus::Pending);
        assert_eq!(history[0].stage_remarks.as_deref(), Some("fixed vendor name"));
    }
}
