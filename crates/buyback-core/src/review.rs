//! # Review Module
//!
//! In-memory ledger of trade-in requests and their review lifecycle.
//!
//! | action          | allowed from                | moves to           |
//! |-----------------|-----------------------------|--------------------|
//! | `approve`       | Pending, AwaitingCustomer   | Approved           |
//! | `reject`        | Pending, AwaitingCustomer   | Rejected           |
//! | `adjust_price`  | Pending, AwaitingCustomer   | AwaitingCustomer   |
//! | `accept_offer`  | AwaitingCustomer            | Approved           |
//! | `decline_offer` | AwaitingCustomer            | Rejected           |
//! | `mark_sold`     | Approved                    | Sold               |
//!
//! Requests are kept in a `BTreeMap` keyed by id, so iteration order is
//! submission order. Nothing here is persisted.

use crate::form::ValidatedSellForm;
use crate::money::Price;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// TYPES
// =============================================================================

/// Identifier of a trade-in request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who is selling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// The device as shown to reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub brand: String,
    pub model: String,
    pub storage: String,
}

/// Where a request is in review.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    /// The price was adjusted; waiting for the customer to answer.
    AwaitingCustomer,
    Approved,
    Rejected,
    Sold,
}

impl RequestStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::AwaitingCustomer,
        Self::Approved,
        Self::Rejected,
        Self::Sold,
    ];

    /// Check if a reviewer can still approve, reject or adjust.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::AwaitingCustomer)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "Pending",
            Self::AwaitingCustomer => "Pending Approval from User",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Sold => "Sold",
        })
    }
}

/// A request to trade in one device.
///
/// Field names on the wire are camelCase, like the sell form. The offer is
/// carried in cents under `estimatedPriceCents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInRequest {
    pub id: RequestId,
    pub customer: Customer,
    pub device: DeviceSummary,
    pub condition: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub defects: Vec<String>,
    /// Current offer: the estimate, or the adjusted price.
    #[serde(rename = "estimatedPriceCents")]
    pub estimated_price: Price,
    #[serde(default)]
    pub status: RequestStatus,
}

/// Something a reviewer or customer does to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    AdjustPrice,
    AcceptOffer,
    DeclineOffer,
    MarkSold,
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::AdjustPrice => "adjust price",
            Self::AcceptOffer => "accept offer",
            Self::DeclineOffer => "decline offer",
            Self::MarkSold => "mark sold",
        })
    }
}

/// Ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("no request {0}")]
    UnknownRequest(RequestId),

    #[error("cannot {action} a request that is {from}")]
    InvalidTransition {
        from: RequestStatus,
        action: ReviewAction,
    },

    #[error("request {0} appears more than once")]
    DuplicateRequest(RequestId),

    #[error("no request ids left to assign")]
    IdsExhausted,
}

/// Counts per status and the value of committed offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total: usize,
    pub by_status: BTreeMap<RequestStatus, usize>,
    /// Sum of offers that are approved or sold.
    #[serde(rename = "committedValueCents")]
    pub committed_value: Price,
}

// =============================================================================
// LEDGER
// =============================================================================

/// All trade-in requests, keyed by id.
#[derive(Debug, Clone)]
pub struct RequestLedger {
    requests: BTreeMap<RequestId, TradeInRequest>,
    /// `None` once `u64::MAX` has been used.
    next_id: Option<u64>,
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: BTreeMap::new(),
            next_id: Some(1),
        }
    }

    /// Rebuild a ledger from existing requests, keeping their ids.
    pub fn from_requests(
        requests: impl IntoIterator<Item = TradeInRequest>,
    ) -> Result<Self, ReviewError> {
        let mut ledger = Self::new();
        for request in requests {
            let id = request.id;
            if ledger.requests.insert(id, request).is_some() {
                return Err(ReviewError::DuplicateRequest(id));
            }
            ledger.next_id = match (ledger.next_id, id.0.checked_add(1)) {
                (Some(next), Some(after)) => Some(next.max(after)),
                _ => None,
            };
        }
        Ok(ledger)
    }

    /// Record a validated sell form with its estimate. Starts `Pending`.
    ///
    /// Fails with [`ReviewError::IdsExhausted`] once the id space is used
    /// up; an existing request is never replaced.
    pub fn submit(
        &mut self,
        customer: Customer,
        form: &ValidatedSellForm,
        estimate: Price,
    ) -> Result<RequestId, ReviewError> {
        let id = RequestId(self.next_id.ok_or(ReviewError::IdsExhausted)?);
        self.next_id = id.0.checked_add(1);

        let request = TradeInRequest {
            id,
            customer,
            device: DeviceSummary {
                brand: form.device.brand.clone(),
                model: form.model.clone(),
                storage: form.device.storage_capacity.clone(),
            },
            condition: form.device.condition.to_string(),
            serial_number: form.serial_number.clone(),
            defects: form.device.defects.clone(),
            estimated_price: estimate,
            status: RequestStatus::Pending,
        };
        self.requests.insert(id, request);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: RequestId) -> Option<&TradeInRequest> {
        self.requests.get(&id)
    }

    /// All requests in id order.
    pub fn requests(&self) -> impl Iterator<Item = &TradeInRequest> {
        self.requests.values()
    }

    /// Requests currently in `status`, in id order.
    pub fn by_status(&self, status: RequestStatus) -> impl Iterator<Item = &TradeInRequest> {
        self.requests.values().filter(move |r| r.status == status)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Reviewer accepts the current offer.
    pub fn approve(&mut self, id: RequestId) -> Result<&TradeInRequest, ReviewError> {
        self.transition(id, ReviewAction::Approve, |r| {
            r.status.is_open().then_some(RequestStatus::Approved)
        })
    }

    /// Reviewer turns the request down.
    pub fn reject(&mut self, id: RequestId) -> Result<&TradeInRequest, ReviewError> {
        self.transition(id, ReviewAction::Reject, |r| {
            r.status.is_open().then_some(RequestStatus::Rejected)
        })
    }

    /// Reviewer replaces the offer; the customer must answer it.
    pub fn adjust_price(
        &mut self,
        id: RequestId,
        price: Price,
    ) -> Result<&TradeInRequest, ReviewError> {
        self.transition(id, ReviewAction::AdjustPrice, |r| {
            if !r.status.is_open() {
                return None;
            }
            r.estimated_price = price;
            Some(RequestStatus::AwaitingCustomer)
        })
    }

    /// Customer takes the adjusted offer.
    pub fn accept_offer(&mut self, id: RequestId) -> Result<&TradeInRequest, ReviewError> {
        self.transition(id, ReviewAction::AcceptOffer, |r| {
            (r.status == RequestStatus::AwaitingCustomer).then_some(RequestStatus::Approved)
        })
    }

    /// Customer refuses the adjusted offer.
    pub fn decline_offer(&mut self, id: RequestId) -> Result<&TradeInRequest, ReviewError> {
        self.transition(id, ReviewAction::DeclineOffer, |r| {
            (r.status == RequestStatus::AwaitingCustomer).then_some(RequestStatus::Rejected)
        })
    }

    /// An approved device has been paid out.
    pub fn mark_sold(&mut self, id: RequestId) -> Result<&TradeInRequest, ReviewError> {
        self.transition(id, ReviewAction::MarkSold, |r| {
            (r.status == RequestStatus::Approved).then_some(RequestStatus::Sold)
        })
    }

    /// Counts per status and committed value.
    #[must_use]
    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary {
            total: self.requests.len(),
            by_status: RequestStatus::ALL.iter().map(|s| (*s, 0)).collect(),
            committed_value: Price::ZERO,
        };
        for request in self.requests.values() {
            *summary.by_status.entry(request.status).or_insert(0) += 1;
            if matches!(request.status, RequestStatus::Approved | RequestStatus::Sold) {
                summary.committed_value =
                    summary.committed_value.saturating_add(request.estimated_price);
            }
        }
        summary
    }

    /// Apply `step` to a request. `step` returns the next status, or `None`
    /// if the action is not allowed from the current one; in that case the
    /// request is left untouched.
    fn transition(
        &mut self,
        id: RequestId,
        action: ReviewAction,
        step: impl FnOnce(&mut TradeInRequest) -> Option<RequestStatus>,
    ) -> Result<&TradeInRequest, ReviewError> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(ReviewError::UnknownRequest(id))?;

        let from = request.status;
        let mut draft = request.clone();
        let next = step(&mut draft).ok_or(ReviewError::InvalidTransition { from, action })?;
        draft.status = next;
        *request = draft;
        Ok(&*request)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SellForm;

    fn customer(name: &str) -> Customer {
        Customer {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: String::new(),
        }
    }

    fn validated() -> ValidatedSellForm {
        SellForm {
            device_type: "smartphone".to_string(),
            brand: "apple".to_string(),
            model: "iPhone 12".to_string(),
            year_of_purchase: "2021".to_string(),
            condition: "used".to_string(),
            storage_capacity: "128GB".to_string(),
            defects: vec![],
            serial_number: Some("IMEI123456789".to_string()),
            delivery_method: "pickup".to_string(),
        }
        .validate()
        .unwrap()
    }

    fn ledger_with_one() -> (RequestLedger, RequestId) {
        let mut ledger = RequestLedger::new();
        let id = ledger.submit(customer("John"), &validated(), Price::from_units(480)).unwrap();
        (ledger, id)
    }

    #[test]
    fn submit_assigns_sequential_ids() {
        let mut ledger = RequestLedger::new();
        let a = ledger.submit(customer("A"), &validated(), Price::from_units(1)).unwrap();
        let b = ledger.submit(customer("B"), &validated(), Price::from_units(2)).unwrap();
        assert_eq!(a, RequestId(1));
        assert_eq!(b, RequestId(2));

        let request = ledger.get(a).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.device.model, "iPhone 12");
        assert_eq!(request.device.storage, "128GB");
        assert_eq!(request.condition, "used");
    }

    #[test]
    fn approve_pending() {
        let (mut ledger, id) = ledger_with_one();
        let request = ledger.approve(id).unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
    }

    #[test]
    fn adjust_then_accept() {
        let (mut ledger, id) = ledger_with_one();
        let request = ledger.adjust_price(id, Price::from_units(430)).unwrap();
        assert_eq!(request.status, RequestStatus::AwaitingCustomer);
        assert_eq!(request.estimated_price, Price::from_units(430));

        let request = ledger.accept_offer(id).unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.estimated_price, Price::from_units(430));
    }

    #[test]
    fn adjust_then_decline() {
        let (mut ledger, id) = ledger_with_one();
        ledger.adjust_price(id, Price::from_units(300)).unwrap();
        let request = ledger.decline_offer(id).unwrap();
        assert_eq!(request.status, RequestStatus::Rejected);
    }

    #[test]
    fn closed_requests_reject_changes() {
        let (mut ledger, id) = ledger_with_one();
        ledger.reject(id).unwrap();

        let err = ledger.adjust_price(id, Price::from_units(1)).unwrap_err();
        assert_eq!(
            err,
            ReviewError::InvalidTransition {
                from: RequestStatus::Rejected,
                action: ReviewAction::AdjustPrice
            }
        );
        // Failed transition leaves the request as it was
        assert_eq!(ledger.get(id).unwrap().estimated_price, Price::from_units(480));
        assert!(ledger.approve(id).is_err());
    }

    #[test]
    fn offer_answers_need_an_adjustment() {
        let (mut ledger, id) = ledger_with_one();
        assert!(matches!(
            ledger.accept_offer(id),
            Err(ReviewError::InvalidTransition { .. })
        ));
        assert!(ledger.decline_offer(id).is_err());
    }

    #[test]
    fn only_approved_can_be_sold() {
        let (mut ledger, id) = ledger_with_one();
        assert!(ledger.mark_sold(id).is_err());
        ledger.approve(id).unwrap();
        assert_eq!(ledger.mark_sold(id).unwrap().status, RequestStatus::Sold);
    }

    #[test]
    fn unknown_request() {
        let mut ledger = RequestLedger::new();
        assert_eq!(
            ledger.approve(RequestId(9)).unwrap_err(),
            ReviewError::UnknownRequest(RequestId(9))
        );
    }

    #[test]
    fn from_requests_continues_ids() {
        let (ledger, _) = ledger_with_one();
        let mut existing: Vec<_> = ledger.requests().cloned().collect();
        existing[0].id = RequestId(7);

        let mut rebuilt = RequestLedger::from_requests(existing.clone()).unwrap();
        let next = rebuilt.submit(customer("Z"), &validated(), Price::ZERO).unwrap();
        assert_eq!(next, RequestId(8));

        existing.push(existing[0].clone());
        assert_eq!(
            RequestLedger::from_requests(existing).unwrap_err(),
            ReviewError::DuplicateRequest(RequestId(7))
        );
    }

    #[test]
    fn exhausted_ids_never_overwrite() {
        let (ledger, _) = ledger_with_one();
        let mut existing: Vec<_> = ledger.requests().cloned().collect();
        existing[0].id = RequestId(u64::MAX);
        existing[0].status = RequestStatus::Approved;

        let mut rebuilt = RequestLedger::from_requests(existing).unwrap();
        assert_eq!(
            rebuilt.submit(customer("B"), &validated(), Price::ZERO),
            Err(ReviewError::IdsExhausted)
        );
        assert_eq!(rebuilt.len(), 1);
        let kept = rebuilt.get(RequestId(u64::MAX)).unwrap();
        assert_eq!(kept.customer.name, "John");
        assert_eq!(kept.status, RequestStatus::Approved);
    }

    #[test]
    fn request_wire_format_is_camel_case() {
        let (ledger, id) = ledger_with_one();
        let value = serde_json::to_value(ledger.get(id).unwrap()).unwrap();
        assert_eq!(value["estimatedPriceCents"], 48000);
        assert_eq!(value["serialNumber"], "IMEI123456789");
        assert!(value.get("estimated_price").is_none());

        // The storefront's whole-unit field is not silently read as cents
        let storefront = r#"{"id": 1,
            "customer": {"name": "John Doe", "email": "john@example.com"},
            "device": {"brand": "Apple", "model": "iPhone 12", "storage": "128GB"},
            "condition": "used", "estimatedPrice": 480}"#;
        assert!(serde_json::from_str::<TradeInRequest>(storefront).is_err());
    }

    #[test]
    fn summary_counts_and_commits() {
        let mut ledger = RequestLedger::new();
        let a = ledger.submit(customer("A"), &validated(), Price::from_units(480)).unwrap();
        let b = ledger.submit(customer("B"), &validated(), Price::from_units(590)).unwrap();
        let c = ledger.submit(customer("C"), &validated(), Price::from_units(350)).unwrap();
        ledger.approve(a).unwrap();
        ledger.approve(b).unwrap();
        ledger.mark_sold(b).unwrap();
        ledger.reject(c).unwrap();

        let summary = ledger.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_status[&RequestStatus::Approved], 1);
        assert_eq!(summary.by_status[&RequestStatus::Sold], 1);
        assert_eq!(summary.by_status[&RequestStatus::Rejected], 1);
        assert_eq!(summary.by_status[&RequestStatus::Pending], 0);
        assert_eq!(summary.committed_value, Price::from_units(1070));
        assert_eq!(ledger.by_status(RequestStatus::Rejected).count(), 1);
    }

    #[test]
    fn status_labels() {
        assert_eq!(
            RequestStatus::AwaitingCustomer.to_string(),
            "Pending Approval from User"
        );
        assert_eq!(
            ReviewError::InvalidTransition {
                from: RequestStatus::Sold,
                action: ReviewAction::Reject
            }
            .to_string(),
            "cannot reject a request that is Sold"
        );
    }
}
