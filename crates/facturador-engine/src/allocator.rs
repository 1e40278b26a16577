//! # Sequence Allocator
//!
//! Resolves the next document number for a company and document type.
//!
//! ## Allocation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      get_next_number(type, company)                     │
//! │                                                                         │
//! │  company missing/blank? ──yes──► Err(MissingCompany)  (no request)     │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  read local series for type                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SequenceService::next_number(company, remote id, series)              │
//! │       │                                                                 │
//! │       ├── Ok("F001-000042"), well formed ──► return it verbatim        │
//! │       │                                       (local counter untouched) │
//! │       │                                                                 │
//! │       └── Err / malformed ──► WARN                                      │
//! │                │                                                        │
//! │                ▼                                                        │
//! │        ┌─────────────── per-type lock ───────────────┐                 │
//! │        │ read state → format series-NNNNNN → persist │                 │
//! │        │ counter + 1                                  │                 │
//! │        └──────────────────────────────────────────────┘                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock makes concurrent fallback allocations for one type hand out
//! distinct consecutive numbers within this process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use facturador_core::numbering::{format_document_number, is_well_formed};
use facturador_core::validation::{validate_counter, validate_series};
use facturador_core::{CompanyId, CoreError, DocumentType, SequenceState};
use facturador_store::SeriesRepository;

use crate::error::EngineResult;
use crate::remote::{NextNumberRequest, SequenceService};

/// Hands out document numbers, remote first with a local fallback.
pub struct SequenceAllocator {
    remote: Arc<dyn SequenceService>,
    series: SeriesRepository,
    locks: HashMap<DocumentType, Mutex<()>>,
}

impl SequenceAllocator {
    pub fn new(remote: Arc<dyn SequenceService>, series: SeriesRepository) -> Self {
        let locks = DocumentType::ALL
            .into_iter()
            .map(|doc_type| (doc_type, Mutex::new(())))
            .collect();

        SequenceAllocator {
            remote,
            series,
            locks,
        }
    }

    /// Returns the next number for `doc_type`.
    ///
    /// Fails only for a missing company, a local storage error, or an
    /// exhausted local counter. An unreachable remote is never an error.
    pub async fn get_next_number(
        &self,
        doc_type: DocumentType,
        company: Option<&CompanyId>,
    ) -> EngineResult<String> {
        let company = active_company(company).ok_or(CoreError::MissingCompany)?;

        let state = self.series.get(doc_type).await?;
        let request = NextNumberRequest::new(company, doc_type, state.series);

        match self.remote.next_number(&request).await {
            Ok(number) if is_well_formed(&number) => {
                debug!(
                    document_type = %doc_type,
                    company_id = %company,
                    number = %number,
                    "Remote number allocated"
                );
                return Ok(number);
            }
            Ok(number) => {
                warn!(
                    document_type = %doc_type,
                    company_id = %company,
                    number = %number,
                    "Remote returned a malformed number, using local counter"
                );
            }
            Err(e) => {
                warn!(
                    document_type = %doc_type,
                    company_id = %company,
                    error = %e,
                    "Remote numbering failed, using local counter"
                );
            }
        }

        self.allocate_locally(doc_type).await
    }

    /// True iff the remote lists at least one sequence for `company`.
    ///
    /// Any failure answers `false`; a missing company answers `false`
    /// without a request.
    pub async fn check_sequences(&self, company: Option<&CompanyId>) -> bool {
        let Some(company) = active_company(company) else {
            return false;
        };

        match self.remote.list_sequences(company).await {
            Ok(sequences) => !sequences.is_empty(),
            Err(e) => {
                warn!(company_id = %company, error = %e, "Sequence check failed");
                false
            }
        }
    }

    /// Overwrites the local series and counter for `doc_type`.
    ///
    /// Does not talk to the remote.
    pub async fn update_series(
        &self,
        doc_type: DocumentType,
        series: &str,
        counter: u32,
    ) -> EngineResult<SequenceState> {
        validate_series(series)?;
        validate_counter(counter)?;

        let state = SequenceState::new(series, counter);
        let _guard = self.lock(doc_type).lock().await;
        self.series.put(doc_type, &state).await?;

        info!(
            document_type = %doc_type,
            series = %series,
            counter = counter,
            "Local series updated"
        );
        Ok(state)
    }

    /// The local state for `doc_type`.
    pub async fn local_state(&self, doc_type: DocumentType) -> EngineResult<SequenceState> {
        Ok(self.series.get(doc_type).await?)
    }

    /// The local state of every document type.
    pub async fn local_states(&self) -> EngineResult<Vec<(DocumentType, SequenceState)>> {
        Ok(self.series.all().await?)
    }

    async fn allocate_locally(&self, doc_type: DocumentType) -> EngineResult<String> {
        let _guard = self.lock(doc_type).lock().await;

        let state = self.series.get(doc_type).await?;
        let number = format_document_number(&state.series, state.counter)?;

        let next = SequenceState::new(state.series, state.counter + 1);
        self.series.put(doc_type, &next).await?;

        info!(
            document_type = %doc_type,
            number = %number,
            counter = next.counter,
            "Allocated local number"
        );
        Ok(number)
    }

    fn lock(&self, doc_type: DocumentType) -> &Mutex<()> {
        // Every DocumentType is inserted in `new`.
        &self.locks[&doc_type]
    }
}

impl std::fmt::Debug for SequenceAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceAllocator")
            .field("series", &self.series)
            .finish_non_exhaustive()
    }
}

fn active_company(company: Option<&CompanyId>) -> Option<&CompanyId> {
    company.filter(|id| !id.is_blank())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::remote::RemoteSequence;
    use facturador_store::{KeyValueStore, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Scripted sequence service.
    #[derive(Default)]
    struct FakeService {
        number: Option<String>,
        sequences: Option<Vec<RemoteSequence>>,
        calls: AtomicUsize,
        requests: StdMutex<Vec<NextNumberRequest>>,
    }

    impl FakeService {
        fn answering(number: &str) -> Self {
            FakeService {
                number: Some(number.to_string()),
                ..Default::default()
            }
        }

        fn down() -> Self {
            FakeService::default()
        }

        fn listing(sequences: Vec<RemoteSequence>) -> Self {
            FakeService {
                sequences: Some(sequences),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SequenceService for FakeService {
        async fn next_number(&self, request: &NextNumberRequest) -> EngineResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.number
                .clone()
                .ok_or_else(|| EngineError::RemoteUnavailable("connection refused".into()))
        }

        async fn list_sequences(&self, _: &CompanyId) -> EngineResult<Vec<RemoteSequence>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sequences
                .clone()
                .ok_or(EngineError::RemoteStatus { status: 500 })
        }
    }

    fn allocator(service: FakeService) -> (Arc<FakeService>, Arc<MemoryStore>, SequenceAllocator) {
        let service = Arc::new(service);
        let store = Arc::new(MemoryStore::new());
        let allocator =
            SequenceAllocator::new(service.clone(), SeriesRepository::new(store.clone()));
        (service, store, allocator)
    }

    fn company() -> CompanyId {
        CompanyId::from(7_i64)
    }

    #[tokio::test]
    async fn test_remote_number_returned_verbatim() {
        let (service, _, allocator) = allocator(FakeService::answering("F001-000042"));

        let number = allocator
            .get_next_number(DocumentType::Facturas, Some(&company()))
            .await
            .unwrap();

        assert_eq!(number, "F001-000042");
        assert_eq!(
            allocator.local_state(DocumentType::Facturas).await.unwrap(),
            SequenceState::new("F001", 1)
        );

        let requests = service.requests.lock().unwrap();
        assert_eq!(requests[0].document_type, "invoice");
        assert_eq!(requests[0].company_id, "7");
        assert_eq!(requests[0].series, "F001");
    }

    #[tokio::test]
    async fn test_fallback_formats_and_advances_counter() {
        let (_, _, allocator) = allocator(FakeService::down());
        allocator
            .update_series(DocumentType::Facturas, "F001", 5)
            .await
            .unwrap();

        let number = allocator
            .get_next_number(DocumentType::Facturas, Some(&company()))
            .await
            .unwrap();

        assert_eq!(number, "F001-000005");
        assert_eq!(
            allocator.local_state(DocumentType::Facturas).await.unwrap(),
            SequenceState::new("F001", 6)
        );
    }

    #[tokio::test]
    async fn test_fallback_is_monotonic() {
        let (_, _, allocator) = allocator(FakeService::down());

        let mut numbers = Vec::new();
        for _ in 0..3 {
            numbers.push(
                allocator
                    .get_next_number(DocumentType::Boletas, Some(&company()))
                    .await
                    .unwrap(),
            );
        }

        assert_eq!(numbers, vec!["B001-000001", "B001-000002", "B001-000003"]);
    }

    #[tokio::test]
    async fn test_malformed_remote_number_falls_back() {
        let (_, _, allocator) = allocator(FakeService::answering("F001-42"));

        let number = allocator
            .get_next_number(DocumentType::Facturas, Some(&company()))
            .await
            .unwrap();

        assert_eq!(number, "F001-000001");
    }

    #[tokio::test]
    async fn test_missing_company_makes_no_request() {
        let (service, _, allocator) = allocator(FakeService::answering("F001-000042"));

        let err = allocator
            .get_next_number(DocumentType::Facturas, None)
            .await
            .unwrap_err();
        assert!(err.is_missing_company());
        assert_eq!(err.to_string(), "No hay empresa activa");

        let blank = CompanyId::new("  ");
        assert!(allocator
            .get_next_number(DocumentType::Facturas, Some(&blank))
            .await
            .unwrap_err()
            .is_missing_company());

        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_fallbacks_never_repeat() {
        let (_, _, allocator) = allocator(FakeService::down());
        let allocator = Arc::new(allocator);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(async move {
                allocator
                    .get_next_number(DocumentType::NotasCredito, Some(&company()))
                    .await
                    .unwrap()
            }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort();
        numbers.dedup();

        assert_eq!(numbers.len(), 20);
        assert_eq!(numbers.first().map(String::as_str), Some("FC01-000001"));
        assert_eq!(numbers.last().map(String::as_str), Some("FC01-000020"));
    }

    #[tokio::test]
    async fn test_exhausted_counter_is_an_error() {
        let (_, _, allocator) = allocator(FakeService::down());
        allocator
            .update_series(DocumentType::Facturas, "F001", 999_999)
            .await
            .unwrap();

        let last = allocator
            .get_next_number(DocumentType::Facturas, Some(&company()))
            .await
            .unwrap();
        assert_eq!(last, "F001-999999");

        let err = allocator
            .get_next_number(DocumentType::Facturas, Some(&company()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::NumberOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_series_validates() {
        let (_, store, allocator) = allocator(FakeService::down());

        assert!(allocator
            .update_series(DocumentType::Boletas, "", 1)
            .await
            .is_err());
        assert!(allocator
            .update_series(DocumentType::Boletas, "B001", 0)
            .await
            .is_err());
        assert!(store.is_empty().await);

        let state = allocator
            .update_series(DocumentType::Boletas, "B002", 100)
            .await
            .unwrap();
        assert_eq!(state, SequenceState::new("B002", 100));
        assert!(store
            .get("document_series:boletas")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_check_sequences() {
        let (_, _, empty) = allocator(FakeService::listing(vec![]));
        assert!(!empty.check_sequences(Some(&company())).await);

        let (_, _, some) = allocator(FakeService::listing(vec![RemoteSequence::default()]));
        assert!(some.check_sequences(Some(&company())).await);

        let (_, _, down) = allocator(FakeService::down());
        assert!(!down.check_sequences(Some(&company())).await);

        let (service, _, no_company) = allocator(FakeService::listing(vec![]));
        assert!(!no_company.check_sequences(None).await);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_local_states_lists_every_type() {
        let (_, _, allocator) = allocator(FakeService::down());
        let states = allocator.local_states().await.unwrap();
        assert_eq!(states.len(), DocumentType::ALL.len());
        assert_eq!(states[4].1, SequenceState::new("T001", 1));
    }
}
