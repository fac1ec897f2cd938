use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::covenant::{ComplianceResult, CovenantRatios};
use crate::types::{FinancialMetric, ReportingPeriod};
use crate::CovenantResult;

// ---------------------------------------------------------------------------
// Extraction payload
// ---------------------------------------------------------------------------

/// The structured payload the extraction collaborator returns for one
/// document: company identity, reporting window, named metrics, derived
/// covenant ratios and the upstream compliance verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdmData {
    pub company_name: String,
    pub reporting_period: ReportingPeriod,
    pub financial_metrics: BTreeMap<String, FinancialMetric>,
    pub covenant_ratios: CovenantRatios,
    pub covenant_compliance: ComplianceResult,
    pub extracted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

/// One stored analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub company_name: String,
    pub cdm_data: CdmData,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// Turns raw document bytes into a structured payload. Implementations wrap
/// a hosted model; failures surface as `Collaborator` errors, unretried.
pub trait DocumentExtractor {
    fn extract(&self, document: &[u8], mime_type: &str) -> CovenantResult<CdmData>;
}

/// Persistence seam for analysis runs. The evaluator and forecaster never
/// call this directly; the orchestration layer stores their output.
pub trait AnalysisStore {
    /// Persist a record, returning its id. Records with an empty id are
    /// assigned one by the store.
    fn save(&mut self, record: AnalysisRecord) -> CovenantResult<String>;

    /// All records in insertion order.
    fn list(&self) -> CovenantResult<Vec<AnalysisRecord>>;

    fn get(&self, id: &str) -> CovenantResult<Option<AnalysisRecord>>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Vec-backed store standing in for the managed backend. Insertion order is
/// preserved on `list()`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Vec<AnalysisRecord>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisStore for InMemoryStore {
    fn save(&mut self, mut record: AnalysisRecord) -> CovenantResult<String> {
        if record.id.is_empty() {
            self.next_id += 1;
            record.id = format!("analysis-{:03}", self.next_id);
        }
        let id = record.id.clone();
        self.records.push(record);
        Ok(id)
    }

    fn list(&self) -> CovenantResult<Vec<AnalysisRecord>> {
        Ok(self.records.clone())
    }

    fn get(&self, id: &str) -> CovenantResult<Option<AnalysisRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }
}
