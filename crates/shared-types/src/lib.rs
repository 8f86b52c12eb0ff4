pub mod audit;
pub mod types;

pub use audit::{hash_document, AuditAction, AuditChain, AuditError, AuditEvent};
pub use types::{
    render_unified, AnalysisReport, Clause, ClauseDetail, Comparison, DiffLine, Document,
    RiskFinding, Summary, TextPosition, MIN_CLAUSE_CHARS,
};
