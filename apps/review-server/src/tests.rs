//! Tests for the review server API
//!
//! Property tests fuzz request shapes the handlers parse; the endpoint
//! tests drive the full router through axum-test with a temporary audit log.

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use crate::api::{AnalyzeRequest, PrecedentSearchRequest};

    proptest! {
        #[test]
        fn analyze_request_defaults_user(filename in "[a-z]{1,12}\\.txt", text in "[ -~]{0,80}") {
            let body = serde_json::json!({ "filename": filename, "text": text });
            let req: AnalyzeRequest = serde_json::from_value(body).unwrap();

            prop_assert_eq!(req.user, "anonymous");
            prop_assert_eq!(req.document.filename, filename);
            prop_assert_eq!(req.document.text, Some(text));
            prop_assert!(req.document.content_base64.is_none());
        }

        #[test]
        fn precedent_request_keeps_explicit_k(query in "[a-z ]{1,30}", k in 1usize..20) {
            let body = serde_json::json!({ "query": query, "k": k });
            let req: PrecedentSearchRequest = serde_json::from_value(body).unwrap();
            prop_assert_eq!(req.k, k);
        }
    }
}

#[cfg(test)]
mod http_endpoint_tests {
    //! HTTP endpoint integration tests using axum-test

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared_types::AuditAction;
    use tempfile::TempDir;

    use crate::audit_log::{read_chain, AuditLog};
    use crate::{build_router, AppState};

    const TWO_CLAUSES: &str =
        "Clause 1: Termination.\nThis may be ended.\n\nClause 2: Liability.\nParty liable for damages.";

    /// Create a test server with the full router and a fresh audit log
    async fn create_test_server() -> (TestServer, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::open(dir.path().join("audit_log.txt"))
            .await
            .unwrap();
        let app = build_router(AppState::new(audit), 1024 * 1024);

        (TestServer::new(app).unwrap(), dir)
    }

    async fn audit_actions(dir: &TempDir) -> Vec<AuditAction> {
        read_chain(&dir.path().join("audit_log.txt"))
            .await
            .unwrap()
            .events
            .into_iter()
            .map(|e| e.action)
            .collect()
    }

    #[tokio::test]
    async fn test_health_returns_200() {
        let (server, _dir) = create_test_server().await;
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "review-server");
    }

    #[tokio::test]
    async fn test_analyze_text_reports_findings_and_audits() {
        let (server, dir) = create_test_server().await;

        let response = server
            .post("/api/analyze")
            .json(&json!({
                "filename": "contract.txt",
                "text": TWO_CLAUSES,
                "user": "alice"
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert!(json["success"].as_bool().unwrap());
        assert_eq!(json["filename"], "contract.txt");
        assert_eq!(json["clause_count"], 2);
        assert_eq!(json["findings"][1]["confidence"], 28.57);
        assert_eq!(
            json["triggered_terms"],
            json!(["termination", "liable", "damages"])
        );

        let actions = audit_actions(&dir).await;
        assert_eq!(
            actions,
            vec![
                AuditAction::Upload {
                    filename: "contract.txt".to_string()
                },
                AuditAction::RiskScan {
                    terms: vec![
                        "termination".to_string(),
                        "liable".to_string(),
                        "damages".to_string()
                    ]
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_analyze_base64_text_upload_without_risks() {
        let (server, dir) = create_test_server().await;
        let encoded = STANDARD.encode(
            "Clause 3: Notices. All notices must be sent by mail within 10 days of signing this agreement.",
        );

        let response = server
            .post("/api/analyze")
            .json(&json!({ "filename": "notices.txt", "content_base64": encoded }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["clause_count"], 1);
        assert_eq!(json["findings"], json!([]));

        let actions = audit_actions(&dir).await;
        assert_eq!(actions.last(), Some(&AuditAction::NoRisks));
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_document() {
        let (server, _dir) = create_test_server().await;

        let response = server
            .post("/api/analyze")
            .json(&json!({ "filename": "empty.txt" }))
            .await;
        response.assert_status_bad_request();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_analyze_rejects_invalid_pdf() {
        let (server, dir) = create_test_server().await;

        let response = server
            .post("/api/analyze")
            .json(&json!({
                "filename": "broken.pdf",
                "content_base64": STANDARD.encode("definitely not a pdf")
            }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        // Nothing is audited for an abandoned request
        assert!(audit_actions(&dir).await.is_empty());
    }

    #[tokio::test]
    async fn test_score_risks_rejects_empty_clause() {
        let (server, _dir) = create_test_server().await;

        let response = server
            .post("/api/risks")
            .json(&json!({ "clauses": ["The vendor shall pay damages on breach.", "  "] }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "UNPROCESSABLE_INPUT");
    }

    #[tokio::test]
    async fn test_score_risks_returns_findings() {
        let (server, _dir) = create_test_server().await;

        let response = server
            .post("/api/risks")
            .json(&json!({ "clauses": ["The vendor shall pay damages on breach."] }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["finding_count"], 1);
        assert_eq!(json["findings"][0]["terms"], json!(["breach", "damages"]));
    }

    #[tokio::test]
    async fn test_compare_returns_unified_diff() {
        let (server, dir) = create_test_server().await;

        let response = server
            .post("/api/compare")
            .json(&json!({
                "original": { "filename": "v1.txt", "text": "a\nb\nc" },
                "modified": { "filename": "v2.txt", "text": "a\nx\nc" }
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["identical"], false);
        assert_eq!(
            json["unified"],
            "--- Original\n+++ Modified\n@@ -1,3 +1,3 @@\n a\n-b\n+x\n c"
        );

        let actions = audit_actions(&dir).await;
        assert_eq!(actions, vec![AuditAction::Compare { changed: true }]);
    }

    #[tokio::test]
    async fn test_compare_identical_documents() {
        let (server, _dir) = create_test_server().await;

        let response = server
            .post("/api/compare")
            .json(&json!({
                "original": { "text": "same\ntext" },
                "modified": { "text": "same\ntext" }
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["identical"], true);
        assert_eq!(json["unified"], "");
    }

    #[tokio::test]
    async fn test_precedent_search_defaults_to_three() {
        let (server, _dir) = create_test_server().await;

        let response = server
            .post("/api/precedents/search")
            .json(&json!({ "query": "disputes resolved by arbitration" }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["count"], 3);
        assert_eq!(json["results"][0]["rank"], 1);
        assert!(json["results"][0]["content"]
            .as_str()
            .unwrap()
            .contains("arbitration"));
    }

    #[tokio::test]
    async fn test_precedent_search_rejects_empty_query() {
        let (server, _dir) = create_test_server().await;

        let response = server
            .post("/api/precedents/search")
            .json(&json!({ "query": "   " }))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_templates_lists_nda() {
        let (server, _dir) = create_test_server().await;
        let response = server.get("/api/templates").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["count"], 1);
        assert_eq!(json["templates"][0]["name"], "nda");
    }

    #[tokio::test]
    async fn test_fill_template() {
        let (server, dir) = create_test_server().await;

        let response = server
            .post("/api/templates/fill")
            .json(&json!({
                "template": "nda",
                "fields": {
                    "party1": "Acme Corp",
                    "party2": "Globex Ltd",
                    "jurisdiction": "UK",
                    "date": "2026-10-16"
                }
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        let content = json["content"].as_str().unwrap();
        assert!(content.contains("October 16, 2026"));
        assert!(content.contains("laws of UK"));

        let actions = audit_actions(&dir).await;
        assert_eq!(
            actions,
            vec![AuditAction::TemplateGenerated {
                template: "nda".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_fill_template_errors() {
        let (server, _dir) = create_test_server().await;

        let unknown = server
            .post("/api/templates/fill")
            .json(&json!({ "template": "lease", "fields": {} }))
            .await;
        unknown.assert_status_not_found();

        let missing = server
            .post("/api/templates/fill")
            .json(&json!({ "template": "nda", "fields": { "party1": "Acme" } }))
            .await;
        missing.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_assistant_answers_from_clauses() {
        let (server, _dir) = create_test_server().await;

        let response = server
            .post("/api/assistant")
            .json(&json!({ "question": "who pays damages", "text": TWO_CLAUSES }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        let answer = json["answer"].as_str().unwrap();
        assert!(answer.starts_with("Here's what I found:"));
        assert!(answer.contains("Party liable for damages."));
    }

    #[tokio::test]
    async fn test_audit_chain_verifies_across_requests() {
        let (server, dir) = create_test_server().await;

        server
            .post("/api/analyze")
            .json(&json!({ "text": TWO_CLAUSES }))
            .await
            .assert_status_ok();
        server
            .post("/api/assistant")
            .json(&json!({ "question": "termination", "text": TWO_CLAUSES }))
            .await
            .assert_status_ok();

        let chain = read_chain(&dir.path().join("audit_log.txt")).await.unwrap();
        assert_eq!(chain.events.len(), 3);
        assert!(chain.verify().is_ok());
        assert_eq!(chain.events[0].actor, "anonymous");
    }
}
