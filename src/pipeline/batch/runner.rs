//! BatchPipeline: drives extraction → metric prompt → sanitize for every
//! report, then one summary over everything that succeeded.
//!
//! Runs sequentially (one model call at a time) so progress is reported in
//! input order.

use std::time::Instant;

use super::error::BatchError;
use super::summary::SummaryGenerator;
use super::types::*;
use crate::models::{MetricRecord, ResultSet, SourceDocument};
use crate::pipeline::extraction::{extract_document_text, PdfExtractor};
use crate::pipeline::structuring::types::LlmClient;
use crate::pipeline::structuring::{sanitize_response, MetricExtractor};

/// Progress reported while the summary is generated.
const SUMMARY_PROGRESS: f32 = 0.9;

/// Orchestrates a full analysis run over a batch of reports.
pub struct BatchPipeline<'a> {
    extractor: &'a dyn PdfExtractor,
    llm: &'a dyn LlmClient,
}

impl<'a> BatchPipeline<'a> {
    pub fn new(extractor: &'a dyn PdfExtractor, llm: &'a dyn LlmClient) -> Self {
        Self { extractor, llm }
    }

    /// Process every document in input order.
    ///
    /// A failure on one document is recorded as a notice and never affects
    /// the documents after it. The summary runs once, over the complete
    /// result set, and only when at least one document succeeded.
    pub fn run(
        &self,
        documents: &[SourceDocument],
        progress_fn: Option<&dyn Fn(BatchStatusEvent)>,
    ) -> Result<BatchOutcome, BatchError> {
        if documents.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let start = Instant::now();
        let total = documents.len();
        let emit = |event: BatchStatusEvent| {
            if let Some(progress) = progress_fn {
                progress(event);
            }
        };

        tracing::info!(
            documents = total,
            model = self.llm.model_name(),
            "Starting analysis batch"
        );
        emit(BatchStatusEvent::Started {
            document_count: total,
        });

        let mut outcome = BatchOutcome {
            documents_total: total,
            ..Default::default()
        };
        let mut last_fraction = 0.0_f32;

        for (i, document) in documents.iter().enumerate() {
            last_fraction = i as f32 / total as f32;
            emit(BatchStatusEvent::Progress {
                fraction: last_fraction,
                label: format!("Analyzing {}...", document.label),
            });

            match self.process_document(document) {
                Ok(record) => {
                    if outcome.results.insert(&document.label, record).is_some() {
                        tracing::warn!(
                            label = %document.label,
                            "Duplicate document label, replacing earlier result"
                        );
                    }
                    tracing::info!(label = %document.label, "Report analyzed");
                }
                Err(notice) => {
                    tracing::warn!(
                        label = %notice.label,
                        kind = %notice.kind,
                        message = %notice.message,
                        "Report skipped"
                    );
                    outcome.notices.push(notice);
                }
            }
        }

        if outcome.results.is_empty() {
            tracing::warn!("No report produced usable metrics, skipping summary");
        } else {
            emit(BatchStatusEvent::Progress {
                fraction: SUMMARY_PROGRESS.max(last_fraction),
                label: "Generating Executive Summary...".to_string(),
            });
            match SummaryGenerator::new(self.llm).generate(&outcome.results) {
                Ok(summary) => outcome.summary = Some(summary),
                Err(e) => {
                    tracing::warn!(error = %e, "Summary generation failed");
                    outcome.notices.push(BatchNotice::new(
                        "summary",
                        NoticeKind::Summary,
                        format!("Summary generation failed: {e}"),
                    ));
                }
            }
        }

        outcome.duration_ms = start.elapsed().as_millis() as u64;

        emit(BatchStatusEvent::Completed {
            results: outcome.results.len(),
            notices: outcome.notices.len(),
            duration_ms: outcome.duration_ms,
        });

        tracing::info!(
            analyzed = outcome.documents_analyzed(),
            skipped = outcome.documents_failed(),
            duration_ms = outcome.duration_ms,
            "Analysis batch finished"
        );

        Ok(outcome)
    }

    /// Run one document end to end. Every failure becomes a notice.
    fn process_document(&self, document: &SourceDocument) -> Result<MetricRecord, BatchNotice> {
        let label = document.label.as_str();

        let text = extract_document_text(self.extractor, document).map_err(|e| {
            BatchNotice::new(label, NoticeKind::Extraction, format!("Error reading PDF: {e}"))
        })?;

        if text.trim().is_empty() {
            return Err(BatchNotice::new(
                label,
                NoticeKind::EmptyText,
                format!("No extractable text in {label}"),
            ));
        }

        let raw = MetricExtractor::new(self.llm)
            .extract_metrics(&text, label)
            .map_err(|e| {
                BatchNotice::new(label, NoticeKind::ModelInvocation, format!("API Error: {e}"))
            })?;

        sanitize_response(&raw).ok_or_else(|| {
            BatchNotice::new(
                label,
                NoticeKind::MalformedResponse,
                format!("Failed to parse data for {label}"),
            )
        })
    }
}

/// Convenience wrapper: run a batch and return only the result set.
pub fn run_batch(
    documents: &[SourceDocument],
    extractor: &dyn PdfExtractor,
    llm: &dyn LlmClient,
) -> Result<ResultSet, BatchError> {
    BatchPipeline::new(extractor, llm)
        .run(documents, None)
        .map(|outcome| outcome.results)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::pipeline::extraction::{ExtractionError, PageExtraction};
    use crate::pipeline::structuring::ollama::MockLlmClient;

    /// Treats document bytes as page text. `CORRUPT` fails to open; `|`
    /// separates pages.
    struct ScriptedPdf;

    impl PdfExtractor for ScriptedPdf {
        fn extract_text(&self, bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError> {
            let text = String::from_utf8_lossy(bytes);
            if text == "CORRUPT" {
                return Err(ExtractionError::PdfParsing("invalid header".into()));
            }
            Ok(text
                .split('|')
                .enumerate()
                .map(|(i, t)| PageExtraction {
                    page_number: i + 1,
                    text: t.to_string(),
                })
                .collect())
        }
    }

    fn doc(label: &str, text: &str) -> SourceDocument {
        SourceDocument::new(label, text.as_bytes().to_vec())
    }

    const Q1_JSON: &str = r#"{"quarterly_revenue_bn": 12.3, "eps": 1.1, "net_interest_income_millions": 1850, "dividend_per_share": 0.75, "assets_under_supervision_bn": 2810.5}"#;
    const Q2_JSON: &str = r#"{"quarterly_revenue_bn": 13.1, "eps": 1.2, "net_interest_income_millions": 1910, "dividend_per_share": 0.8, "assets_under_supervision_bn": 2950.0}"#;

    #[test]
    fn empty_batch_is_rejected_before_processing() {
        let llm = MockLlmClient::new("{}");
        let result = BatchPipeline::new(&ScriptedPdf, &llm).run(&[], None);
        assert!(matches!(result, Err(BatchError::EmptyBatch)));
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn two_quarters_end_to_end() {
        let llm = MockLlmClient::new("The quarter showed growth.")
            .then_respond(&format!("```json\n{Q1_JSON}\n```"))
            .then_respond(Q2_JSON);
        let docs = vec![doc("Q1", "Q1 report text"), doc("Q2", "Q2 report text")];

        let outcome = BatchPipeline::new(&ScriptedPdf, &llm).run(&docs, None).unwrap();

        assert_eq!(outcome.results.labels(), vec!["Q1", "Q2"]);
        assert_eq!(outcome.results.get("Q1").unwrap().revenue_bn(), 12.3);
        assert_eq!(outcome.results.get("Q2").unwrap().eps_value(), 1.2);
        assert_eq!(outcome.summary.as_deref(), Some("The quarter showed growth."));
        assert!(outcome.notices.is_empty());
        assert!(outcome.is_complete_success());

        // Third call is the summary, built from exactly this mapping.
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains(&outcome.results.to_pretty_json()));
    }

    #[test]
    fn failing_middle_extraction_does_not_stop_batch() {
        let llm = MockLlmClient::new("summary")
            .then_respond(Q1_JSON)
            .then_respond(Q2_JSON);
        let docs = vec![doc("Q1", "first"), doc("Q2", "CORRUPT"), doc("Q3", "third")];

        let outcome = BatchPipeline::new(&ScriptedPdf, &llm).run(&docs, None).unwrap();

        assert_eq!(outcome.results.labels(), vec!["Q1", "Q3"]);
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].label, "Q2");
        assert_eq!(outcome.notices[0].kind, NoticeKind::Extraction);

        // Q3 was still sent to the model, after Q1, with its own text.
        let prompts = llm.prompts();
        assert!(prompts[0].contains("first"));
        assert!(prompts[1].contains("third"));
        assert!(prompts[1].contains("Q3 report"));
    }

    #[test]
    fn empty_text_never_invokes_model() {
        let llm = MockLlmClient::new(Q1_JSON);
        let docs = vec![doc("Q1", "  |\n|")];

        let outcome = BatchPipeline::new(&ScriptedPdf, &llm).run(&docs, None).unwrap();

        assert_eq!(llm.call_count(), 0);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.notices[0].kind, NoticeKind::EmptyText);
        assert!(outcome.summary.is_none());
    }

    #[test]
    fn model_failure_is_isolated_per_document() {
        let llm = MockLlmClient::new("summary")
            .then_fail("quota exceeded")
            .then_respond(Q2_JSON);
        let docs = vec![doc("Q1", "one"), doc("Q2", "two")];

        let outcome = BatchPipeline::new(&ScriptedPdf, &llm).run(&docs, None).unwrap();

        assert_eq!(outcome.results.labels(), vec!["Q2"]);
        assert_eq!(outcome.notices[0].kind, NoticeKind::ModelInvocation);
        assert!(outcome.notices[0].message.contains("quota exceeded"));
        assert_eq!(outcome.summary.as_deref(), Some("summary"));
    }

    #[test]
    fn zero_successes_skip_summary() {
        let llm = MockLlmClient::new("Sorry, I cannot find those figures.");
        let docs = vec![doc("Q1", "one"), doc("Q2", "two")];

        let outcome = BatchPipeline::new(&ScriptedPdf, &llm).run(&docs, None).unwrap();

        assert!(outcome.results.is_empty());
        assert!(outcome.summary.is_none());
        assert_eq!(outcome.notices.len(), 2);
        assert!(outcome
            .notices
            .iter()
            .all(|n| n.kind == NoticeKind::MalformedResponse));
        // Two extraction calls, no summary call.
        assert_eq!(llm.call_count(), 2);
    }

    #[test]
    fn summary_failure_keeps_results() {
        let llm = MockLlmClient::failing("summary quota").then_respond(Q1_JSON);
        let docs = vec![doc("Q1", "one")];

        let outcome = BatchPipeline::new(&ScriptedPdf, &llm).run(&docs, None).unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.summary.is_none());
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].kind, NoticeKind::Summary);
    }

    #[test]
    fn partial_record_is_accepted() {
        let llm = MockLlmClient::new("summary").then_respond(r#"{"eps": 1.5}"#);
        let docs = vec![doc("Q1", "one")];

        let results = run_batch(&docs, &ScriptedPdf, &llm).unwrap();

        let record = results.get("Q1").unwrap();
        assert_eq!(record.eps_value(), 1.5);
        assert_eq!(record.revenue_bn(), 0.0);
    }

    #[test]
    fn duplicate_labels_last_write_wins() {
        let llm = MockLlmClient::new("summary")
            .then_respond(Q1_JSON)
            .then_respond(Q2_JSON);
        let docs = vec![doc("Q1", "one"), doc("Q1", "two")];

        let outcome = BatchPipeline::new(&ScriptedPdf, &llm).run(&docs, None).unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results.get("Q1").unwrap().revenue_bn(), 13.1);
        assert!(outcome.notices.is_empty());
        assert_eq!(outcome.documents_failed(), 0);
        assert_eq!(outcome.documents_analyzed(), 2);
        assert!(outcome.is_complete_success());
    }

    #[test]
    fn result_count_never_exceeds_documents() {
        let scripts: [&[&str]; 3] = [
            &[Q1_JSON, Q2_JSON, Q1_JSON],
            &["nope", Q2_JSON, "[]"],
            &["", "", ""],
        ];
        for script in scripts {
            let mut llm = MockLlmClient::new("summary");
            for response in script {
                llm = llm.then_respond(response);
            }
            let docs = vec![doc("Q1", "a"), doc("Q2", "b"), doc("Q3", "c")];
            let outcome = BatchPipeline::new(&ScriptedPdf, &llm).run(&docs, None).unwrap();
            assert!(outcome.results.len() <= docs.len());
            let failed = outcome
                .notices
                .iter()
                .filter(|n| n.kind != NoticeKind::Summary)
                .count();
            assert_eq!(outcome.results.len() + failed, docs.len());
        }
    }

    #[test]
    fn progress_is_monotonic_and_ordered() {
        let llm = MockLlmClient::new("summary")
            .then_respond(Q1_JSON)
            .then_respond(Q2_JSON);
        let docs = vec![doc("Q1", "one"), doc("Q2", "two")];
        let events = RefCell::new(Vec::new());
        let record = |e: BatchStatusEvent| events.borrow_mut().push(e);

        BatchPipeline::new(&ScriptedPdf, &llm)
            .run(&docs, Some(&record))
            .unwrap();

        let events = events.into_inner();
        let labels: Vec<String> = events.iter().map(|e| e.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Starting analysis of 2 reports...",
                "Analyzing Q1...",
                "Analyzing Q2...",
                "Generating Executive Summary...",
                "Done!",
            ]
        );

        let fractions: Vec<f32> = events.iter().map(|e| e.fraction()).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]), "{fractions:?}");
        assert_eq!(fractions[1], 0.0);
        assert_eq!(fractions[2], 0.5);
        assert_eq!(*fractions.last().unwrap(), 1.0);
    }

    #[test]
    fn summary_progress_never_goes_backwards_on_large_batches() {
        let llm = MockLlmClient::new(Q1_JSON);
        let docs: Vec<SourceDocument> = (1..=20)
            .map(|i| doc(&format!("R{i:02}"), "text"))
            .collect();
        let fractions = RefCell::new(Vec::new());
        let record = |e: BatchStatusEvent| fractions.borrow_mut().push(e.fraction());

        BatchPipeline::new(&ScriptedPdf, &llm)
            .run(&docs, Some(&record))
            .unwrap();

        let fractions = fractions.into_inner();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]), "{fractions:?}");
    }
}
