use serde_json::json;

use super::*;

fn failure_for(body: ErrorBody) -> UploadFailure {
    UploadFailure::from_rejection(UploadRejection::new(Some(400), body))
}

#[test]
fn accepts_spreadsheet_extensions_case_insensitively() {
    assert!(has_allowed_extension("inventory.xlsx"));
    assert!(has_allowed_extension("INVENTORY.XLS"));
    assert!(has_allowed_extension("q3.report.Xlsx"));
    assert!(!has_allowed_extension("data.csv"));
    assert!(!has_allowed_extension("xlsx"));
    assert!(!has_allowed_extension("archive.xlsx.zip"));
}

#[test]
fn textual_json_array_is_read_as_validation_errors() {
    let failure = failure_for(ErrorBody::Text(
        r#"[{"row":2,"column":"sku","message":"required"}]"#.to_string(),
    ));

    assert_eq!(failure.kind, UploadFailureKind::ValidationErrors);
    assert_eq!(failure.title, "Validation Errors (1 found)");
    assert_eq!(failure.report, "Row 2, sku: required");
}

#[test]
fn validation_lines_keep_array_order() {
    let failure = failure_for(ErrorBody::Text(
        r#"[{"row":4,"column":"qty","message":"negative"},{"row":2,"column":"sku","message":"required"}]"#
            .to_string(),
    ));

    assert_eq!(failure.report, "Row 4, qty: negative\nRow 2, sku: required");
}

#[test]
fn textual_json_object_with_message_uses_the_message() {
    let failure = failure_for(ErrorBody::Text(r#"{"message":"Sheet is empty"}"#.to_string()));

    assert_eq!(failure.kind, UploadFailureKind::ServerMessage);
    assert_eq!(failure.title, "Upload Failed");
    assert_eq!(failure.report, "Sheet is empty");
}

#[test]
fn json_without_known_shape_falls_back_to_raw_text() {
    let raw = r#"{"error":"Bad Request","status":400}"#;
    let failure = failure_for(ErrorBody::Text(raw.to_string()));
    assert_eq!(failure.kind, UploadFailureKind::ServerMessage);
    assert_eq!(failure.report, raw);

    let failure = failure_for(ErrorBody::Text("[]".to_string()));
    assert_eq!(failure.kind, UploadFailureKind::ServerMessage);
    assert_eq!(failure.report, "[]");
}

#[test]
fn non_json_text_is_reported_verbatim() {
    let failure = failure_for(ErrorBody::Text("Import failed: workbook is locked".to_string()));

    assert_eq!(failure.kind, UploadFailureKind::ServerMessage);
    assert_eq!(failure.report, "Import failed: workbook is locked");
}

#[test]
fn structured_array_matches_textual_array_handling() {
    let failure = failure_for(ErrorBody::Structured(json!([
        {"row": 7, "column": "unitPrice", "message": "must be positive"},
        {"row": 9, "column": "name", "message": "required"}
    ])));

    assert_eq!(failure.kind, UploadFailureKind::ValidationErrors);
    assert_eq!(failure.title, "Validation Errors (2 found)");
    assert_eq!(
        failure.report,
        "Row 7, unitPrice: must be positive\nRow 9, name: required"
    );
}

#[test]
fn structured_object_with_message_is_a_server_message() {
    let failure = failure_for(ErrorBody::Structured(
        json!({"code": "internal", "message": "Database unavailable"}),
    ));

    assert_eq!(failure.kind, UploadFailureKind::ServerMessage);
    assert_eq!(failure.report, "Database unavailable");
}

#[test]
fn missing_or_unusable_body_is_unknown_with_generic_report() {
    for body in [
        ErrorBody::Absent,
        ErrorBody::Text("   ".to_string()),
        ErrorBody::Structured(json!({"status": 500})),
    ] {
        let failure = failure_for(body);
        assert_eq!(failure.kind, UploadFailureKind::Unknown);
        assert_eq!(failure.report, "Failed to upload file to backend.");
    }
}

#[test]
fn long_reports_are_cut_to_five_lines() {
    let lines: Vec<String> = (1..=8)
        .map(|n| format!("Row {n}, column: {}", "x".repeat(60)))
        .collect();
    let report = lines.join("\n");
    assert!(report.chars().count() > 200);

    let truncated = truncate_report(report);

    assert!(truncated.starts_with(&lines[..5].join("\n")));
    assert!(!truncated.contains(&lines[5]));
    assert!(truncated.ends_with("... and 3 more error(s). Check logs for full details."));
}

#[test]
fn short_reports_and_long_single_lines_are_untouched() {
    let short = "Row 1, sku: required\nRow 2, sku: required".to_string();
    assert_eq!(truncate_report(short.clone()), short);

    let single = "y".repeat(400);
    assert_eq!(truncate_report(single.clone()), single);
}

#[test]
fn outcome_notices_match_dashboard_wording() {
    let success = UploadOutcome::Success {
        filename: "stock.xlsx".to_string(),
    };
    let notice = success.notice();
    assert_eq!(notice.severity, crate::Severity::Success);
    assert_eq!(notice.detail, "File \"stock.xlsx\" uploaded successfully.");

    let rejected = UploadOutcome::Failure(UploadFailure::invalid_file_type());
    assert_eq!(rejected.failure_kind(), Some(UploadFailureKind::InvalidFileType));
    assert_eq!(rejected.notice().summary, "Invalid File Type");
    assert_eq!(UploadFailureKind::InvalidFileType.to_string(), "invalid-file-type");
}
