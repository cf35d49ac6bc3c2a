use std::fs;
use std::path::PathBuf;

use feasibility_engine::{EngineConfig, FeasibilityEngine, IdeaRequest, SignalBundle, SignalName};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    request: IdeaRequest,
    #[serde(default)]
    signals: SignalBundle,
    expected_risk_level: Option<String>,
    expected_market_outlook: Option<String>,
    expected_sentiment_label: Option<String>,
    expected_unavailable: Option<Vec<SignalName>>,
    expected_ethical_flag: Option<bool>,
    expected_error: Option<String>,
}

#[tokio::test]
async fn assessment_cases_pass() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let fixture = root
        .join("..")
        .join("..")
        .join("data")
        .join("fixtures")
        .join("assessment_cases.json");

    let content = fs::read_to_string(&fixture)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", fixture.display()));
    let cases: Vec<Case> = serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", fixture.display()));
    assert!(!cases.is_empty());

    let engine = FeasibilityEngine::builder(EngineConfig::default())
        .build()
        .expect("engine");

    for case in cases {
        let result = engine.assess(&case.request, case.signals).await;

        if let Some(kind) = case.expected_error {
            let err = result.expect_err(&case.name);
            assert_eq!(err.kind(), kind, "case {} failed", case.name);
            continue;
        }
        let out = result.unwrap_or_else(|e| panic!("case {} errored: {e}", case.name));

        assert!(
            (0.0..=1.0).contains(&out.composite_score),
            "case {} composite out of range",
            case.name
        );
        if let Some(level) = case.expected_risk_level {
            assert_eq!(out.risk_level.as_str(), level, "case {} failed", case.name);
        }
        if let Some(outlook) = case.expected_market_outlook {
            assert_eq!(out.market_outlook.as_str(), outlook, "case {} failed", case.name);
        }
        if let Some(label) = case.expected_sentiment_label {
            assert_eq!(out.sentiment_label.as_str(), label, "case {} failed", case.name);
        }
        if let Some(unavailable) = case.expected_unavailable {
            assert_eq!(out.missing_signals(), unavailable, "case {} failed", case.name);
        }
        if let Some(flag) = case.expected_ethical_flag {
            assert_eq!(out.ethical_flag, flag, "case {} failed", case.name);
        }
    }
}
