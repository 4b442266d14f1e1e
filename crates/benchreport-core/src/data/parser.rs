use serde_json::Value;

use crate::data::model::BenchmarkRun;
use crate::error::ReportError;

/// Split a benchmark document into its raw benchmark objects.
///
/// Three shapes are accepted:
/// - `{"benchmarks": [...]}` with a non-empty array,
/// - a single benchmark object (one carrying `type_`),
/// - a bare non-empty array of benchmark objects.
pub fn benchmark_values(document: Value) -> Result<Vec<Value>, ReportError> {
    match document {
        Value::Object(mut obj) => {
            if let Some(Value::Array(list)) = obj.remove("benchmarks") {
                if list.is_empty() {
                    return Err(ReportError::Parse(
                        "'benchmarks' array is empty".to_string(),
                    ));
                }
                return Ok(list);
            }
            if obj.contains_key("type_") {
                return Ok(vec![Value::Object(obj)]);
            }
            Err(ReportError::Parse(
                "object has neither a 'benchmarks' array nor a 'type_' field".to_string(),
            ))
        }
        Value::Array(list) if !list.is_empty() => Ok(list),
        Value::Array(_) => Err(ReportError::Parse("document is an empty array".to_string())),
        other => Err(ReportError::Parse(format!(
            "expected a JSON object or array, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse a benchmark document into typed runs.
pub fn parse_benchmark_document(content: &str) -> Result<Vec<BenchmarkRun>, ReportError> {
    let document: Value = serde_json::from_str(content)?;
    benchmark_values(document)?
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(ReportError::from))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::XAxis;
    use serde_json::json;

    fn make_benchmark(streams: u64) -> Value {
        json!({
            "type_": "generative_benchmark",
            "args": {"strategy": {"type_": "concurrent", "streams": streams}},
            "metrics": {
                "time_to_first_token_ms": {
                    "successful": {
                        "mean": 120.5,
                        "median": 110.0,
                        "percentiles": {"p95": 200.0, "p99": 250.0}
                    }
                }
            },
            "requests": {
                "successful": [
                    {"prompt_tokens": 128, "output_tokens": 64, "time_to_first_token_ms": 100.0},
                    {"prompt_tokens": 128, "output_tokens": 60, "time_to_first_token_ms": null}
                ],
                "errored": [{"prompt_tokens": 128}]
            }
        })
    }

    #[test]
    fn parses_benchmarks_wrapper() {
        let doc = json!({"benchmarks": [make_benchmark(1), make_benchmark(4)]});
        let runs = parse_benchmark_document(&doc.to_string()).expect("should parse");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].level(XAxis::Concurrency), Some(4.0));
        assert_eq!(runs[0].successful_count(), 2);
        assert_eq!(runs[0].errored_count(), 1);
    }

    #[test]
    fn parses_single_benchmark_object() {
        let runs = parse_benchmark_document(&make_benchmark(8).to_string()).expect("should parse");
        assert_eq!(runs.len(), 1);
        let ttft = runs[0]
            .summary("time_to_first_token_ms")
            .expect("summary should be present");
        assert_eq!(ttft.mean, Some(120.5));
        assert_eq!(ttft.percentile("p99"), Some(250.0));
    }

    #[test]
    fn parses_bare_array() {
        let doc = json!([make_benchmark(2)]);
        let runs = parse_benchmark_document(&doc.to_string()).expect("should parse");
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn null_request_fields_become_none() {
        let runs = parse_benchmark_document(&make_benchmark(1).to_string()).expect("should parse");
        let requests = &runs[0].requests.successful;
        assert_eq!(requests[0].time_to_first_token_ms, Some(100.0));
        assert_eq!(requests[1].time_to_first_token_ms, None);
    }

    #[test]
    fn empty_benchmarks_array_is_an_error() {
        let result = parse_benchmark_document(r#"{"benchmarks": []}"#);
        assert!(matches!(result, Err(ReportError::Parse(_))));
    }

    #[test]
    fn unrelated_object_is_an_error() {
        let result = parse_benchmark_document(r#"{"hello": "world"}"#);
        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("'type_'"));
    }

    #[test]
    fn scalar_document_is_an_error() {
        let err = parse_benchmark_document("42").expect_err("should fail");
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn invalid_json_is_a_serde_error() {
        let result = parse_benchmark_document("{not json");
        assert!(matches!(result, Err(ReportError::Serde(_))));
    }
}
