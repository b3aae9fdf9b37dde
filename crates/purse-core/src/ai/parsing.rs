//! Validation of AI tool calls and citation handling
//!
//! The service hands back loosely-typed function calls; everything is
//! validated here, at the mediation boundary, into the closed
//! `ToolInvocation` set before any of it is handed to the rest of the
//! system.

use tracing::warn;

use crate::error::{Error, Result};
use crate::tools::{
    CreateChartArgs, ProposeInstallmentArgs, ToolInvocation, CREATE_CHART_TOOL,
    PROPOSE_INSTALLMENT_TOOL,
};

use super::types::RawToolCall;

/// Validate one raw tool call into a typed invocation
pub fn parse_tool_call(call: &RawToolCall) -> Result<ToolInvocation> {
    match call.name.as_str() {
        PROPOSE_INSTALLMENT_TOOL => {
            let args: ProposeInstallmentArgs = serde_json::from_value(call.args.clone())
                .map_err(|e| {
                    Error::InvalidData(format!("Invalid installment proposal arguments: {}", e))
                })?;
            Ok(ToolInvocation::ProposeInstallment(args.validate()?))
        }
        CREATE_CHART_TOOL => {
            let args: CreateChartArgs = serde_json::from_value(call.args.clone())
                .map_err(|e| Error::InvalidData(format!("Invalid chart arguments: {}", e)))?;
            Ok(ToolInvocation::CreateChart(args.into_spec()?))
        }
        other => Err(Error::InvalidData(format!("Unknown tool: {}", other))),
    }
}

/// Validate a batch of tool calls, dropping and logging the bad ones
pub fn parse_tool_calls(calls: &[RawToolCall]) -> Vec<ToolInvocation> {
    calls
        .iter()
        .filter_map(|call| match parse_tool_call(call) {
            Ok(invocation) => Some(invocation),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Dropping malformed tool call");
                None
            }
        })
        .collect()
}

/// First `cap` unique citation URLs, in order of appearance
pub fn unique_citations(urls: &[String], cap: usize) -> Vec<String> {
    let mut seen = Vec::new();
    for url in urls {
        if url.is_empty() || seen.contains(url) {
            continue;
        }
        seen.push(url.clone());
        if seen.len() == cap {
            break;
        }
    }
    seen
}

/// Render citations as a distinct trailing block, never interleaved
/// with the answer text
pub fn format_sources_block(citations: &[String]) -> String {
    if citations.is_empty() {
        return String::new();
    }
    format!("\n\n--- Sources ---\n{}", citations.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartType, DataSource, GroupAxis};

    fn call(name: &str, args: serde_json::Value) -> RawToolCall {
        RawToolCall {
            name: name.into(),
            args,
        }
    }

    #[test]
    fn test_parse_installment_proposal() {
        let invocation = parse_tool_call(&call(
            PROPOSE_INSTALLMENT_TOOL,
            serde_json::json!({
                "title": "TV",
                "totalAmount": 5000.0,
                "installmentCount": 10
            }),
        ))
        .unwrap();
        match invocation {
            ToolInvocation::ProposeInstallment(p) => {
                assert_eq!(p.title, "TV");
                assert_eq!(p.installment_count, 10);
            }
            other => panic!("unexpected invocation: {:?}", other),
        }
    }

    #[test]
    fn test_parse_chart_call() {
        let invocation = parse_tool_call(&call(
            CREATE_CHART_TOOL,
            serde_json::json!({
                "title": "Income by client",
                "chartType": "bar",
                "dataSource": "income",
                "groupBy": "client"
            }),
        ))
        .unwrap();
        match invocation {
            ToolInvocation::CreateChart(spec) => {
                assert_eq!(spec.chart_type, ChartType::Bar);
                assert_eq!(spec.data_source, DataSource::Income);
                assert_eq!(spec.group_by, GroupAxis::Client);
            }
            other => panic!("unexpected invocation: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tool_rejected() {
        assert!(parse_tool_call(&call("drop_table", serde_json::json!({}))).is_err());
    }

    #[test]
    fn test_batch_drops_malformed_calls() {
        let calls = vec![
            call(
                PROPOSE_INSTALLMENT_TOOL,
                serde_json::json!({"title": "TV", "totalAmount": -5.0, "installmentCount": 10}),
            ),
            call(
                PROPOSE_INSTALLMENT_TOOL,
                serde_json::json!({"title": "Car", "totalAmount": 9000.0, "installmentCount": 36}),
            ),
        ];
        let parsed = parse_tool_calls(&calls);
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_unique_citations_caps_and_dedups() {
        let urls = vec![
            "https://a.test".to_string(),
            "https://a.test".to_string(),
            "https://b.test".to_string(),
            "https://c.test".to_string(),
            "https://d.test".to_string(),
        ];
        let unique = unique_citations(&urls, 3);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0], "https://a.test");
        assert_eq!(unique[2], "https://c.test");
    }

    #[test]
    fn test_sources_block_formatting() {
        assert_eq!(format_sources_block(&[]), "");
        let block = format_sources_block(&["https://a.test".to_string()]);
        assert!(block.starts_with("\n\n--- Sources ---\n"));
        assert!(block.ends_with("https://a.test"));
    }
}
