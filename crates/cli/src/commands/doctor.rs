use bookstore_agent::AgentRuntime;
use bookstore_core::config::{AppConfig, LlmProvider, LoadOptions};
use bookstore_core::journey::{JourneyDefinition, PurchaseJourney, ToolName};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = vec![check_journey_graph()];

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_tool_registry(&config));
            checks.push(check_llm_endpoint(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["tool_registry", "llm_endpoint"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_journey_graph() -> DoctorCheck {
    let graph = PurchaseJourney.graph();
    match graph.validate() {
        Ok(()) => DoctorCheck {
            name: "journey_graph",
            status: CheckStatus::Pass,
            details: format!(
                "purchase journey has {} states and {} transitions",
                graph.nodes.len(),
                graph.edges.len()
            ),
        },
        Err(error) => {
            DoctorCheck { name: "journey_graph", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_tool_registry(config: &AppConfig) -> DoctorCheck {
    let runtime = match AgentRuntime::bookstore(config) {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "tool_registry",
                status: CheckStatus::Fail,
                details: format!("agent runtime could not be assembled: {error:#}"),
            };
        }
    };

    let missing = ToolName::ALL
        .iter()
        .filter(|tool| runtime.tools().get(tool.as_str()).is_none())
        .map(|tool| tool.as_str())
        .collect::<Vec<_>>();
    if missing.is_empty() {
        DoctorCheck {
            name: "tool_registry",
            status: CheckStatus::Pass,
            details: format!("registered: {}", runtime.tools().names().join(", ")),
        }
    } else {
        DoctorCheck {
            name: "tool_registry",
            status: CheckStatus::Fail,
            details: format!("missing tools: {}", missing.join(", ")),
        }
    }
}

fn check_llm_endpoint(config: &AppConfig) -> DoctorCheck {
    match (config.llm.provider, config.llm.completions_url()) {
        (LlmProvider::Offline, _) | (_, None) => DoctorCheck {
            name: "llm_endpoint",
            status: CheckStatus::Skipped,
            details: "offline provider, replies are scripted".to_string(),
        },
        (provider, Some(url)) => DoctorCheck {
            name: "llm_endpoint",
            status: CheckStatus::Pass,
            details: format!("{provider:?} completions at `{url}` using model `{}`", config.llm.model),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
