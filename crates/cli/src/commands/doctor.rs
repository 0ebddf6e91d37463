use std::path::Path;

use serde::Serialize;
use stockbot_core::config::{AppConfig, LoadOptions, TransportMode};
use stockbot_core::domain::item::{join_serials, parse_serial_list};
use stockbot_core::{Inventory, InventoryPolicy, ItemName};

use super::{CommandResult, EXIT_CHECK_FAILED};

const PROBE_ITEM: &str = "doctor-probe";

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

pub fn run(config_path: Option<&Path>, json_output: bool) -> CommandResult {
    let report = build_report(config_path);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_CHECK_FAILED };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(config_path: Option<&Path>) -> DoctorReport {
    let mut checks = Vec::new();
    let options =
        LoadOptions { config_path: config_path.map(Path::to_path_buf), ..LoadOptions::default() };

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_slack_tokens(&config));
            checks.push(check_inventory(config.inventory.policy()));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "slack_token_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(check_inventory(InventoryPolicy::default()));
        }
    }

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_slack_tokens(config: &AppConfig) -> DoctorCheck {
    match config.slack.transport {
        TransportMode::Socket => DoctorCheck {
            name: "slack_token_readiness",
            status: CheckStatus::Pass,
            details: "app and bot tokens present with expected prefixes".to_string(),
        },
        TransportMode::Console => DoctorCheck {
            name: "slack_token_readiness",
            status: CheckStatus::Skipped,
            details: "console transport does not use slack tokens".to_string(),
        },
    }
}

/// Adds two probe units to a scratch inventory, ships one and removes the
/// other, and expects the probe item to be gone afterwards.
fn check_inventory(policy: InventoryPolicy) -> DoctorCheck {
    match inventory_round_trip(policy) {
        Ok(details) => {
            DoctorCheck { name: "inventory_self_check", status: CheckStatus::Pass, details }
        }
        Err(details) => {
            DoctorCheck { name: "inventory_self_check", status: CheckStatus::Fail, details }
        }
    }
}

fn inventory_round_trip(policy: InventoryPolicy) -> Result<String, String> {
    let mut inventory = Inventory::new(policy);
    let item = ItemName(PROBE_ITEM.to_string());

    inventory
        .add(item.clone(), 2, parse_serial_list("probe-1 probe-2"))
        .map_err(|error| format!("add failed: {error}"))?;
    let shipped = inventory.ship(&item, 1).map_err(|error| format!("ship failed: {error}"))?;
    if join_serials(&shipped.serials) != "probe-1" {
        return Err(format!(
            "ship returned `{}` instead of the oldest serial `probe-1`",
            join_serials(&shipped.serials)
        ));
    }
    inventory
        .remove(&item, 1, parse_serial_list("probe-2"))
        .map_err(|error| format!("remove failed: {error}"))?;

    if inventory.item_count() != 0 {
        return Err("probe item still listed after its last unit left".to_string());
    }

    Ok("add, ship (oldest first) and remove behaved as expected".to_string())
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

#[cfg(test)]
mod tests {
    use stockbot_core::InventoryPolicy;

    use super::{check_inventory, CheckStatus};

    #[test]
    fn inventory_self_check_passes_with_either_policy() {
        for enforce_unique_serials in [false, true] {
            let check = check_inventory(InventoryPolicy { enforce_unique_serials });
            assert_eq!(check.status, CheckStatus::Pass, "{}", check.details);
        }
    }
}
