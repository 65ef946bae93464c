use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::bulk::{BulkReport, Recommendation};
use crate::client::ValidationIssue;
use crate::hanoi::scoreboard::RankedScore;
use crate::hanoi::Move;
use crate::optimizer::recommendations::RecommendationReport;
use crate::optimizer::{MinimalChange, SensitivityPoint};
use crate::scoring::Prediction;
use crate::storage::MoveHistoryEntry;
use crate::strategy::{GuidanceRow, StrategyGuide};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

pub fn render_prediction_table(prediction: &Prediction) -> String {
    let mut table = new_table();
    table.set_header(vec!["Outcome", "Confidence", "P(subscribe)", "P(decline)"]);
    let outcome = if prediction.will_subscribe {
        Cell::new("WILL SUBSCRIBE").fg(Color::Green)
    } else {
        Cell::new("WILL NOT SUBSCRIBE").fg(Color::Red)
    };
    table.add_row(Row::from(vec![
        outcome,
        Cell::new(percent(prediction.confidence)),
        Cell::new(format!("{:.4}", prediction.subscribe)),
        Cell::new(format!("{:.4}", prediction.decline)),
    ]));
    table.to_string()
}

pub fn render_issues_table(issues: &[ValidationIssue]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Field", "Problem"]);
    for issue in issues {
        table.add_row(vec![
            Cell::new(issue.field).fg(Color::Yellow),
            Cell::new(&issue.message),
        ]);
    }
    table.to_string()
}

pub fn render_recommendation_table(report: &RecommendationReport) -> String {
    let mut table = new_table();
    table.set_header(vec!["Field", "Current", "Recommended"]);
    for change in &report.changes {
        table.add_row(vec![
            change.field.to_string(),
            change.from.clone(),
            change.to.clone(),
        ]);
    }

    let mut out = String::new();
    out.push_str(&table.to_string());
    out.push_str(&format!(
        "\nCurrent probability: {}\nBest probability: {}\nCandidates evaluated: {} ({} failed)",
        report
            .base_probability
            .map(percent)
            .unwrap_or_else(|| "-".to_string()),
        percent(report.outcome.score),
        report.outcome.evaluated,
        report.outcome.failed,
    ));
    for action in &report.actions {
        out.push_str(&format!("\n- {action}"));
    }
    out
}

pub fn render_minimal_change(result: &MinimalChange, threshold: f64) -> String {
    match &result.change {
        Some(change) => format!(
            "To reach {}: {} (probability {} -> {})",
            percent(threshold),
            change,
            percent(result.original_probability),
            percent(result.probability),
        ),
        None => format!(
            "No single change reaches {}. Current probability stays at {}.",
            percent(threshold),
            percent(result.probability),
        ),
    }
}

pub fn render_sensitivity_table(points: &[SensitivityPoint]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Parameter", "Value", "Probability"]);
    for point in points {
        table.add_row(vec![
            point.parameter.to_string(),
            point.value.to_string(),
            percent(point.probability),
        ]);
    }
    table.to_string()
}

/// First columns of each row plus the scoring outcome; wide uploads are cut to `max_columns`.
pub fn render_bulk_table(report: &BulkReport, max_columns: usize) -> String {
    let shown = report.headers.len().min(max_columns);
    let mut table = new_table();
    let mut header = report.headers[..shown].to_vec();
    header.push("Probability".to_string());
    header.push("Recommendation".to_string());
    table.set_header(header);

    for row in &report.rows {
        let mut cells = row.values[..shown.min(row.values.len())]
            .iter()
            .map(Cell::new)
            .collect::<Vec<_>>();
        cells.push(Cell::new(percent(row.probability)));
        let color = match row.recommendation {
            Recommendation::Prioritize => Color::Green,
            Recommendation::Deprioritize => Color::Red,
        };
        cells.push(Cell::new(row.recommendation.to_string()).fg(color));
        table.add_row(Row::from(cells));
    }

    format!(
        "{table}\n{} of {} clients prioritized (threshold {})",
        report.prioritized(),
        report.rows.len(),
        percent(report.threshold)
    )
}

fn guidance_table(headers: [&str; 3], rows: &[GuidanceRow]) -> Table {
    let mut table = new_table();
    table.set_header(headers.to_vec());
    for row in rows {
        table.add_row(vec![row.item, row.recommended, row.rationale]);
    }
    table
}

pub fn render_strategy_tables(guide: &StrategyGuide) -> String {
    let profiles = guidance_table(["Attribute", "Ideal Value", "Rationale"], guide.profiles);
    let campaign = guidance_table(
        ["Parameter", "Recommended Value", "Reasoning"],
        guide.campaign,
    );
    let mut out = format!("High-potential client profiles\n{profiles}\n");
    for line in guide.profile_actions {
        out.push_str(&format!("- {line}\n"));
    }
    out.push_str(&format!("\nOptimal campaign setup\n{campaign}\n"));
    for line in guide.campaign_tips {
        out.push_str(&format!("- {line}\n"));
    }
    out
}

pub fn render_leaderboard_table(scores: &[RankedScore], disks: u32) -> String {
    if scores.is_empty() {
        return format!("No scores yet for {disks} disks.");
    }
    let mut table = new_table();
    table.set_header(vec!["Rank", "Name", "Moves", "Time"]);
    for score in scores {
        table.add_row(vec![
            format!("#{}", score.rank),
            score.name.clone(),
            score.moves.to_string(),
            score.time_label.clone(),
        ]);
    }
    format!("Scoreboard ({disks} disks)\n{table}")
}

pub fn render_history_table(entries: &[MoveHistoryEntry]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Game", "Player", "Disks", "Moves", "Time (s)"]);
    for entry in entries {
        table.add_row(vec![
            entry.game_id.clone(),
            entry.player_name.clone(),
            entry.disks.to_string(),
            entry.moves.len().to_string(),
            format!("{:.2}", entry.time),
        ]);
    }
    table.to_string()
}

pub fn render_moves_table(moves: &[Move]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Step", "From", "To"]);
    for (i, mv) in moves.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            (mv.from + 1).to_string(),
            (mv.to + 1).to_string(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::guide;

    #[test]
    fn leaderboard_reports_empty_difficulty() {
        assert_eq!(
            render_leaderboard_table(&[], 6),
            "No scores yet for 6 disks."
        );
    }

    #[test]
    fn strategy_mentions_both_tables() {
        let out = render_strategy_tables(&guide());
        assert!(out.contains("High-potential client profiles"));
        assert!(out.contains("> 319 seconds"));
    }

    #[test]
    fn minimal_change_without_a_fix() {
        let result = MinimalChange {
            change: None,
            probability: 0.2,
            original_probability: 0.2,
            failed: 0,
        };
        assert_eq!(
            render_minimal_change(&result, 0.5),
            "No single change reaches 50.0%. Current probability stays at 20.0%."
        );
    }
}
