use anyhow::Result;

use crate::bulk::{BulkReport, PROBABILITY_COLUMN, RECOMMENDATION_COLUMN};
use crate::hanoi::scoreboard::RankedScore;
use crate::hanoi::Move;
use crate::optimizer::SensitivityPoint;
use crate::storage::MoveHistoryEntry;

/// The upload as received, with probability and recommendation columns appended.
pub fn bulk_to_csv(report: &BulkReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    let mut header = report.headers.clone();
    header.push(PROBABILITY_COLUMN.to_string());
    header.push(RECOMMENDATION_COLUMN.to_string());
    writer.write_record(&header)?;
    for row in &report.rows {
        let mut record = row.values.clone();
        record.push(format!("{:.4}", row.probability));
        record.push(row.recommendation.to_string());
        writer.write_record(&record)?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn sensitivity_to_csv(points: &[SensitivityPoint]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["parameter", "value", "probability"])?;
    for point in points {
        writer.write_record([
            point.parameter.to_string(),
            point.value.to_string(),
            format!("{:.4}", point.probability),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn leaderboard_to_csv(scores: &[RankedScore]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["rank", "name", "moves", "time"])?;
    for score in scores {
        writer.write_record([
            score.rank.to_string(),
            score.name.clone(),
            score.moves.to_string(),
            format!("{:.2}", score.time),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// Moves numbered from 1, towers numbered from 1.
pub fn moves_to_csv(moves: &[Move]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["step", "source", "destination"])?;
    for (i, mv) in moves.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            (mv.from + 1).to_string(),
            (mv.to + 1).to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn history_to_csv(entries: &[MoveHistoryEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["game_id", "player_name", "disks", "moves", "time"])?;
    for entry in entries {
        writer.write_record([
            entry.game_id.clone(),
            entry.player_name.clone(),
            entry.disks.to_string(),
            entry.moves.len().to_string(),
            format!("{:.2}", entry.time),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::{Recommendation, ScoredRow};

    #[test]
    fn bulk_csv_appends_scoring_columns() {
        let report = BulkReport {
            headers: vec!["id".to_string(), "note".to_string()],
            rows: vec![ScoredRow {
                values: vec!["c-1".to_string(), "has, comma".to_string()],
                probability: 0.25,
                recommendation: Recommendation::Deprioritize,
            }],
            threshold: 0.5,
        };
        let out = bulk_to_csv(&report).expect("render");
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("id,note,subscription_probability,recommendation")
        );
        assert_eq!(lines.next(), Some("c-1,\"has, comma\",0.2500,De-prioritize"));
    }

    #[test]
    fn moves_are_one_based() {
        let out = moves_to_csv(&[Move::new(0, 2)]).expect("render");
        assert_eq!(out, "step,source,destination\n1,1,3\n");
    }
}
