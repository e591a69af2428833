//! Plain-text rendering for the terminal

use crate::catalog::{Comparison, LoadReport, Record, RecordKind, Recommendation};
use crate::journal::{JournalEntry, JournalStats};
use crate::Result;
use serde::Serialize;
use std::io::Write;

/// Longest summary shown in list rows
const SUMMARY_WIDTH: usize = 60;

/// Field shown next to the name in list views
fn summary_field(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Tea | RecordKind::Blend => "category",
        RecordKind::Cultivar => "species",
        RecordKind::Company | RecordKind::Region => "country",
        RecordKind::Product => "company",
        RecordKind::Tisane => "scientific_name",
        RecordKind::GlossaryTerm => "definition",
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// One row per record: id, name and a kind-specific summary
pub fn render_records(out: &mut dyn Write, kind: RecordKind, records: &[&Record]) -> Result<()> {
    if records.is_empty() {
        writeln!(out, "No {} records found.", kind)?;
        return Ok(());
    }

    let summary = summary_field(kind);
    let id_width = records.iter().map(|r| r.id().chars().count()).max().unwrap_or(2).max(2);
    let name_width = records.iter().map(|r| r.name().chars().count()).max().unwrap_or(4).max(4);

    writeln!(
        out,
        "{}  {}  {}",
        pad("ID", id_width),
        pad("NAME", name_width),
        summary.to_uppercase()
    )?;
    for record in records {
        let detail = record.get(summary).map(|v| v.flatten()).unwrap_or_default();
        writeln!(
            out,
            "{}  {}  {}",
            pad(record.id(), id_width),
            pad(record.name(), name_width),
            truncate(&detail, SUMMARY_WIDTH)
        )?;
    }
    writeln!(out, "\n{} {} record(s)", records.len(), kind)?;
    Ok(())
}

/// Suggestions with their scores, best first
pub fn render_recommendations(
    out: &mut dyn Write,
    kind: RecordKind,
    suggestions: &[Recommendation<'_>],
) -> Result<()> {
    if suggestions.is_empty() {
        writeln!(out, "No {} recommendations.", kind)?;
        return Ok(());
    }

    let summary = summary_field(kind);
    let id_width = suggestions.iter().map(|s| s.record.id().chars().count()).max().unwrap_or(2).max(2);
    let name_width = suggestions.iter().map(|s| s.record.name().chars().count()).max().unwrap_or(4).max(4);

    writeln!(
        out,
        "{}  {}  SCORE  {}",
        pad("ID", id_width),
        pad("NAME", name_width),
        summary.to_uppercase()
    )?;
    for suggestion in suggestions {
        let record = suggestion.record;
        let detail = record.get(summary).map(|v| v.flatten()).unwrap_or_default();
        writeln!(
            out,
            "{}  {}  {:>5.1}  {}",
            pad(record.id(), id_width),
            pad(record.name(), name_width),
            suggestion.score,
            truncate(&detail, SUMMARY_WIDTH)
        )?;
    }
    Ok(())
}

pub fn render_facets(out: &mut dyn Write, kind: RecordKind, field: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        writeln!(out, "No {} values for {} records.", field, kind)?;
        return Ok(());
    }
    for value in values {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

/// Every populated field of one record
pub fn render_detail(out: &mut dyn Write, record: &Record) -> Result<()> {
    writeln!(out, "{} ({} '{}')", record.name(), record.kind(), record.id())?;
    writeln!(out, "{}", "=".repeat(record.name().chars().count().max(8)))?;

    let width = record
        .present_fields()
        .map(|(def, _)| def.name.len())
        .max()
        .unwrap_or(0);
    for (def, value) in record.present_fields() {
        if def.name == record.schema().primary() {
            continue;
        }
        writeln!(out, "{}  {}", pad(def.name, width), value)?;
    }

    if let Some(brewing) = record.brewing() {
        writeln!(out)?;
        writeln!(out, "Brewing: {}", brewing.temperature_display())?;
        if let Some(steep) = brewing.steep_minutes {
            writeln!(out, "Steep:   {} min", steep)?;
        }
        if let Some(ratio) = brewing.ratio {
            writeln!(out, "Ratio:   {}", ratio)?;
        }
    }
    Ok(())
}

/// Longest cell shown in a comparison column
const COMPARISON_CELL_WIDTH: usize = 30;

/// Fields as rows, records as columns; `=` marks fields that agree
pub fn render_comparison(out: &mut dyn Write, comparison: &Comparison, differences_only: bool) -> Result<()> {
    writeln!(out, "Comparing {} {} records", comparison.records.len(), comparison.kind)?;

    let rows: Vec<_> = comparison
        .fields
        .iter()
        .filter(|f| !(differences_only && f.all_same))
        .collect();
    if rows.is_empty() {
        writeln!(out, "All shared fields are identical.")?;
        return Ok(());
    }

    let label_width = rows.iter().map(|f| f.field.len()).max().unwrap_or(0);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|f| {
            f.by_record
                .iter()
                .map(|v| truncate(&v.flatten(), COMPARISON_CELL_WIDTH))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = comparison
        .records
        .iter()
        .enumerate()
        .map(|(column, record)| {
            cells
                .iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(record.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = comparison
        .records
        .iter()
        .zip(&widths)
        .map(|(record, &width)| pad(&record.name, width))
        .collect();
    writeln!(out, "  {}  {}", pad("", label_width), header.join(" | ").trim_end())?;

    for (field, row) in rows.iter().zip(&cells) {
        let marker = if field.all_same { '=' } else { '≠' };
        let padded: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| pad(cell, width))
            .collect();
        writeln!(
            out,
            "{} {}  {}",
            marker,
            pad(field.field, label_width),
            padded.join(" | ").trim_end()
        )?;
    }
    Ok(())
}

pub fn render_entries(out: &mut dyn Write, entries: &[&JournalEntry]) -> Result<()> {
    if entries.is_empty() {
        writeln!(out, "No journal entries.")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(
            out,
            "#{} {} {} ({}) {}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.record_name,
            entry.record,
            entry.stars()
        )?;
        if !entry.brewing.is_empty() {
            writeln!(out, "    brewing: {}", entry.brewing)?;
        }
        if !entry.notes.is_empty() {
            writeln!(out, "    {}", entry.notes)?;
        }
    }
    Ok(())
}

pub fn render_stats(out: &mut dyn Write, stats: &JournalStats) -> Result<()> {
    writeln!(out, "Entries:          {}", stats.total_entries)?;
    writeln!(out, "Records tasted:   {}", stats.distinct_records)?;
    match stats.average_rating {
        Some(avg) => writeln!(out, "Average rating:   {:.2}", avg)?,
        None => writeln!(out, "Average rating:   -")?,
    }
    for (kind, count) in &stats.entries_by_kind {
        writeln!(out, "  {}: {}", kind, count)?;
    }
    for (rating, count) in stats.rating_histogram.iter().rev() {
        writeln!(out, "  {}: {}", "★".repeat(*rating as usize), count)?;
    }
    if let (Some(first), Some(last)) = (stats.first_entry, stats.last_entry) {
        writeln!(
            out,
            "Period:           {} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        )?;
    }
    Ok(())
}

pub fn render_report(out: &mut dyn Write, report: &LoadReport) -> Result<()> {
    writeln!(out, "Load mode: {}", report.mode)?;
    for source in &report.sources {
        writeln!(out, "Source:    {}", source.display())?;
    }
    for kind in RecordKind::ALL {
        let count = report.loaded.get(&kind).copied().unwrap_or(0);
        writeln!(out, "  {}  {}", pad(kind.as_str(), 13), count)?;
    }
    writeln!(out, "Total:     {}", report.total_loaded())?;

    if report.is_partial() {
        writeln!(out, "\nSkipped {} record(s):", report.skipped.len())?;
        for skipped in &report.skipped {
            writeln!(
                out,
                "  {} {} '{}': {}",
                skipped.source.display(),
                skipped.kind,
                skipped.record,
                skipped.reason
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogLoader;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_render_records_and_detail() {
        let set = CatalogLoader::strict()
            .load_str(
                "teas.yaml",
                "tea:\n  - name: Sencha\n    category: Green\n    brew_temp_c: 70-80\n    steep_time: 1-2\n",
            )
            .unwrap();
        let records: Vec<&Record> = set.list(RecordKind::Tea).collect();

        let table = render(|out| render_records(out, RecordKind::Tea, &records));
        assert!(table.starts_with("ID      NAME    CATEGORY\n"));
        assert!(table.contains("sencha  Sencha  Green"));
        assert!(table.ends_with("1 tea record(s)\n"));

        let detail = render(|out| render_detail(out, records[0]));
        assert!(detail.contains("category"));
        assert!(detail.contains("Brewing: 70-80°C"));
        assert!(detail.contains("Steep:   1-2 min"));
    }

    #[test]
    fn test_render_comparison_aligns_values_with_records() {
        let set = CatalogLoader::strict()
            .load_str(
                "teas.yaml",
                "tea:\n  - name: Sencha\n    category: Green\n  - name: Assam\n    category: Black\n  - name: Gyokuro\n    category: Green\n",
            )
            .unwrap();
        let selection: Vec<(RecordKind, String)> = ["sencha", "assam", "gyokuro"]
            .iter()
            .map(|id| (RecordKind::Tea, id.to_string()))
            .collect();
        let comparison = set.compare(&selection, 3).unwrap();

        let text = render(|out| render_comparison(out, &comparison, false));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Comparing 3 tea records",
                "            Sencha | Assam | Gyokuro",
                "≠ name      Sencha | Assam | Gyokuro",
                "≠ category  Green  | Black | Green",
            ]
        );
    }

    #[test]
    fn test_render_recommendations() {
        let set = CatalogLoader::strict()
            .load_str(
                "teas.yaml",
                "tea:\n  - name: Sencha\n    category: Green\n    origin: Japan\n  - name: Gyokuro\n    category: Green\n    origin: Japan\n",
            )
            .unwrap();
        let suggestions = set
            .recommend(
                RecordKind::Tea,
                &crate::catalog::Strategy::SimilarTo { id: "sencha".to_string() },
                &[],
                5,
            )
            .unwrap();

        let text = render(|out| render_recommendations(out, RecordKind::Tea, &suggestions));
        assert_eq!(text, "ID       NAME     SCORE  CATEGORY\ngyokuro  Gyokuro    5.0  Green\n");

        let empty = render(|out| render_recommendations(out, RecordKind::Tea, &[]));
        assert_eq!(empty, "No tea recommendations.\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long definition", 9), "a long...");
    }
}
