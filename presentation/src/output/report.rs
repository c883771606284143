//! Transcript analysis report formatter

use colored::Colorize;
use divebar_domain::AnalysisReport;

/// Formats an [`AnalysisReport`] for console display
pub struct ReportFormatter;

impl ReportFormatter {
    /// Format the complete report
    pub fn format(report: &AnalysisReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Transcript Analysis"));
        output.push('\n');

        // Summary
        let summary = &report.summary;
        output.push_str(&Self::section_header("Summary"));
        output.push_str(&format!(
            "  sessions: {}  utterances: {}  speakers: {}  regenerations: {}\n",
            summary.sessions, summary.utterances, summary.speakers, summary.regenerations
        ));
        output.push_str(&format!(
            "  words: {} total, {} unique (vocabulary ratio {:.4})\n",
            summary.total_words, summary.unique_words, summary.vocabulary_ratio
        ));

        // Speakers
        if !report.speakers.is_empty() {
            output.push_str(&Self::section_header("Speakers"));
            output.push_str(&format!(
                "  {:<16} {:>6} {:>10} {:>10} {:>10} {:>10}\n",
                "speaker", "turns", "avg words", "avg ms", "prompt", "completion"
            ));
            for s in &report.speakers {
                let avg_ms = s
                    .avg_generation_ms
                    .map(|ms| format!("{:.0}", ms))
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!(
                    "  {:<16} {:>6} {:>10.1} {:>10} {:>10} {:>10}\n",
                    s.speaker, s.turns, s.avg_words, avg_ms, s.tokens_prompt, s.tokens_completion
                ));
            }
        }

        // Echoes
        output.push_str(&Self::section_header("Echo phrases (shared across speakers)"));
        if report.echoes.is_empty() {
            output.push_str(&format!("  {}\n", "none".dimmed()));
        }
        for echo in &report.echoes {
            output.push_str(&format!(
                "  {:>3}x  \"{}\"  {}\n",
                echo.count,
                echo.phrase.yellow(),
                echo.speakers.join(", ").dimmed()
            ));
        }

        // Openers
        output.push_str(&Self::section_header("Repeated openers"));
        if report.openers.is_empty() {
            output.push_str(&format!("  {}\n", "none".dimmed()));
        }
        for opener in &report.openers {
            output.push_str(&format!(
                "  {:>3}x  {}: \"{}\"\n",
                opener.count,
                opener.speaker.bold(),
                opener.opener
            ));
        }

        // Duplicates
        output.push_str(&Self::section_header("Exact duplicates"));
        if report.duplicates.is_empty() {
            output.push_str(&format!("  {}\n", "none".dimmed()));
        }
        for duplicate in &report.duplicates {
            output.push_str(&format!(
                "  {:>3}x  \"{}\"  {}\n",
                duplicate.count,
                duplicate.text.red(),
                duplicate.speakers.join(", ").dimmed()
            ));
        }

        // Topics
        if !report.top_words.is_empty() {
            output.push_str(&Self::section_header("Top words"));
            let words: Vec<String> = report
                .top_words
                .iter()
                .map(|w| format!("{} ({})", w.word, w.count))
                .collect();
            output.push_str(&format!("  {}\n", words.join(", ")));
        }

        output.push_str(&Self::section_header("Stale stretches"));
        if report.stale_stretches.is_empty() {
            output.push_str(&format!("  {}\n", "none".dimmed()));
        }
        for stretch in &report.stale_stretches {
            output.push_str(&format!(
                "  turns {:>4}-{:<4}  {} x{}\n",
                stretch.start_turn,
                stretch.end_turn,
                stretch.word.red(),
                stretch.count
            ));
        }

        // Regenerations
        if !report.regenerations.is_empty() {
            output.push_str(&Self::section_header("Regenerations"));
            for r in &report.regenerations {
                output.push_str(&format!(
                    "  {:<16} {} events, {} attempts ({:.2} avg)\n",
                    r.speaker, r.events, r.total_attempts, r.avg_attempts
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &AnalysisReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
