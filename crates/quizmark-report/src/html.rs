//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use quizmark_core::report::GradingReport;
use quizmark_core::statistics::QuestionStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML audit page from a grading report.
pub fn generate_html(report: &GradingReport) -> String {
    let mut html = String::new();
    let test_id = html_escape(report.test.id.as_str());
    let stats = &report.aggregate;

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>quizmark report: {test_id}</title>\n"));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>quizmark report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Test: <strong>{}</strong> | {} questions | max score {} | {}</p>\n",
        test_id,
        report.test.question_count,
        report.test.max_score,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Graded</th><th>Failed</th><th>Mean</th><th>Median</th><th>Min</th><th>Max</th><th>Mean %</th><th>Full marks</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{:.1}%</td><td>{}</td></tr></tbody>\n",
        stats.submissions,
        report.failures.len(),
        stats.mean_score,
        stats.median_score,
        stats.min_score,
        stats.max_score,
        stats.mean_percentage * 100.0,
        stats.full_marks,
    ));
    html.push_str("</table>\n");

    if !stats.per_question.is_empty() {
        html.push_str("<h3>Award rate per question</h3>\n");
        html.push_str(&generate_bar_chart(&stats.per_question));

        html.push_str("<table class=\"questions\">\n");
        html.push_str("<thead><tr><th>Question</th><th>Type</th><th>Points</th><th>Mean awarded</th><th>Full</th><th>Zero</th><th>Issues</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for q in &stats.per_question {
            let issues: Vec<String> = q
                .issues
                .iter()
                .map(|(label, count)| format!("{label}: {count}"))
                .collect();
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(q.question_id.as_str()),
                html_escape(&q.kind.to_string()),
                q.max_points,
                q.mean_awarded,
                q.full_credit,
                q.zero_credit,
                html_escape(&issues.join(", ")),
            ));
        }
        html.push_str("</tbody></table>\n");
    }

    html.push_str("</section>\n");

    // Per-submission results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Submissions</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Submission</th><th onclick=\"sortTable(1)\">Variant</th><th onclick=\"sortTable(2)\">Score</th><th onclick=\"sortTable(3)\">Percent</th><th onclick=\"sortTable(4)\">Issues</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for graded in &report.cards {
        let card = &graded.card;
        let row_class = if card.max_score > 0 && card.total_score >= card.max_score {
            "pass"
        } else if card.total_score == 0 {
            "fail"
        } else {
            "partial"
        };
        let issue_count = card.questions.iter().filter(|q| q.issue.is_some()).count();

        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{} / {}</td><td>{:.1}%</td><td>{}</td></tr>\n",
            row_class,
            html_escape(&graded.source),
            card.variant.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
            card.total_score,
            card.max_score,
            card.percentage() * 100.0,
            issue_count,
        ));
    }

    for failure in &report.failures {
        html.push_str(&format!(
            "<tr class=\"fail\"><td>{}</td><td>-</td><td colspan=\"3\">{}</td></tr>\n",
            html_escape(&failure.source),
            html_escape(&failure.error),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &GradingReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(questions: &[QuestionStats]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 120;

    let total_height = questions.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, q) in questions.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let rate = q.award_rate.clamp(0.0, 1.0);
        let width = (rate * max_width as f64) as usize;

        let color = if rate >= 0.8 {
            "#22c55e"
        } else if rate >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">Q{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(q.question_id.as_str())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            rate * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --partial: #fef9c3; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --partial: #713f12; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.partial { background: var(--partial); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
