//! Text summary builder for CLI output.
//!
//! Formats the researcher header, progress and paper listing as plain lines,
//! or as a standalone HTML table with the badge styles inlined.

use crate::model::{DashboardData, Paper, Progress};
use crate::styling::compute_style;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn status_marker(p: &Paper) -> &'static str {
    let style = compute_style(&p.status, p.color.as_deref(), p.font_color.as_deref());
    if style.glow {
        "*"
    } else {
        " "
    }
}

/// Build a text summary of `papers` (already filtered) within `data`.
pub(crate) fn build_text_summary(
    data: &DashboardData,
    papers: &[&Paper],
    progress: Progress,
) -> TextSummary {
    let mut lines = Vec::new();
    let r = &data.researcher;

    if r.credentials.trim().is_empty() {
        lines.push(format!("Researcher: {}", r.name));
    } else {
        lines.push(format!("Researcher: {}, {}", r.name, r.credentials));
    }
    if !r.guide.trim().is_empty() {
        if r.guide_credentials.trim().is_empty() {
            lines.push(format!("Guided by: {}", r.guide));
        } else {
            lines.push(format!("Guided by: {} ({})", r.guide, r.guide_credentials));
        }
    }
    lines.push(format!(
        "Papers: {} / {} ({}%)",
        progress.count, progress.goal, progress.percent
    ));

    if papers.len() != data.papers.len() {
        lines.push(format!("Showing {} of {}", papers.len(), data.papers.len()));
    }
    lines.push(String::new());

    let id_width = papers
        .iter()
        .map(|p| p.id.to_string().len() + 1)
        .max()
        .unwrap_or(2);
    for p in papers {
        // Multi-line titles collapse onto one line.
        let title = p.title.split_whitespace().collect::<Vec<_>>().join(" ");
        let id = format!("#{}", p.id);
        lines.push(format!(
            "{}{id:<id_width$}  {title}  [{}]",
            status_marker(p),
            p.status
        ));
    }

    TextSummary { lines }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `papers` as an HTML table. Titles keep their line breaks.
pub(crate) fn build_html_table(data: &DashboardData, papers: &[&Paper], progress: Progress) -> String {
    let r = &data.researcher;
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Research Portfolio</title>\n\
         <style>@keyframes pulse-glow { 50% { opacity: 0.6; } }</style></head><body>\n",
    );
    html.push_str(&format!(
        "<h1>{}</h1>\n<p>{}</p>\n",
        escape_html(&r.name),
        escape_html(&r.credentials)
    ));
    if !r.guide.trim().is_empty() {
        html.push_str(&format!(
            "<p>Guided by {} {}</p>\n",
            escape_html(&r.guide),
            escape_html(&r.guide_credentials)
        ));
    }
    html.push_str(&format!(
        "<p>Total Papers: {} / {} ({}%)</p>\n",
        progress.count, progress.goal, progress.percent
    ));
    html.push_str("<table>\n<tr><th>ID</th><th>Publication Title</th><th>Journal Status</th></tr>\n");
    for p in papers {
        let style = compute_style(&p.status, p.color.as_deref(), p.font_color.as_deref());
        let row_attr = if p.is_highlighted() {
            " class=\"highlight\""
        } else {
            ""
        };
        html.push_str(&format!(
            "<tr{row_attr}><td>#{}</td><td>{}</td><td><span style=\"{}\">{}</span></td></tr>\n",
            p.id,
            escape_html(&p.title).replace('\n', "<br>"),
            style.css_declarations(),
            escape_html(&p.status)
        ));
    }
    html.push_str("</table>\n</body></html>\n");
    html
}
