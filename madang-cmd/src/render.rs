//! Plain-text rendering for tables and bar charts.

use madang_db::models::ChartPoint;
use unicode_width::UnicodeWidthStr;

/// Width of the longest bar in a chart, in characters.
pub const BAR_WIDTH: usize = 40;

/// Terminal column width of `s`; wide characters (Hangul, CJK, emoji) count as two.
pub fn display_width(s: &str) -> usize {
    s.width()
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

/// Render rows under a header line, columns padded to their widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(idx) {
                *w = (*w).max(display_width(cell));
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        padded.join(" | ").trim_end().to_string()
    };

    let mut text = line(headers.to_vec());
    text.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    text.push_str(&rule.join("-+-"));
    text.push('\n');
    for row in rows {
        text.push_str(&line(row.iter().map(String::as_str).collect()));
        text.push('\n');
    }
    text
}

/// Render a horizontal bar chart, bars scaled to the largest value.
pub fn render_bar_chart(points: &[ChartPoint]) -> String {
    let label_width = points
        .iter()
        .map(|p| display_width(&p.label))
        .max()
        .unwrap_or(0);
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);

    let mut text = String::new();
    for point in points {
        let len = if max > 0.0 {
            ((point.value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        text.push_str(&format!(
            "{} | {} {}\n",
            pad(&point.label, label_width),
            "#".repeat(len),
            point.value
        ));
    }
    text
}
