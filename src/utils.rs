use crate::models::OhlcvRow;

const TABLE_HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Render rows as a plain-text table: header line, right-aligned columns,
/// no index column
pub fn format_rows_table(rows: &[OhlcvRow]) -> String {
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.date.format("%Y-%m-%d").to_string(),
                format_price(row.open),
                format_price(row.high),
                format_price(row.low),
                format_price(row.close),
                row.volume.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADER.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |line: &[&str]| {
        line.iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut out = Vec::with_capacity(cells.len() + 1);
    out.push(render(&TABLE_HEADER[..]));
    for line in &cells {
        let refs: Vec<&str> = line.iter().map(String::as_str).collect();
        out.push(render(&refs));
    }
    out.join("\n")
}

/// At most two decimals, at least one
pub fn format_price(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Format large numbers with K/M/B suffixes
pub fn format_large_number(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}
