//! Quote-aware CSV scanning and the cell cleaning applied to spreadsheet exports.

/// Splits a whole CSV document into rows of cells.
///
/// Quoted cells may contain commas and newlines. Rows that are entirely blank are skipped.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    scan(text, true)
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect()
}

/// Splits a single CSV row into cells. Newlines are kept as cell content.
pub fn parse_row(row: &str) -> Vec<String> {
    scan(row, false).into_iter().next().unwrap_or_default()
}

fn scan(text: &str, split_rows: bool) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if chars.peek() == Some(&'"') => {
                chars.next();
                // `""` as a whole cell is an empty quoted field, not an escaped quote
                let empty_field = !inside_quotes
                    && current.is_empty()
                    && matches!(chars.peek(), None | Some(',' | '\n' | '\r'));
                if !empty_field {
                    current.push('"');
                }
            }
            '"' => inside_quotes = !inside_quotes,
            ',' if !inside_quotes => row.push(std::mem::take(&mut current)),
            '\r' if split_rows && !inside_quotes => {}
            '\n' if split_rows && !inside_quotes => {
                row.push(std::mem::take(&mut current));
                rows.push(std::mem::take(&mut row));
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() || !row.is_empty() || rows.is_empty() {
        row.push(current);
        rows.push(row);
    }
    rows
}

/// Normalizes one cell: trims, drops one layer of enclosing quotes, collapses
/// whitespace runs and unwraps `=HYPERLINK("url", ...)` formulas.
pub fn clean_cell(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    let collapsed = unquoted.split_whitespace().collect::<Vec<_>>().join(" ");
    match unwrap_hyperlink(&collapsed) {
        Some(url) => url.to_string(),
        None => collapsed,
    }
}

fn unwrap_hyperlink(cell: &str) -> Option<&str> {
    const PREFIX: &str = "=HYPERLINK(";
    let head = cell.get(..PREFIX.len())?;
    if !head.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    let args = cell[PREFIX.len()..].trim_start();
    let args = args.strip_prefix('"')?;
    let end = args.find('"')?;
    Some(args[..end].trim())
}

/// Header names are compared trimmed, unquoted, whitespace-collapsed and lowercased.
pub fn normalize_header(raw: &str) -> String {
    clean_cell(raw).to_lowercase()
}
