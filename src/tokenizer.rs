use std::collections::BTreeMap;

/// One data row keyed by header name.
pub type SampleRow = BTreeMap<String, String>;

/// The header line of an export and where it sits in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRow {
    /// 0-based line index.
    pub line: usize,
    pub fields: Vec<String>,
}

/// Split one CSV line into trimmed fields.
///
/// A `"` toggles quoting and is dropped; commas inside quotes are kept.
/// Doubled quotes are not treated as escapes, and an unterminated quote
/// simply runs to the end of the line.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Blank lines and `#` / `//` comments never hold the header.
pub fn is_skippable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#') || line.starts_with("//")
}

pub fn find_header(content: &str) -> Option<HeaderRow> {
    content
        .lines()
        .enumerate()
        .find(|(_, line)| !is_skippable(line))
        .map(|(line, text)| HeaderRow {
            line,
            fields: split_line(text),
        })
}

pub fn headers(content: &str) -> Vec<String> {
    find_header(content).map(|h| h.fields).unwrap_or_default()
}

/// First `limit` non-blank, non-comment rows after the header, keyed by header name.
pub fn sample_rows(content: &str, limit: usize) -> Vec<SampleRow> {
    let Some(header) = find_header(content) else {
        return Vec::new();
    };
    content
        .lines()
        .skip(header.line + 1)
        .filter(|line| !is_skippable(line))
        .take(limit)
        .map(|line| {
            let values = split_line(line);
            header
                .fields
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), values.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line_plain() {
        assert_eq!(split_line("AAPL,10,150.00"), vec!["AAPL", "10", "150.00"]);
    }

    #[test]
    fn test_split_line_quoted_comma() {
        assert_eq!(
            split_line("Symbol,\"Description, Inc.\",Quantity"),
            vec!["Symbol", "Description, Inc.", "Quantity"]
        );
    }

    #[test]
    fn test_split_line_trims_fields() {
        assert_eq!(split_line(" AAPL , \"Apple Inc.\" ,10 "), vec!["AAPL", "Apple Inc.", "10"]);
    }

    #[test]
    fn test_split_line_unterminated_quote() {
        assert_eq!(split_line("AAPL,\"Apple, Inc"), vec!["AAPL", "Apple, Inc"]);
    }

    #[test]
    fn test_split_line_empty_fields() {
        assert_eq!(split_line(",,0,,,"), vec!["", "", "0", "", "", ""]);
        assert_eq!(split_line(""), vec![""]);
    }

    #[test]
    fn test_find_header_skips_comments_and_blanks() {
        let content = "\n# exported 2025-01-31\n// account ****1234\n\nSymbol,Quantity\nAAPL,10\n";
        let header = find_header(content).unwrap();
        assert_eq!(header.line, 4);
        assert_eq!(header.fields, vec!["Symbol", "Quantity"]);
    }

    #[test]
    fn test_find_header_none_for_comment_only_text() {
        assert!(find_header("# nothing here\n\n  \n").is_none());
        assert!(headers("").is_empty());
    }

    #[test]
    fn test_headers_handles_crlf() {
        assert_eq!(headers("Symbol,Quantity\r\nAAPL,10\r\n"), vec!["Symbol", "Quantity"]);
    }

    #[test]
    fn test_sample_rows() {
        let content = "Symbol,Quantity,Price\nAAPL,10,150\n\nMSFT,5\nGOOG,1,100\n";
        let rows = sample_rows(content, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Symbol"], "AAPL");
        assert_eq!(rows[1]["Symbol"], "MSFT");
        assert_eq!(rows[1]["Price"], "");
    }
}
