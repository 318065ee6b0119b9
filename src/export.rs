use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::{CanonicalField, Holding};

/// Write holdings as canonical CSV:
/// `symbol,description,shares,price,marketValue,costBasis`.
/// The header row is written even when there are no holdings.
pub fn write_holdings<W: Write>(writer: W, holdings: &[Holding]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CanonicalField::ALL.map(|f| f.key()))?;
    for holding in holdings {
        wtr.serialize(holding)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_holdings_file(path: &Path, holdings: &[Holding]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_holdings(std::io::BufWriter::new(file), holdings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_holdings() {
        let holdings = vec![
            Holding {
                symbol: "AAPL".to_string(),
                description: Some("Apple Inc., common".to_string()),
                shares: 10.0,
                price: 150.0,
                market_value: 1500.0,
                cost_basis: Some(1200.0),
            },
            Holding {
                symbol: "VTI".to_string(),
                description: None,
                shares: 2.5,
                price: 250.0,
                market_value: 625.0,
                cost_basis: None,
            },
        ];
        let mut buf = Vec::new();
        write_holdings(&mut buf, &holdings).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "symbol,description,shares,price,marketValue,costBasis");
        assert_eq!(lines[1], "AAPL,\"Apple Inc., common\",10.0,150.0,1500.0,1200.0");
        assert_eq!(lines[2], "VTI,,2.5,250.0,625.0,");
    }

    #[test]
    fn test_write_holdings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_holdings_file(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "symbol,description,shares,price,marketValue,costBasis\n");
    }
}
