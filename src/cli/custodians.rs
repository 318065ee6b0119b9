use comfy_table::{Cell, Table};

use crate::custodians;
use crate::error::Result;

pub fn run() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Custodian", "Required Headers", "Optional Headers"]);
    for p in custodians::all() {
        table.add_row(vec![
            Cell::new(p.key),
            Cell::new(p.name),
            Cell::new(p.required_headers.join(", ")),
            Cell::new(p.optional_headers.join(", ")),
        ]);
    }
    println!("Supported Custodians\n{table}");
    println!("Anything else is matched by column keywords or mapped with --map.");
    Ok(())
}
