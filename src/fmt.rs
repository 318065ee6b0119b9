/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let with_commas = group_thousands(int_part);
    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Share counts: whole numbers without decimals, fractions up to 4 places.
pub fn shares(val: f64) -> String {
    if val.fract() == 0.0 {
        format!("{val:.0}")
    } else {
        let s = format!("{val:.4}");
        s.trim_end_matches('0').to_string()
    }
}

pub fn percent(val: f64) -> String {
    format!("{val:.2}%")
}
