/// Render an integer amount string in fixed-point with `decimals` fractional digits.
///
/// Works on the digit string directly so amounts wider than any native integer keep full precision.
pub fn format_token_amount(amount: &str, decimals: u32) -> String {
    let (sign, digits) = match amount.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", amount),
    };
    let digits = digits.trim_start_matches('0');
    let decimals = decimals as usize;
    if decimals == 0 {
        return format!("{}{}", sign, if digits.is_empty() { "0" } else { digits });
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    format!("{}{}.{}", sign, whole, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_wei_as_ether() {
        assert_eq!(format_token_amount("1500000000000000000", 18), "1.500000000000000000");
        assert_eq!(format_token_amount("42", 6), "0.000042");
        assert_eq!(format_token_amount("0", 2), "0.00");
    }

    #[test]
    fn keeps_sign_and_handles_zero_decimals() {
        assert_eq!(format_token_amount("-2500000", 6), "-2.500000");
        assert_eq!(format_token_amount("007", 0), "7");
    }
}
