//! Utility functions and helpers

/// Insert `separator` between every group of three digits, counting from the right.
///
/// Only ASCII digits are expected; a leading sign is left in place.
pub fn group_thousands(digits: &str, separator: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut result = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push_str(separator);
        }
        result.push(c);
    }
    format!("{}{}", sign, result)
}
