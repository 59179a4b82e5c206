use chrono::{DateTime, Utc};

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;

/// Format a price in rupees the way listings are shown:
/// crores and lakhs with one decimal, smaller amounts with Indian digit grouping.
/// Zero (or a missing price) formats as an empty string.
pub fn format_price(price: f64) -> String {
    if price == 0.0 || price.is_nan() {
        return String::new();
    }

    if price >= CRORE {
        return format!("₹{:.1} Cr", price / CRORE);
    }

    if price >= LAKH {
        return format!("₹{:.1} L", price / LAKH);
    }

    format!("₹{}", group_indian(price))
}

/// Group digits as 12,34,567 with up to three fraction digits.
fn group_indian(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let mut whole = rounded.trunc() as u64;
    let mut fraction = ((rounded - rounded.trunc()) * 1000.0).round() as u64;
    if fraction >= 1000 {
        whole += 1;
        fraction = 0;
    }

    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if fraction > 0 {
        let frac = format!("{:03}", fraction);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Relative age of a timestamp for the status bar ("just now", "5m ago", "2h ago", "3d ago").
pub fn age_display(at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_price_empty() {
        assert_eq!(format_price(0.0), "");
        assert_eq!(format_price(f64::NAN), "");
    }

    #[test]
    fn test_format_price_crore_and_lakh() {
        assert_eq!(format_price(15_000_000.0), "₹1.5 Cr");
        assert_eq!(format_price(10_000_000.0), "₹1.0 Cr");
        assert_eq!(format_price(250_000.0), "₹2.5 L");
        assert_eq!(format_price(100_000.0), "₹1.0 L");
        assert_eq!(format_price(9_990_000.0), "₹99.9 L");
    }

    #[test]
    fn test_format_price_grouping() {
        assert_eq!(format_price(99_999.0), "₹99,999");
        assert_eq!(format_price(1234.5), "₹1,234.5");
        assert_eq!(format_price(999.0), "₹999");
        assert_eq!(format_price(12.3456), "₹12.346");
    }

    #[test]
    fn test_group_indian() {
        assert_eq!(group_indian(1_234_567.0), "12,34,567");
        assert_eq!(group_indian(123_456_789.0), "12,34,56,789");
        assert_eq!(group_indian(-4321.0), "-4,321");
        assert_eq!(group_indian(5.0), "5");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("₹₹₹₹₹₹", 5), "₹₹...");
    }

    #[test]
    fn test_age_display() {
        assert_eq!(age_display(Utc::now()), "just now");
        assert_eq!(age_display(Utc::now() + Duration::minutes(5)), "just now");
        assert_eq!(age_display(Utc::now() - Duration::minutes(5)), "5m ago");
        assert_eq!(age_display(Utc::now() - Duration::minutes(95)), "2h ago");
        assert_eq!(age_display(Utc::now() - Duration::days(3)), "3d ago");
    }
}
