macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod config_ops;
pub mod dict_ops;
pub mod doc_ops;

use unicode_width::UnicodeWidthStr;

/// Right-pad `s` to `width` terminal columns.
pub(crate) fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    let mut out = s.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(w)));
    out
}

#[cfg(test)]
mod tests {
    use super::pad;

    #[test]
    fn test_pad_counts_wide_chars() {
        assert_eq!(pad("猫", 4), "猫  ");
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("吾輩は", 2), "吾輩は");
    }
}
