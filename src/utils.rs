use std::path::PathBuf;

/// Get the cache directory from the environment or use the default.
pub fn get_cache_dir() -> PathBuf {
    std::env::var("STOCKBOARD_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".stockboard-cache"))
}

/// Format a market capitalization for display (e.g. 3.1e12 -> "$3.10T").
pub fn format_market_cap(cap: f64) -> String {
    if cap <= 0.0 {
        return "$0".to_string();
    }
    if cap >= 1e12 {
        format!("${:.2}T", cap / 1e12)
    } else if cap >= 1e9 {
        format!("${:.2}B", cap / 1e9)
    } else if cap >= 1e6 {
        format!("${:.2}M", cap / 1e6)
    } else {
        format!("${:.2}K", cap / 1e3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap(3.1e12), "$3.10T");
        assert_eq!(format_market_cap(2.5e9), "$2.50B");
        assert_eq!(format_market_cap(4.0e6), "$4.00M");
        assert_eq!(format_market_cap(500.0), "$0.50K");
        assert_eq!(format_market_cap(0.0), "$0");
    }
}
