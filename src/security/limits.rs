//! Request limits.
//!
//! # Responsibilities
//! - Enforce the maximum parsed body size (see `http::body`)
//!
//! # Design Decisions
//! - Declared `Content-Length` is checked before any byte is read
//! - Streaming bodies are cut off once they pass the cap
//! - Exceeding the cap is a 413 Payload Too Large

/// Human-readable rendering of a byte limit for log lines.
pub fn describe_limit(bytes: usize) -> String {
    const MB: usize = 1024 * 1024;
    const KB: usize = 1024;

    if bytes >= MB && bytes % MB == 0 {
        format!("{}mb", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}kb", bytes / KB)
    } else {
        format!("{bytes}b")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_limit() {
        assert_eq!(describe_limit(10 * 1024 * 1024), "10mb");
        assert_eq!(describe_limit(64 * 1024), "64kb");
        assert_eq!(describe_limit(1000), "1000b");
    }
}
