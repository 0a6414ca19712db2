//! Final-address check. Deliberately weak: it only reports, never fails the run.

/// Substrings whose presence in the final URL suggests the wizard finished.
pub const SUCCESS_MARKERS: [&str; 3] = ["login", "success", "dashboard"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Completed,
    Unconfirmed,
}

pub fn check_outcome(final_url: &str) -> Verdict {
    if SUCCESS_MARKERS.iter().any(|m| final_url.contains(m)) {
        tracing::info!("Registration completed successfully!");
        Verdict::Completed
    } else {
        tracing::warn!("Registration may not have completed");
        Verdict::Unconfirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_mark_completion() {
        assert_eq!(
            check_outcome("https://authorized-partner.netlify.app/login"),
            Verdict::Completed
        );
        assert_eq!(
            check_outcome("https://example.com/register/success?x=1"),
            Verdict::Completed
        );
        assert_eq!(check_outcome("https://example.com/dashboard"), Verdict::Completed);
    }

    #[test]
    fn test_other_urls_are_unconfirmed() {
        assert_eq!(
            check_outcome("https://authorized-partner.netlify.app/register?step=verification"),
            Verdict::Unconfirmed
        );
        assert_eq!(check_outcome(""), Verdict::Unconfirmed);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert_eq!(check_outcome("https://example.com/LOGIN"), Verdict::Unconfirmed);
    }
}
