//! Line/stream match rule

use crate::models::{Line, Stream};

/// A line and a stream combine when their codes are equal and the stream is
/// either unscoped or scoped to the line's provider.
pub fn is_match(line: &Line, stream: &Stream) -> bool {
    line.code == stream.code
        && stream
            .provider_id
            .is_none_or(|provider_id| provider_id == line.provider_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn line(provider_id: i32, code: &str) -> Line {
        let now = Utc::now();
        Line {
            id: 1,
            provider_id,
            name: "line".to_string(),
            code: code.to_string(),
            display_name: "line1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn stream(provider_id: Option<i32>, code: &str) -> Stream {
        let now = Utc::now();
        Stream {
            id: 1,
            name: "stream".to_string(),
            code: code.to_string(),
            provider_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case::unscoped_same_code(1, "A", None, "A", true)]
    #[case::scoped_same_provider(1, "A", Some(1), "A", true)]
    #[case::scoped_other_provider(1, "A", Some(2), "A", false)]
    #[case::unscoped_other_code(1, "A", None, "B", false)]
    #[case::codes_are_case_sensitive(1, "a", None, "A", false)]
    fn match_rule(
        #[case] line_provider: i32,
        #[case] line_code: &str,
        #[case] stream_provider: Option<i32>,
        #[case] stream_code: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            is_match(&line(line_provider, line_code), &stream(stream_provider, stream_code)),
            expected
        );
    }
}
