/// Bounded context assembly for prompt construction
use super::SearchResult;

/// Returned when there are no results to assemble
pub const NO_CONTEXT_MESSAGE: &str = "No relevant information found in the knowledge base.";

/// Separator between assembled blocks
const SEPARATOR: &str = "\n\n---\n\n";
/// Fixed per-block accounting buffer (covers separators and the
/// header/content newline)
const LENGTH_BUFFER: usize = 10;
/// Minimum content budget worth emitting a source header for
const MIN_CONTENT_SPACE: usize = 100;
/// Appended to truncated content
const TRUNCATION_MARKER: &str = "...";

/// Concatenate ranked results into a single bounded string
///
/// Greedy, order-preserving, single pass. Each included result contributes
/// a `Source: {title} ({subject}, {type})` header followed by its content,
/// truncated to the remaining budget. Assembly stops at the first result
/// whose remaining budget is too small for a useful snippet, and once the
/// accumulated length reaches `max_length`.
///
/// Lengths are counted in characters. `max_length` is a soft ceiling: an
/// already-started block may overshoot it by the truncation marker.
pub fn assemble_context(results: &[SearchResult], max_length: usize) -> String {
    if results.is_empty() {
        return NO_CONTEXT_MESSAGE.to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut current_length = 0usize;

    for result in results {
        let source_info = format!(
            "Source: {} ({}, {})",
            result.metadata.title, result.metadata.subject, result.metadata.kind
        );
        let header_len = source_info.chars().count();

        let available =
            max_length as i64 - current_length as i64 - header_len as i64 - LENGTH_BUFFER as i64;
        if available <= MIN_CONTENT_SPACE as i64 {
            break;
        }
        let available = available as usize;

        let content_len = result.content.chars().count();
        let content = if content_len > available {
            let truncated: String = result.content.chars().take(available).collect();
            format!("{}{}", truncated, TRUNCATION_MARKER)
        } else {
            result.content.clone()
        };

        current_length += header_len + content.chars().count() + LENGTH_BUFFER;
        parts.push(format!("{}\n{}", source_info, content));

        if current_length >= max_length {
            break;
        }
    }

    parts.join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{DocMetadata, DocumentKind, Subject};

    fn result(title: &str, content: &str) -> SearchResult {
        SearchResult {
            content: content.to_string(),
            metadata: DocMetadata {
                subject: Subject::Math,
                topic: Some("algebra".to_string()),
                subtopic: None,
                kind: DocumentKind::TopicNotes,
                title: title.to_string(),
                file_path: "kb/math/algebra/algebra-study-notes.md".to_string(),
            },
            similarity_score: 0.9,
        }
    }

    fn header_len(title: &str) -> usize {
        format!("Source: {} (math, topic_notes)", title).chars().count()
    }

    #[test]
    fn test_empty_results_sentinel() {
        assert_eq!(assemble_context(&[], 500), NO_CONTEXT_MESSAGE);
    }

    #[test]
    fn test_single_result_fits() {
        let results = vec![result("Algebra Study Notes", &"x".repeat(200))];
        let context = assemble_context(&results, 2000);

        assert!(context.starts_with("Source: Algebra Study Notes (math, topic_notes)\n"));
        assert!(context.ends_with(&"x".repeat(200)));
        assert!(!context.contains("..."));
    }

    #[test]
    fn test_overlong_content_truncated_with_marker() {
        let results = vec![result("Algebra Study Notes", &"x".repeat(5000))];
        let max_length = 500;
        let context = assemble_context(&results, max_length);

        assert!(context.ends_with("..."));
        // Truncated to exactly the available budget plus the marker
        let available = max_length - header_len("Algebra Study Notes") - 10;
        let content = context.split('\n').nth(1).unwrap();
        assert_eq!(content.chars().count(), available + 3);
    }

    #[test]
    fn test_exactly_fitting_content_not_truncated() {
        let title = "Algebra Study Notes";
        let max_length = 500;
        let available = max_length - header_len(title) - 10;

        let results = vec![result(title, &"y".repeat(available))];
        let context = assemble_context(&results, max_length);

        assert!(!context.contains("..."));
        assert!(context.ends_with(&"y".repeat(available)));
    }

    #[test]
    fn test_output_bounded_by_max_length_plus_slack() {
        let results: Vec<SearchResult> = (0..10)
            .map(|i| result(&format!("Doc {}", i), &"z".repeat(3000)))
            .collect();

        for max_length in [200, 500, 1000, 2000, 10_000] {
            let context = assemble_context(&results, max_length);
            assert!(
                context.chars().count() <= max_length + 3,
                "context of {} chars exceeds budget {}",
                context.chars().count(),
                max_length
            );
        }
    }

    #[test]
    fn test_no_block_started_after_budget_exhausted() {
        // First result consumes the whole budget; second must not appear
        let results = vec![
            result("First", &"a".repeat(3000)),
            result("Second", &"b".repeat(3000)),
        ];
        let context = assemble_context(&results, 400);

        assert_eq!(context.matches("Source:").count(), 1);
        assert!(!context.contains("Second"));
    }

    #[test]
    fn test_multiple_results_joined_with_separator() {
        let results = vec![
            result("First", &"a".repeat(150)),
            result("Second", &"b".repeat(150)),
        ];
        let context = assemble_context(&results, 2000);

        assert_eq!(context.matches("Source:").count(), 2);
        assert!(context.contains("\n\n---\n\n"));
    }

    #[test]
    fn test_tiny_budget_yields_empty_string() {
        // Budget too small for any header + useful snippet: no sentinel,
        // no blocks
        let results = vec![result("First", &"a".repeat(150))];
        let context = assemble_context(&results, 50);
        assert_eq!(context, "");
    }
}
