//! "Stuff" prompt builder: every retrieved chunk inlined before the question.

use rag_store::RagHit;

/// Instruction placed before the context block.
pub const STUFF_INSTRUCTION: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Builds the prompt with a character budget for the context.
///
/// Chunks are trimmed, kept in rank order and separated by blank lines; the
/// chunk that crosses `max_ctx_chars` is cut on a char boundary and the rest
/// are dropped.
///
/// # Example
/// ```
/// # use contextor::prompt::build_stuff_prompt;
/// let prompt = build_stuff_prompt("How to X?", &[], 2000);
/// assert!(prompt.ends_with("Question: How to X?\nHelpful Answer:"));
/// ```
pub fn build_stuff_prompt(question: &str, hits: &[RagHit], max_ctx_chars: usize) -> String {
    let mut context = String::new();
    let mut budget = max_ctx_chars;

    for h in hits {
        let text = h.chunk.text.trim();
        if text.is_empty() {
            continue;
        }
        let sep = if context.is_empty() { 0 } else { 2 };
        if budget <= sep {
            break;
        }
        if sep > 0 {
            context.push_str("\n\n");
            budget -= sep;
        }

        let len = text.chars().count();
        if len > budget {
            context.push_str(safe_truncate(text, budget));
            break;
        }
        context.push_str(text);
        budget -= len;
    }

    format!(
        "{STUFF_INSTRUCTION}\n\n{context}\n\nQuestion: {}\nHelpful Answer:",
        question.trim()
    )
}

/// First `max_chars` characters of `s`.
fn safe_truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_store::Chunk;

    fn hit(ordinal: usize, text: &str) -> RagHit {
        RagHit {
            score: 1.0 - ordinal as f32 / 10.0,
            chunk: Chunk {
                ordinal,
                start: 0,
                text: text.into(),
            },
        }
    }

    #[test]
    fn layout_matches_stuff_chain() {
        let p = build_stuff_prompt(
            "  What is it? ",
            &[hit(0, " first chunk\n"), hit(1, "second chunk")],
            1000,
        );
        assert_eq!(
            p,
            format!(
                "{STUFF_INSTRUCTION}\n\nfirst chunk\n\nsecond chunk\n\nQuestion: What is it?\nHelpful Answer:"
            )
        );
    }

    #[test]
    fn budget_cuts_in_rank_order() {
        let p = build_stuff_prompt("q", &[hit(0, "aaaaaaaa"), hit(1, "bbbbbbbb")], 12);
        assert!(p.contains("aaaaaaaa\n\nbb\n\nQuestion"));
        assert!(!p.contains("bbb"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let p = build_stuff_prompt("q", &[hit(0, "ñññññ")], 3);
        assert!(p.contains("\n\nñññ\n\nQuestion"));
    }
}
