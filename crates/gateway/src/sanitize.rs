//! Output sanitization — applied to every successful agent reply before it
//! leaves the process.
//!
//! The sanitizer is total: it is a pure function over the reply's text
//! fields and cannot fail. It strips script/style blocks with their content,
//! any remaining markup tags, and non-printable control characters.

use taskpilot_agent::ChatReply;

/// Sanitize an agent reply's user-visible text fields.
pub fn sanitize_reply(mut reply: ChatReply) -> ChatReply {
    reply.reply = sanitize_text(&reply.reply);
    for action in &mut reply.actions {
        action.detail = sanitize_text(&action.detail);
    }
    reply
}

/// Strip unsafe content from a single text field.
pub fn sanitize_text(input: &str) -> String {
    let without_blocks = strip_tag_blocks(input, &["script", "style"]);
    let without_tags = strip_tags(&without_blocks);
    without_tags
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Remove `<tag ...>...</tag>` blocks (content included), case-insensitive.
/// An unterminated block is stripped to the end of the input.
fn strip_tag_blocks(input: &str, tags: &[&str]) -> String {
    let mut out = input.to_string();
    for tag in tags {
        let open = format!("<{tag}");
        let close = format!("</{tag}>");
        while let Some(start) = find_ascii_ci(&out, &open) {
            let end = find_ascii_ci(&out[start..], &close)
                .map(|i| start + i + close.len())
                .unwrap_or(out.len());
            out.replace_range(start..end, "");
        }
    }
    out
}

/// ASCII case-insensitive substring search. Returns a byte offset.
/// Needles are ASCII tag names, so matches always land on char boundaries.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

/// Remove any remaining `<...>` markup tags, keeping surrounding text.
/// A bare `<` with no closing `>` drops everything after it.
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_agent::{ActionSummary, ChatReply};

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_text("Added \"buy milk\" to your list."), "Added \"buy milk\" to your list.");
    }

    #[test]
    fn script_blocks_removed_with_content() {
        let out = sanitize_text("Done!<script>alert('x')</script> Next?");
        assert_eq!(out, "Done! Next?");
    }

    #[test]
    fn script_blocks_removed_case_insensitively() {
        let out = sanitize_text("a<SCRIPT src=\"evil\">b</SCRIPT>c");
        assert_eq!(out, "ac");
    }

    #[test]
    fn unterminated_script_block_stripped_to_end() {
        let out = sanitize_text("safe<script>alert('x')");
        assert_eq!(out, "safe");
    }

    #[test]
    fn markup_tags_removed_text_kept() {
        let out = sanitize_text("<b>bold</b> and <a href=\"x\">link</a>");
        assert_eq!(out, "bold and link");
    }

    #[test]
    fn control_characters_removed() {
        let out = sanitize_text("line1\u{0007}\u{001b}[31m\nline2\tok");
        assert_eq!(out, "line1[31m\nline2\tok");
    }

    #[test]
    fn action_details_sanitized_too() {
        let reply = ChatReply {
            success: true,
            session_id: "s1".into(),
            reply: "ok".into(),
            actions: vec![ActionSummary {
                tool: "add_todo".into(),
                success: true,
                detail: "Created <script>x</script>todo".into(),
            }],
        };
        let sanitized = sanitize_reply(reply);
        assert_eq!(sanitized.actions[0].detail, "Created todo");
    }
}
