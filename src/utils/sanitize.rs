use ammonia::Builder;

/// Strip all HTML from user-supplied text.
///
/// Report descriptions and comments are plain text; anything that looks
/// like markup is removed before the value is persisted.
pub fn sanitize_text(input: &str) -> String {
    Builder::empty().clean(input).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_text("overflowing bins near the park"), "overflowing bins near the park");
    }

    #[test]
    fn script_tags_are_stripped() {
        let out = sanitize_text("<script>alert('x')</script>hello");
        assert!(!out.contains("<script>"));
        assert!(out.contains("hello"));
    }

    #[test]
    fn nested_markup_is_stripped() {
        let out = sanitize_text("<div><img src=x onerror=alert(1)>dump site</div>");
        assert!(!out.contains('<'));
        assert!(out.contains("dump site"));
    }
}
