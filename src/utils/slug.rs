const WORDS_PER_MINUTE: usize = 200;

/// Builds a URL slug from a title: lower-cased, punctuation dropped,
/// whitespace / underscore / hyphen runs collapsed into a single hyphen
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            pending_separator = true;
        }
        // anything else is dropped without breaking the word
    }

    slug
}

/// Letters, digits and hyphens only
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Estimated reading time in minutes, never below one
pub fn reading_time(content: &str) -> i32 {
    let words = content.split_whitespace().count().max(1);
    words.div_ceil(WORDS_PER_MINUTE) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(generate_slug("  Raising   African_Children -- 2024 "), "raising-african-children-2024");
        assert_eq!(generate_slug("What's new?"), "whats-new");
        assert_eq!(generate_slug("--Edge--"), "edge");
    }

    #[test]
    fn test_generate_slug_can_be_empty() {
        assert_eq!(generate_slug("!!!"), "");
        assert_eq!(generate_slug("Éducation"), "ducation");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("hello-world-2"));
        assert!(is_valid_slug("Hello-World"));
        assert!(!is_valid_slug("hello world"));
        assert!(!is_valid_slug("hello_world"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time("one two three"), 1);
        assert_eq!(reading_time(&"word ".repeat(200)), 1);
        assert_eq!(reading_time(&"word ".repeat(201)), 2);
        assert_eq!(reading_time("   "), 1);
    }
}
