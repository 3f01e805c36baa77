//! Resource slug normalization.

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 80;

/// Normalize free text into a URL-safe resource slug.
///
/// Lower-cases, collapses every run of characters outside `[a-z0-9]` into a
/// single hyphen, strips leading and trailing hyphens and truncates to
/// [`MAX_SLUG_LEN`]. The output is pure ASCII and the function is idempotent.
pub fn normalize_resource_slug(input: &str) -> String {
    let lowered = input.trim().to_lowercase();

    let mut result = String::with_capacity(lowered.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            result.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    result.truncate(MAX_SLUG_LEN);

    // Truncation can expose a hyphen at the new end.
    while result.ends_with('-') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_basic() {
        assert_eq!(normalize_resource_slug("Annual Report 2024"), "annual-report-2024");
    }

    #[test]
    fn slug_collapses_symbol_runs() {
        assert_eq!(
            normalize_resource_slug("Press: Release -- (Final!)"),
            "press-release-final"
        );
    }

    #[test]
    fn slug_strips_edges() {
        assert_eq!(normalize_resource_slug("  --Hello World--  "), "hello-world");
        assert_eq!(normalize_resource_slug("!!!"), "");
        assert_eq!(normalize_resource_slug(""), "");
    }

    #[test]
    fn slug_replaces_non_ascii() {
        assert_eq!(normalize_resource_slug("Café Über"), "caf-ber");
    }

    #[test]
    fn slug_truncates_without_trailing_hyphen() {
        let input = format!("{} tail", "a".repeat(79));
        let slug = normalize_resource_slug(&input);
        assert_eq!(slug.len(), 79);
        assert!(!slug.ends_with('-'));

        let long = "word ".repeat(40);
        assert!(normalize_resource_slug(&long).len() <= MAX_SLUG_LEN);
    }

    #[test]
    fn slug_is_idempotent() {
        let samples = [
            "Annual Report 2024",
            "  --Hello World--  ",
            "Café Über",
            "a/b\\c?d=e&f",
            "ALLCAPS_and_snake_case",
            "",
        ];
        for sample in samples {
            let once = normalize_resource_slug(sample);
            assert_eq!(normalize_resource_slug(&once), once, "input: {sample}");
        }
        let long = format!("{} tail", "a".repeat(79));
        let once = normalize_resource_slug(&long);
        assert_eq!(normalize_resource_slug(&once), once);
    }
}
