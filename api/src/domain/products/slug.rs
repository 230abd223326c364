/// Lowercase ASCII slug: runs of non-alphanumerics collapse into one `-`,
/// no leading or trailing dashes. Falls back to `item` when nothing is left.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.len() > 80 {
        out.truncate(80);
        while out.ends_with('-') {
            out.pop();
        }
    }
    if out.is_empty() {
        "item".to_string()
    } else {
        out
    }
}

pub fn with_suffix(base: &str, n: u32) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Kaos Polos -- Hitam!! "), "kaos-polos-hitam");
        assert_eq!(slugify("Café & Co."), "caf-co");
        assert_eq!(slugify("***"), "item");
    }

    #[test]
    fn suffix_only_after_first_collision() {
        assert_eq!(with_suffix("kaos", 0), "kaos");
        assert_eq!(with_suffix("kaos", 2), "kaos-2");
    }
}
