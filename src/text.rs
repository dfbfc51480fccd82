/// Trims an optional string and drops it when nothing is left.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// "First Last" from whichever name parts are set, else the email.
pub fn display_name(first: Option<&str>, last: Option<&str>, email: &str) -> String {
    let name = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        email.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_drops_blank() {
        assert_eq!(non_blank(Some("  Eliot ".into())), Some("Eliot".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(display_name(Some("John"), Some("Harvard"), "jh@x.edu"), "John Harvard");
        assert_eq!(display_name(Some("John"), None, "jh@x.edu"), "John");
        assert_eq!(display_name(None, Some(" "), "jh@x.edu"), "jh@x.edu");
        assert_eq!(display_name(None, None, "jh@x.edu"), "jh@x.edu");
    }
}
