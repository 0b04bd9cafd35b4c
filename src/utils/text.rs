// src/utils/text.rs

use validator::ValidationError;

/// Text is stored exactly as submitted; escaping is left to whatever renders it.
/// This rule only rejects values made of whitespace alone.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Collapse a whitespace-only optional field to `None`, keeping any other value verbatim.
pub fn blank_to_none(input: Option<String>) -> Option<String> {
    input.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_blank() {
        assert!(not_blank("").is_err());
        assert!(not_blank(" \t\n").is_err());
        assert!(not_blank("<script>x</script>").is_ok());
        assert!(not_blank("&").is_ok());
    }

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(blank_to_none(Some("   ".into())), None);
        assert_eq!(blank_to_none(None), None);
        assert_eq!(
            blank_to_none(Some(" Tom & Jerry ".into())),
            Some(" Tom & Jerry ".to_string())
        );
    }
}
