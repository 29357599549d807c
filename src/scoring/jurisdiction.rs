use std::collections::BTreeSet;

/// Jurisdiction codes served by a firm, tokenized from a delimited field.
///
/// Tokens are maximal runs of Unicode alphanumerics and `_`, so any other
/// character ("," ";" "|" "/" "-" whitespace) acts as a separator. Membership
/// is exact and case-sensitive: "ME" is in "ME, NH" but not in "MAINE".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JurisdictionSet {
    codes: BTreeSet<String>,
}

fn is_code_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl JurisdictionSet {
    /// Tokenize a jurisdictions field. Returns None when no code is present.
    pub fn parse(field: &str) -> Option<Self> {
        let codes: BTreeSet<String> = field
            .split(|c: char| !is_code_char(c))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        if codes.is_empty() {
            None
        } else {
            Some(Self { codes })
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        let code = code.trim();
        !code.is_empty() && self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated() {
        let set = JurisdictionSet::parse("TX, OK, NM").unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains("TX"));
        assert!(set.contains("NM"));
        assert!(!set.contains("CA"));
    }

    #[test]
    fn test_no_substring_match() {
        let set = JurisdictionSet::parse("MAINE").unwrap();
        assert!(!set.contains("ME"));
        assert!(set.contains("MAINE"));
    }

    #[test]
    fn test_matches_word_boundary_delimiters() {
        let set = JurisdictionSet::parse("ME-NH;VT|MA/CT").unwrap();
        for code in ["ME", "NH", "VT", "MA", "CT"] {
            assert!(set.contains(code), "missing {}", code);
        }
    }

    #[test]
    fn test_accented_letters_join_tokens() {
        let set = JurisdictionSet::parse("ÉME").unwrap();
        assert!(!set.contains("ME"));
        assert!(set.contains("ÉME"));

        let set = JurisdictionSet::parse("ÉME, NH").unwrap();
        assert!(set.contains("NH"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_list_literal_field() {
        let set = JurisdictionSet::parse("['TX', 'OK']").unwrap();
        assert!(set.contains("TX"));
        assert!(set.contains("OK"));
    }

    #[test]
    fn test_case_sensitive() {
        let set = JurisdictionSet::parse("tx, ok").unwrap();
        assert!(!set.contains("TX"));
    }

    #[test]
    fn test_query_is_trimmed() {
        let set = JurisdictionSet::parse("TX").unwrap();
        assert!(set.contains(" TX "));
        assert!(!set.contains("   "));
    }

    #[test]
    fn test_unparseable_field() {
        assert!(JurisdictionSet::parse("").is_none());
        assert!(JurisdictionSet::parse(" , ;").is_none());
    }
}
