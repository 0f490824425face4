use std::borrow::Borrow;
use std::fmt;

use smol_str::SmolStr;

/// A simple YASDL identifier, normalized to lowercase at construction.
///
/// YASDL names are case-insensitive; the compiler stores the lowercase form
/// everywhere and keeps the original casing separately on AST nodes for
/// error messages only.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(SmolStr);

impl Name {
    pub fn new(text: &str) -> Self {
        if text.bytes().any(|b| b.is_ascii_uppercase()) {
            Self(SmolStr::new(text.to_ascii_lowercase()))
        } else {
            Self(SmolStr::new(text))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_lowercases() {
        assert_eq!(Name::new("Invoice").as_str(), "invoice");
        assert_eq!(Name::new("ALL_CAPS").as_str(), "all_caps");
    }

    #[test]
    fn test_name_borrow_allows_str_lookup() {
        use std::collections::HashMap;
        let mut map: HashMap<Name, u32> = HashMap::new();
        map.insert(Name::new("Code"), 1);
        assert_eq!(map.get("code"), Some(&1));
    }
}
