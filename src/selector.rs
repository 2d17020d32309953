//! Minimal CSS selector matching for the in-memory document.
//!
//! Supports selector lists of compound selectors built from a tag name or
//! `*`, `#id`, `.class`, `[attr]` and `[attr=value]`. Combinators are not
//! supported and make the selector invalid.

/// Anything a selector can be matched against.
pub trait SelectorSubject {
    fn tag_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// A parsed selector list.
///
/// ```rust
/// use scrimr_core::selector::Selector;
///
/// assert!(Selector::parse("span.title, [data-scrimr]").is_some());
/// assert!(Selector::parse("div > span").is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Parse a selector list; `None` when any part is invalid.
    pub fn parse(input: &str) -> Option<Self> {
        let alternatives = input
            .split(',')
            .map(|part| Compound::parse(part.trim()))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { alternatives })
    }

    /// True when any alternative matches `subject`.
    pub fn matches<S: SelectorSubject + ?Sized>(&self, subject: &S) -> bool {
        self.alternatives.iter().any(|compound| compound.matches(subject))
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

fn simple_end(s: &str) -> usize {
    s.find(['#', '.', '[']).unwrap_or(s.len())
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

impl Compound {
    fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let mut compound = Compound::default();

        let tag_end = simple_end(s);
        let tag = &s[..tag_end];
        if !tag.is_empty() && tag != "*" {
            if !is_ident(tag) {
                return None;
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }

        let mut rest = &s[tag_end..];
        while let Some(first) = rest.chars().next() {
            match first {
                '#' | '.' => {
                    let body = &rest[1..];
                    let end = simple_end(body);
                    let name = &body[..end];
                    if !is_ident(name) {
                        return None;
                    }
                    if first == '#' {
                        compound.ids.push(name.to_owned());
                    } else {
                        compound.classes.push(name.to_owned());
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let close = rest.find(']')?;
                    let inner = rest[1..close].trim();
                    rest = &rest[close + 1..];
                    let (name, value) = match inner.split_once('=') {
                        Some((name, value)) => (name.trim(), Some(unquote(value).to_owned())),
                        None => (inner, None),
                    };
                    if !is_ident(name) {
                        return None;
                    }
                    compound.attributes.push((name.to_ascii_lowercase(), value));
                }
                _ => return None,
            }
        }
        Some(compound)
    }

    fn matches<S: SelectorSubject + ?Sized>(&self, subject: &S) -> bool {
        if let Some(tag) = &self.tag {
            if !subject.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if self.ids.iter().any(|id| subject.attribute("id") != Some(id.as_str())) {
            return false;
        }
        let classes = subject.attribute("class").unwrap_or("");
        if !self.classes.iter().all(|class| classes.split_whitespace().any(|c| c == class)) {
            return false;
        }
        self.attributes.iter().all(|(name, value)| match (subject.attribute(name), value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Subject {
        tag: &'static str,
        attributes: Vec<(&'static str, &'static str)>,
    }

    impl SelectorSubject for Subject {
        fn tag_name(&self) -> &str {
            self.tag
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
        }
    }

    fn span() -> Subject {
        Subject {
            tag: "span",
            attributes: vec![("id", "hero"), ("class", "title big"), ("data-scrimr", "")],
        }
    }

    #[test]
    fn test_simple_selectors() {
        let subject = span();
        for selector in ["span", "SPAN", "*", "#hero", ".title", ".big.title", "[data-scrimr]", "span#hero.big"] {
            assert!(Selector::parse(selector).unwrap().matches(&subject), "{selector}");
        }
        for selector in ["div", "#other", ".small", "[data-other]", "span.title.small"] {
            assert!(!Selector::parse(selector).unwrap().matches(&subject), "{selector}");
        }
    }

    #[test]
    fn test_attribute_values() {
        let subject = span();
        assert!(Selector::parse("[data-scrimr=\"\"]").unwrap().matches(&subject));
        assert!(Selector::parse("[class='title big']").unwrap().matches(&subject));
        assert!(!Selector::parse("[id=villain]").unwrap().matches(&subject));
    }

    #[test]
    fn test_selector_list() {
        let subject = span();
        assert!(Selector::parse("div, .title").unwrap().matches(&subject));
        assert!(!Selector::parse("div, p").unwrap().matches(&subject));
    }

    #[test]
    fn test_invalid_selectors() {
        for selector in ["", "div span", "div > p", "[unclosed", "#", ".a..b", "a,"] {
            assert!(Selector::parse(selector).is_none(), "{selector}");
        }
    }
}
