//! Translate catalog [`Locator`]s into WebDriver queries.
use autoapply_common::Locator;

/// An owned WebDriver query; borrow it as a `fantoccini::Locator` per lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Css(String),
    XPath(String),
}

impl Query {
    pub fn as_fantoccini(&self) -> fantoccini::Locator<'_> {
        match self {
            Query::Css(s) => fantoccini::Locator::Css(s),
            Query::XPath(s) => fantoccini::Locator::XPath(s),
        }
    }
}

impl From<&Locator> for Query {
    fn from(locator: &Locator) -> Self {
        match locator {
            Locator::Css(s) => Query::Css(s.clone()),
            Locator::Xpath(s) => Query::XPath(s.clone()),
            Locator::Text(t) => Query::XPath(clickable_text_xpath(t)),
        }
    }
}

/// Buttons, links and ARIA buttons whose normalized text contains `text`.
pub fn clickable_text_xpath(text: &str) -> String {
    format!(
        "//*[self::button or self::a or @role='button'][contains(normalize-space(.), {})]",
        xpath_literal(text)
    )
}

/// Quote `s` as an XPath 1.0 string literal, using `concat()` when it holds
/// both quote kinds.
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
