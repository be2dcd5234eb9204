//! Typed structural queries and the text rules applied to what they match.
//!
//! A [`FieldQuery`] only knows how to pull raw string fragments out of a
//! listing node. Turning those fragments into a field value is done by the
//! plain functions in this module, which never touch the HTML tree.

use scraper::{ElementRef, Selector};

const NBSP: char = '\u{a0}';

#[derive(Debug, thiserror::Error)]
#[error("Invalid selector '{css}': {reason}")]
pub struct SelectorError {
    css: String,
    reason: String,
}

/// What a query collects from each matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Every descendant text node.
    Text,
    /// Only the text nodes that are direct children of the match.
    OwnText,
    /// The value of an attribute.
    Attr(&'static str),
}

#[derive(Debug)]
pub struct FieldQuery {
    selector: Selector,
    capture: Capture,
}

impl FieldQuery {
    pub fn new(css: &str, capture: Capture) -> Result<Self, SelectorError> {
        let selector = Selector::parse(css).map_err(|e| SelectorError {
            css: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { selector, capture })
    }

    /// Raw fragments captured under `node`, in document order. An empty
    /// vector means the query matched nothing.
    ///
    /// With [`Capture::Text`] a match nested inside an earlier match adds
    /// nothing, so every text node is collected at most once.
    pub fn fragments(&self, node: ElementRef) -> Vec<String> {
        let mut out = Vec::new();
        let mut matched = Vec::new();
        for element in node.select(&self.selector) {
            matched.push(element.id());
            match self.capture {
                Capture::Text => {
                    if element.ancestors().any(|a| matched.contains(&a.id())) {
                        continue;
                    }
                    out.extend(element.text().map(str::to_string))
                }
                Capture::OwnText => out.extend(
                    element
                        .children()
                        .filter_map(|child| child.value().as_text())
                        .map(|text| text.to_string()),
                ),
                Capture::Attr(name) => {
                    if let Some(value) = element.value().attr(name) {
                        out.push(value.to_string());
                    }
                }
            }
        }
        out
    }
}

/// `None` when nothing matched, otherwise the concatenation, trimmed.
pub fn joined(fragments: &[String]) -> Option<String> {
    if fragments.is_empty() {
        return None;
    }
    Some(fragments.concat().trim().to_string())
}

/// Each fragment trimmed, blanks dropped, comma-joined.
pub fn join_categories(fragments: &[String]) -> Option<String> {
    if fragments.is_empty() {
        return None;
    }
    Some(
        fragments
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Drops the `".\u{a0}"` marker that follows the position number.
pub fn clean_rank(fragments: &[String]) -> Option<String> {
    if fragments.is_empty() {
        return None;
    }
    let rank = fragments.concat().replace(&format!(".{NBSP}"), "");
    Some(rank.trim().to_string())
}

pub fn clean_rating(fragments: &[String]) -> Option<String> {
    if fragments.is_empty() {
        return None;
    }
    let rating = fragments.concat().replace(['(', ')'], "");
    Some(rating.trim().to_string())
}

/// Drops a trailing `",\u{a0}"` left over from the address markup.
pub fn clean_locality(fragments: &[String]) -> Option<String> {
    if fragments.is_empty() {
        return None;
    }
    let text = fragments.concat();
    let text = text.trim_end_matches(|c: char| c.is_ascii_whitespace());
    let text = text.strip_suffix(&format!(",{NBSP}")).unwrap_or(text);
    Some(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn frags(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_joined_is_none_without_matches() {
        assert_eq!(joined(&[]), None);
        assert_eq!(clean_rank(&[]), None);
        assert_eq!(clean_rating(&[]), None);
        assert_eq!(clean_locality(&[]), None);
        assert_eq!(join_categories(&[]), None);
    }

    #[test]
    fn test_joined_concatenates_and_trims() {
        let value = joined(&frags(&["  Tony's ", "Pizza  \n"]));
        assert_eq!(value.as_deref(), Some("Tony's Pizza"));
    }

    #[test]
    fn test_join_categories_trims_each_fragment() {
        let value = join_categories(&frags(&["\n  ", "Pizza", " ", " Italian Restaurants ", "\n"]));
        assert_eq!(value.as_deref(), Some("Pizza,Italian Restaurants"));
    }

    #[test]
    fn test_clean_rank_strips_marker() {
        assert_eq!(clean_rank(&frags(&["12.\u{a0}"])).as_deref(), Some("12"));
        assert_eq!(clean_rank(&frags(&[" 3"])).as_deref(), Some("3"));
    }

    #[test]
    fn test_clean_rating_strips_parentheses() {
        assert_eq!(clean_rating(&frags(&["(", "27", ")"])).as_deref(), Some("27"));
        assert_eq!(clean_rating(&frags(&[" (4) "])).as_deref(), Some("4"));
    }

    #[test]
    fn test_clean_locality_strips_trailing_artifact() {
        assert_eq!(
            clean_locality(&frags(&["Springfield, IL 62704,\u{a0}"])).as_deref(),
            Some("Springfield, IL 62704")
        );
        assert_eq!(
            clean_locality(&frags(&["Springfield,\u{a0} IL 62704"])).as_deref(),
            Some("Springfield,\u{a0} IL 62704")
        );
    }

    #[test]
    fn test_query_captures() {
        let html = Html::parse_fragment(
            r#"<div id="root">
                <h2 class="n">7.&nbsp;<a class="business-name" href="/biz/7"><span>Joe's</span> Diner</a></h2>
            </div>"#,
        );
        let root = html.root_element();

        let own = FieldQuery::new("h2.n", Capture::OwnText).unwrap();
        assert_eq!(own.fragments(root), vec!["7.\u{a0}".to_string()]);

        let text = FieldQuery::new("a.business-name", Capture::Text).unwrap();
        assert_eq!(joined(&text.fragments(root)).as_deref(), Some("Joe's Diner"));

        let href = FieldQuery::new("a.business-name", Capture::Attr("href")).unwrap();
        assert_eq!(href.fragments(root), vec!["/biz/7".to_string()]);

        let missing = FieldQuery::new("div.phones", Capture::Text).unwrap();
        assert!(missing.fragments(root).is_empty());
    }

    #[test]
    fn test_nested_text_matches_are_collected_once() {
        let html = Html::parse_fragment(
            r#"<div class="result-rating four"><span class="count"><span>(27)</span></span></div>
               <div class="categories"><span>Pizza<span>Italian</span></span><span>Caterers</span></div>"#,
        );
        let root = html.root_element();

        let rating = FieldQuery::new("div.result-rating span", Capture::Text).unwrap();
        assert_eq!(rating.fragments(root), vec!["(27)".to_string()]);
        assert_eq!(clean_rating(&rating.fragments(root)).as_deref(), Some("27"));

        let categories = FieldQuery::new("div.categories span", Capture::Text).unwrap();
        assert_eq!(
            join_categories(&categories.fragments(root)).as_deref(),
            Some("Pizza,Italian,Caterers")
        );
    }

    #[test]
    fn test_nested_attribute_matches_are_all_kept() {
        let html = Html::parse_fragment(
            r#"<div data-id="outer"><div data-id="inner"></div></div>"#,
        );
        let ids = FieldQuery::new("div[data-id]", Capture::Attr("data-id")).unwrap();
        assert_eq!(
            ids.fragments(html.root_element()),
            vec!["outer".to_string(), "inner".to_string()]
        );
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let err = FieldQuery::new("div[", Capture::Text).unwrap_err();
        assert!(err.to_string().contains("div["));
    }
}
