//! A single traversal contract over the HTML and XML trees the parsers read.
//!
//! Playlist and favorites pages are HTML (`scraper`), the comments feed is
//! XML (`xmltree`). Both are walked through [`DocElement`] so every parser
//! asks the same questions: what is this element called, what does this
//! attribute say, what text is inside, which descendants match.
//!
//! Selectors mean different things per tree: a CSS selector for HTML, a
//! `/`-separated path of child element names for XML. XML lookups are always
//! explicit paths, so an element literally named `parent` is just another
//! path segment.

use scraper::{ElementRef, Selector};
use xmltree::{Element, XMLNode};

pub trait DocElement<'a>: Copy + Sized {
    /// Local element name (`"tr"`, `"comment"`, ...).
    fn name(&self) -> &'a str;

    fn attr(&self, name: &str) -> Option<&'a str>;

    /// All descendant text concatenated in document order.
    fn text_content(&self) -> String;

    /// Direct element children in document order.
    fn child_elements(&self) -> Vec<Self>;

    /// All elements matching `selector` below this one.
    fn find_all(&self, selector: &str) -> Result<Vec<Self>, String>;

    fn find_first(&self, selector: &str) -> Result<Option<Self>, String> {
        Ok(self.find_all(selector)?.into_iter().next())
    }

    /// Text with runs of whitespace collapsed to single spaces and trimmed.
    fn normalized_text(&self) -> String {
        self.text_content()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> DocElement<'a> for ElementRef<'a> {
    fn name(&self) -> &'a str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn text_content(&self) -> String {
        ElementRef::text(self).collect::<String>()
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn find_all(&self, selector: &str) -> Result<Vec<Self>, String> {
        let parsed = css(selector)?;
        Ok(ElementRef::select(self, &parsed).collect())
    }
}

impl<'a> DocElement<'a> for &'a Element {
    fn name(&self) -> &'a str {
        let elem: &'a Element = *self;
        &elem.name
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        let elem: &'a Element = *self;
        elem.attributes.get(name).map(String::as_str)
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        collect_xml_text(self, &mut out);
        out
    }

    fn child_elements(&self) -> Vec<Self> {
        let elem: &'a Element = *self;
        elem.children
            .iter()
            .filter_map(|node| match node {
                XMLNode::Element(elem) => Some(elem),
                _ => None,
            })
            .collect()
    }

    fn find_all(&self, selector: &str) -> Result<Vec<Self>, String> {
        let mut current: Vec<&'a Element> = vec![*self];
        for segment in selector.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|elem| elem.child_elements())
                .filter(|child| child.name == segment)
                .collect();
        }
        Ok(current)
    }
}

/// Compile a CSS selector, reporting failures as text for the caller's
/// parse error.
pub fn css(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("invalid selector '{selector}': {e:?}"))
}

fn collect_xml_text(elem: &Element, out: &mut String) {
    for node in &elem.children {
        match node {
            XMLNode::Element(child) => collect_xml_text(child, out),
            XMLNode::Text(text) | XMLNode::CData(text) => out.push_str(text),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_html_traversal() {
        let html = Html::parse_document(
            r#"<table id="t"><tr class="row"><td> a </td><td>b <i>c</i></td></tr></table>"#,
        );
        let root = html.root_element();
        let rows = root.find_all("tr.row").unwrap();
        assert_eq!(rows.len(), 1);

        let cells = DocElement::child_elements(&rows[0]);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].name(), "td");
        assert_eq!(cells[1].normalized_text(), "b c");
        assert_eq!(root.find_first("#t").unwrap().unwrap().attr("id"), Some("t"));
    }

    #[test]
    fn test_invalid_css_is_reported() {
        let html = Html::parse_document("<p></p>");
        assert!(html.root_element().find_all("td[[").is_err());
    }

    #[test]
    fn test_xml_paths() {
        let xml = r#"<root>
            <comment><parent><id>7</id></parent><id>1</id></comment>
            <comment><id>2</id></comment>
        </root>"#;
        let root = Element::parse(xml.as_bytes()).unwrap();
        let root = &root;

        let ids = root.find_all("comment/id").unwrap();
        let ids: Vec<_> = ids.iter().map(|e| e.normalized_text()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let parent_ids = root.find_all("comment/parent/id").unwrap();
        assert_eq!(parent_ids.len(), 1);
        assert_eq!(parent_ids[0].text_content(), "7");

        assert!(root.find_first("missing/path").unwrap().is_none());
    }
}
