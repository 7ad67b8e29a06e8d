//! Harvesting of hidden form fields used as anti-forgery tokens.
//!
//! wfmu.org guards every write behind `<input>` values that must be echoed
//! back verbatim on the next request. [`extract_input_values`] only reports
//! what it found; deciding that a missing or blank field is fatal is left to
//! [`TokenBag::require`], called by the relay that needed it.

use crate::error::{RelayStage, WfmuError};
use crate::Result;
use scraper::{ElementRef, Html};
use std::collections::HashMap;

/// Name of the rolling session token carried by most wfmu.org forms.
pub const KFID_FIELD: &str = "__kfid";

/// Field values harvested from one document.
///
/// Produced per response and consumed straight away; never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBag(HashMap<String, String>);

impl TokenBag {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of `name`, or a [`WfmuError::MissingToken`] naming the relay
    /// stage the document came from.
    ///
    /// An `<input>` that is present but blank counts as missing: an empty
    /// token is never echoed back.
    pub fn require(&self, stage: RelayStage, name: &str) -> Result<String> {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
            _ => Err(WfmuError::MissingToken {
                stage,
                field: name.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

/// Collect the `value` of every `<input>` whose `name` is in `names`.
///
/// Inputs without a `value` attribute map to the empty string. Names that
/// do not occur are simply absent from the result. If a name occurs more
/// than once, the last one in document order wins.
pub fn extract_input_values(names: &[&str], document: &Html) -> TokenBag {
    let mut values = HashMap::new();
    let mut saw_input = false;

    let inputs = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "input");

    for input in inputs {
        saw_input = true;
        if let Some(name) = input.value().attr("name") {
            if names.contains(&name) {
                let value = input.value().attr("value").unwrap_or("");
                values.insert(name.to_string(), value.to_string());
            }
        }
    }

    log::trace!("Harvested {} of {} form fields", values.len(), names.len());
    if !saw_input && !names.is_empty() {
        log::debug!("Document has no <input> elements at all; probably not the expected page");
    }
    TokenBag(values)
}

/// Same as [`extract_input_values`] for raw HTML text.
pub fn extract_input_values_from_str(names: &[&str], html: &str) -> TokenBag {
    let document = Html::parse_document(html);
    extract_input_values(names, &document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_only_required_names() {
        let html = r#"<form>
            <input name="a" value="1">
            <input name="b" value="2">
        </form>"#;

        let bag = extract_input_values_from_str(&["a", "c"], html);

        let mut expected = HashMap::new();
        expected.insert("a".to_string(), "1".to_string());
        assert_eq!(bag.into_inner(), expected);
    }

    #[test]
    fn test_missing_value_defaults_to_empty() {
        let bag = extract_input_values_from_str(&["sk"], r#"<input type="hidden" name="sk">"#);
        assert_eq!(bag.get("sk"), Some(""));
    }

    #[test]
    fn test_require_reports_stage_and_field() {
        let bag = extract_input_values_from_str(&["__kfid"], "<html><body></body></html>");
        assert!(bag.is_empty());

        match bag.require(RelayStage::LoginPage, KFID_FIELD) {
            Err(WfmuError::MissingToken { stage, field }) => {
                assert_eq!(stage, RelayStage::LoginPage);
                assert_eq!(field, "__kfid");
            }
            other => panic!("expected MissingToken, got {other:?}"),
        }
    }

    #[test]
    fn test_last_duplicate_wins() {
        let html = r#"<input name="e" value="old"><input name="e" value="new">"#;
        let bag = extract_input_values_from_str(&["e"], html);
        assert_eq!(bag.get("e"), Some("new"));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_require_rejects_blank_values() {
        let html = r#"<input name="__kfid"><input name="e" value="  "><input name="c" value="ok">"#;
        let bag = extract_input_values_from_str(&["__kfid", "e", "c"], html);
        assert_eq!(bag.len(), 3);

        assert!(matches!(
            bag.require(RelayStage::LoginPage, KFID_FIELD),
            Err(WfmuError::MissingToken { .. })
        ));
        assert!(matches!(
            bag.require(RelayStage::PlaylistPage, "e"),
            Err(WfmuError::MissingToken { .. })
        ));
        assert_eq!(bag.require(RelayStage::CommentDraft, "c").unwrap(), "ok");
    }

    #[test]
    fn test_inputs_found_at_any_depth() {
        let html = r#"<div><form><table><tr><td>
            <input type="hidden" name="pe" value="deep">
        </td></tr></table></form></div>"#;
        let bag = extract_input_values_from_str(&["pe"], html);
        assert_eq!(bag.get("pe"), Some("deep"));
    }
}
