use crate::dom::{Document, NodeId};
use crate::types::FatalError;

pub fn xpath_attribute(xpath: &str, attribute_name: &str) -> String {
    let mut xpath = String::from(xpath);
    xpath.push_str("[@");
    xpath.push_str(attribute_name);
    xpath.push(']');
    xpath
}

/// Splits a comma-separated attribute value, preserving order.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let parsed = if digits.starts_with("0x") || digits.starts_with("0X") {
        i64::from_str_radix(digits.split_at(2).1, 16)
    } else {
        digits.parse::<i64>()
    };
    parsed.ok().map(|v| if negative { -v } else { v })
}

/// Whether an `api`-style list admits `target`. An empty list admits every API.
pub fn api_matches(api: &[String], target: &str) -> bool {
    api.is_empty() || api.iter().any(|a| a == target)
}

/// Values sometimes reach us still carrying the escaped quote sequence.
pub fn unescape_quotes(text: &str) -> String {
    text.replace("&quot;", "\"")
}

//--------------------------------------------------------------------------------------------------
/// Read-only view of one element, carrying the xpath used in diagnostics.
pub(crate) struct Element<'d> {
    pub doc: &'d Document,
    pub id: NodeId,
}

impl<'d> Element<'d> {
    pub fn new(doc: &'d Document, id: NodeId) -> Self {
        Element { doc, id }
    }

    pub fn attr(&self, key: &str) -> Option<&'d str> {
        self.doc.attr(self.id, key)
    }

    pub fn owned_attr(&self, key: &str) -> Option<String> {
        self.attr(key).map(String::from)
    }

    /// An attribute the schema guarantees to be present.
    pub fn required(&self, key: &str) -> Result<&'d str, FatalError> {
        self.attr(key).ok_or_else(|| FatalError::MissingAttribute {
            xpath: self.xpath(),
            name: String::from(key),
        })
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        self.attr(key).map(split_list).unwrap_or_default()
    }

    pub fn integer(&self, key: &str) -> Result<Option<i64>, FatalError> {
        match self.attr(key) {
            None => Ok(None),
            Some(text) => parse_integer(text)
                .map(Some)
                .ok_or_else(|| FatalError::MalformedLiteral {
                    xpath: xpath_attribute(&self.xpath(), key),
                    text: String::from(text),
                }),
        }
    }

    pub fn xpath(&self) -> String {
        self.doc.xpath(self.id)
    }
}
