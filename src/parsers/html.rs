use crate::error::{Error, Result};
use scraper::{ElementRef, Html, Selector};

/// Compiles a CSS selector, keeping the offending text in the error
pub fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// Text content of an element, trimmed at both ends; inner line breaks are kept
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Whether the element's class attribute contains `needle`
pub fn class_contains(element: ElementRef<'_>, needle: &str, ignore_case: bool) -> bool {
    match element.value().attr("class") {
        Some(class) if ignore_case => class.to_lowercase().contains(&needle.to_lowercase()),
        Some(class) => class.contains(needle),
        None => false,
    }
}

/// Nearest ancestor element with the given tag name that satisfies `pred`
pub fn nearest_ancestor<'a, F>(element: ElementRef<'a>, tag: &str, pred: F) -> Option<ElementRef<'a>>
where
    F: Fn(ElementRef<'a>) -> bool,
{
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag && pred(*ancestor))
}

/// First `max_chars` characters of the serialized document
pub fn sample(doc: &Html, max_chars: usize) -> String {
    doc.root_element().html().chars().take(max_chars).collect()
}
