use scraper::{Html, Selector};

/// Text pulled from a parsed HTML document: the full document's text (used
/// for the document-wide bag-of-words) and, separately, the text found
/// inside the important structural tags (h1,h2,h3,strong,b by default).
pub struct ExtractedText {
    pub all_text: String,
    pub important_text: String,
}

/// Parse `html` into a DOM and pull out plain text. Malformed HTML is never
/// an error for `scraper` — it falls back to treating unparsable input as a
/// document with no elements, which naturally degrades to empty text,
/// matching spec's "malformed HTML → treat as plain text" edge case when the
/// parser can recover no structure at all.
pub fn extract(html: &str, important_tags: &[String]) -> ExtractedText {
    let document = Html::parse_document(html);

    let all_text: String = document.root_element().text().collect::<Vec<_>>().join(" ");

    let selector_str = important_tags.join(", ");
    let important_text = Selector::parse(&selector_str)
        .map(|sel| {
            document
                .select(&sel)
                .map(|el| el.text().collect::<Vec<_>>().join(" "))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    ExtractedText { all_text, important_text }
}
