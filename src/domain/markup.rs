/// Entities produced by [`escape_html`]; an `&` that already starts one of them is left alone.
const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"];

/// Escapes HTML-special characters. Applying it twice yields the same result as applying it once.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (idx, ch) in input.char_indices() {
        match ch {
            '&' if ENTITIES.iter().any(|e| input[idx..].starts_with(e)) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
