/// Renders chat text as bubble markup: lines become `<br>`-separated, lines
/// starting with "- " become `<li>` items, and each run of items is wrapped in
/// a single `<ul>`. Text is escaped first, so the result is safe for innerHTML.
pub fn format_message_content(content: &str) -> String {
    let mut html = String::with_capacity(content.len() + 16);
    let mut in_list = false;
    // Whether the last thing emitted was a plain line, which needs a `<br>`
    // before the next plain line.
    let mut after_text = false;

    for line in content.split('\n') {
        match line.strip_prefix("- ").filter(|item| !item.is_empty()) {
            Some(item) => {
                if !in_list {
                    html.push_str("<ul>");
                    in_list = true;
                }
                html.push_str("<li>");
                html.push_str(&escape_html(item));
                html.push_str("</li>");
                after_text = false;
            }
            None => {
                if in_list {
                    html.push_str("</ul>");
                    in_list = false;
                } else if after_text {
                    html.push_str("<br>");
                }
                html.push_str(&escape_html(line));
                after_text = true;
            }
        }
    }
    if in_list {
        html.push_str("</ul>");
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
