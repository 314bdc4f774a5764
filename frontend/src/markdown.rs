//! Answers arrive as markdown (GFM tables, task lists, `$math$`).

use pulldown_cmark::{html, Event, Options, Parser};
use yew::prelude::*;

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
}

/// Markdown to an HTML string. Raw HTML in the source is shown as text.
pub fn to_html(source: &str) -> String {
    let events = Parser::new_ext(source, options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

pub fn render(source: &str) -> Html {
    Html::from_html_unchecked(AttrValue::from(format!(
        "<div class=\"markdown\">{}</div>",
        to_html(source)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_emphasis() {
        let out = to_html("# Limits\n\nThe answer is **2**.");
        assert!(out.contains("<h1>Limits</h1>"));
        assert!(out.contains("<p>The answer is <strong>2</strong>.</p>"));
    }

    #[test]
    fn bullet_and_numbered_lists() {
        let out = to_html("- first\n- second\n\n1. one\n2. two");
        assert!(out.contains("<ul>\n<li>first</li>\n<li>second</li>\n</ul>"));
        assert!(out.contains("<ol>\n<li>one</li>\n<li>two</li>\n</ol>"));
    }

    #[test]
    fn fenced_code_keeps_language_and_escapes() {
        let out = to_html("```rust\nlet v = a < b;\n```");
        assert!(out.contains("<pre><code class=\"language-rust\">let v = a &lt; b;\n</code></pre>"));
    }

    #[test]
    fn tables_and_math() {
        let out = to_html("| x | x² |\n|---|---|\n| 3 | 9 |");
        assert!(out.contains("<table>"));
        assert!(out.contains("<td>9</td>"));

        let out = to_html("Area is $\\pi r^2$.");
        assert!(out.contains("class=\"math math-inline\""));
    }

    #[test]
    fn raw_html_is_not_injected() {
        let out = to_html("<script>alert(1)</script>\n\nhi <b>there</b>");
        assert!(!out.contains("<script>"));
        assert!(!out.contains("<b>"));
        assert!(out.contains("&lt;script&gt;"));
    }
}
