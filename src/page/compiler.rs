use crate::error::OraResult;
use crate::page::template;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::collections::HashSet;

/// Compiles raw markdown into a complete HTML page.
///
/// The output only depends on the arguments: the same `(title, theme, raw)`
/// always produces byte-identical pages. Malformed markdown never fails, the
/// parser emits best-effort markup for anything it cannot make sense of. An
/// error is only returned when the page template rejects its input.
pub fn compile(title: &str, theme: &str, raw: &[u8]) -> OraResult<Vec<u8>> {
    let source = String::from_utf8_lossy(raw);
    let body = sanitize(&render_markdown(&source));
    let page = template::render_page(title, theme, &body)?;

    Ok(page.into_bytes())
}

fn markdown_options() -> Options {
    // Math stays off: `$` is ordinary text in documents.
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Renders markdown to unsanitized HTML, giving every heading an id.
pub fn render_markdown(source: &str) -> String {
    let events = with_heading_ids(Parser::new_ext(source, markdown_options()).collect());

    let mut body = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut body, events.into_iter());
    body
}

/// Strips anything unsafe for user generated content from rendered HTML.
///
/// Beyond the default allow-list, `class` is kept on `code` elements so the
/// stylesheet can hook fenced code languages, and `id` is kept so heading
/// anchors survive.
pub fn sanitize(body: &str) -> String {
    let mut policy = ammonia::Builder::default();
    policy
        .add_tag_attributes("code", &["class"])
        .add_generic_attributes(&["id"])
        .link_rel(Some("nofollow noopener noreferrer"));

    policy.clean(body).to_string()
}

fn with_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut used = HashSet::new();
    for event in &events {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            used.insert(id.to_string());
        }
    }

    let mut i = 0;
    while i < events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            i += 1;
            continue;
        }

        let mut text = String::new();
        let mut end = i + 1;
        while end < events.len() && !matches!(events[end], Event::End(TagEnd::Heading(_))) {
            if let Event::Text(t) | Event::Code(t) = &events[end] {
                text.push_str(t);
            }
            end += 1;
        }

        let slug = unique_slug(&text, &mut used);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
        i = end;
    }

    events
}

/// Lowercases letters and digits and collapses every other run into a `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn unique_slug(text: &str, used: &mut HashSet<String>) -> String {
    let mut base = slugify(text);
    if base.is_empty() {
        base = "section".to_string();
    }

    let mut slug = base.clone();
    let mut n = 1;
    while used.contains(&slug) {
        slug = format!("{base}-{n}");
        n += 1;
    }

    used.insert(slug.clone());
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_collapse_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust 2024 "), "rust-2024");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn repeated_headings_get_numbered_ids() {
        let mut used = HashSet::new();
        assert_eq!(unique_slug("Notes", &mut used), "notes");
        assert_eq!(unique_slug("Notes", &mut used), "notes-1");
        assert_eq!(unique_slug("Notes", &mut used), "notes-2");
        assert_eq!(unique_slug("", &mut used), "section");
    }

    #[test]
    fn headings_are_rendered_with_ids() {
        let html = render_markdown("# Alpha\n\n## Alpha\n\n### Custom {#mine}\n");
        assert!(html.contains(r#"<h1 id="alpha">Alpha</h1>"#));
        assert!(html.contains(r#"<h2 id="alpha-1">Alpha</h2>"#));
        assert!(html.contains(r#"<h3 id="mine">Custom</h3>"#));
    }

    #[test]
    fn dollar_signs_are_not_math() {
        let html = render_markdown("costs $5 and $6");
        assert!(html.contains("costs $5 and $6"));
    }
}
