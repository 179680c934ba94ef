use crate::error::{OraError, OraResult};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// One row of the directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Document id, used as the row id so search hits can be matched to rows.
    pub id: String,
    pub name: String,
    pub modified: String,
    pub size: String,
    pub link: String,
}

/// Wraps an already sanitized body into a standalone HTML page.
///
/// `body` is inserted verbatim; `title` and `theme` are escaped.
pub fn render_page(title: &str, theme: &str, body: &str) -> OraResult<String> {
    check_theme(theme)?;

    Ok(format!(
        r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="/css/{theme}.css">
    <link rel="stylesheet" href="/css/highlight.css">
    <script src="/javascript/highlight.js"></script>
    <script>document.addEventListener("DOMContentLoaded", highlightCodeBlocks);</script>
</head>
<body>
    <article>
{body}
    </article>
</body>
</html>
"#,
        title = encode_text(title),
        theme = theme,
        body = body,
    ))
}

pub fn render_listing(title: &str, theme: &str, rows: &[ListingRow]) -> OraResult<String> {
    check_theme(theme)?;

    let mut table = String::new();
    for row in rows {
        let link = encode_double_quoted_attribute(&row.link);
        table.push_str(&format!(
            r#"    <tr id="{id}">
        <td style="text-transform:capitalize;"><a href="{link}">{name}</a></td>
        <td><a href="{link}">{modified}</a></td>
        <td><a href="{link}">{size}</a></td>
    </tr>
"#,
            id = encode_double_quoted_attribute(&row.id),
            link = link,
            name = encode_text(&row.name),
            modified = encode_text(&row.modified),
            size = encode_text(&row.size),
        ));
    }

    Ok(format!(
        r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="/css/{theme}.css">
    <script src="/javascript/index.js"></script>
</head>
<body>
    <h1>Markdown Server</h1>
    <input type="text" placeholder="Search" id="search" name="search" autocomplete="off" />
    <br />

    <table class="center">
    <tr>
        <th>Name</th>
        <th>Last Modified</th>
        <th>Size</th>
    </tr>
{table}    </table>
</body>
</html>
"#,
        title = encode_text(title),
        theme = theme,
        table = table,
    ))
}

/// Themes end up in stylesheet URLs, so only plain names are accepted.
fn check_theme(theme: &str) -> OraResult<()> {
    let plain = !theme.is_empty()
        && theme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !plain {
        return Err(OraError::Compilation(format!("invalid theme name {theme:?}")));
    }
    Ok(())
}
