//! GitHub-flavored markdown anchors for the index.

/// Generate a table-of-contents list item linking to a heading.
pub fn render_toc_item(title: &str) -> String {
    format!("* [{}](#{})", title, github_slug(title))
}

/// GitHub heading anchor slug:
/// - lowercase
/// - keep only alphanumerics, spaces, hyphens and underscores (`.` is stripped)
/// - replace spaces with hyphens
fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}
