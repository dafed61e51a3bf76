//! HTML rendering
//!
//! Pages are assembled with `format!` from small fragments. Everything that came
//! from a user or the store goes through [`escape`] first.

mod pages;

pub use pages::{dashboard, dev_login, landing};

/// Values shown in the add-bookmark form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub url: String,
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// "1 bookmark saved" / "3 bookmarks saved"
pub fn saved_label(count: usize) -> String {
    let noun = if count == 1 { "bookmark" } else { "bookmarks" };
    format!("{} {} saved", count, noun)
}

const STYLES: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    background: linear-gradient(135deg, #f8fafc, #eff6ff, #eef2ff);
    color: #111827;
    min-height: 100vh;
    line-height: 1.5;
}
header {
    background: rgba(255, 255, 255, 0.8);
    border-bottom: 1px solid #e5e7eb;
}
.bar { max-width: 72rem; margin: 0 auto; padding: 1rem; display: flex; justify-content: space-between; align-items: center; }
.brand { font-size: 1.5rem; font-weight: 700; color: #4f46e5; text-decoration: none; }
main { max-width: 72rem; margin: 0 auto; padding: 3rem 1rem; }
.card { background: rgba(255, 255, 255, 0.85); border: 1px solid #e5e7eb; border-radius: 1rem; padding: 2rem; margin-bottom: 2rem; }
.user { display: flex; align-items: center; gap: 0.75rem; }
.email { font-size: 0.875rem; color: #374151; max-width: 150px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.button { display: inline-block; padding: 0.75rem 1.5rem; border: 0; border-radius: 0.75rem; background: #4f46e5; color: #fff; font-weight: 600; text-decoration: none; cursor: pointer; }
.button.secondary { background: #fff; color: #374151; border: 1px solid #e5e7eb; }
label { display: block; font-weight: 600; font-size: 0.875rem; margin: 1rem 0 0.5rem; }
input[type=text], input[type=url], input[type=email] { width: 100%; padding: 0.75rem 1rem; border: 2px solid #e5e7eb; border-radius: 0.75rem; }
form.add .button { width: 100%; margin-top: 1.5rem; }
.hero { text-align: center; padding: 3rem 0; }
.hero h2 { font-size: 3rem; line-height: 1.1; margin-bottom: 1rem; }
.hero p { color: #4b5563; font-size: 1.25rem; }
.features { display: grid; grid-template-columns: repeat(auto-fit, minmax(14rem, 1fr)); gap: 1.5rem; margin: 2rem 0 3rem; }
.features h3 { margin-bottom: 0.5rem; }
.features p { color: #4b5563; font-size: 0.875rem; }
.hint { color: #6b7280; font-size: 0.875rem; margin-top: 1rem; }
.list { padding: 0; overflow: hidden; }
.list-head { padding: 1.5rem; border-bottom: 1px solid #e5e7eb; }
.list-head p { color: #4b5563; font-size: 0.875rem; }
.item { display: flex; align-items: center; gap: 1rem; padding: 1.25rem 1.5rem; border-bottom: 1px solid #f3f4f6; }
.item.removing { opacity: 0.4; }
.item.delete-failed { background: #fef2f2; }
.icon { width: 3rem; height: 3rem; border-radius: 0.75rem; background: #f3f4f6; display: flex; align-items: center; justify-content: center; flex-shrink: 0; }
.icon img { width: 2rem; height: 2rem; }
.body { flex: 1; min-width: 0; }
.body h3 { font-size: 1.125rem; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.meta { font-size: 0.875rem; color: #6b7280; }
.meta a { color: inherit; }
.failed { color: #dc2626; font-size: 0.75rem; font-weight: 600; }
.delete { background: none; border: 0; color: #9ca3af; cursor: pointer; font-size: 1.25rem; }
.delete:hover { color: #dc2626; }
.empty { text-align: center; }
.error { color: #dc2626; font-size: 0.875rem; margin-top: 0.5rem; }
footer { text-align: center; padding: 2rem; color: #6b7280; font-size: 0.875rem; }
"#;

/// Page skeleton shared by every view; `header_right` and `body` are trusted HTML
fn page(header_right: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Smart Bookmarks</title>
    <style>{styles}</style>
</head>
<body>
    <header>
        <div class="bar">
            <a class="brand" href="/">Smart Bookmarks</a>
            {header_right}
        </div>
    </header>
    <main>
{body}
    </main>
    <footer>
        <p>Built with Rust, axum, and SQLite</p>
    </footer>
</body>
</html>
"#,
        styles = STYLES,
        header_right = header_right,
        body = body,
    )
}
