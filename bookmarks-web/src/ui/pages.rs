//! Page views: anonymous landing, signed-in dashboard, built-in sign-in form

use bookmarks_common::{links, time, BookmarkCollection, Entry, EntryStatus};

use super::{escape, page, saved_label, FormValues};
use crate::WebSettings;

/// Landing page for anonymous visitors
pub fn landing(settings: &WebSettings) -> String {
    let sign_in = format!(
        r#"<a class="button" href="/auth/signin">Continue with {}</a>"#,
        escape(&settings.provider_label())
    );

    let body = format!(
        r#"        <section class="hero">
            <h2>Your Links,<br>Beautifully Organized</h2>
            <p>Save and organize your favorite websites.<br>Access them from anywhere, anytime.</p>
        </section>
        <section class="features">
            <div class="card">
                <h3>Lightning Fast</h3>
                <p>Add a link and it is saved right away.</p>
            </div>
            <div class="card">
                <h3>Private &amp; Secure</h3>
                <p>Your bookmarks are yours alone. Only you can see or change them.</p>
            </div>
            <div class="card">
                <h3>Simple &amp; Clean</h3>
                <p>An interface that stays out of your way. Just works.</p>
            </div>
        </section>
        <section class="hero">
            {sign_in}
            <p class="hint">Sign in with {provider} to get started.</p>
        </section>"#,
        sign_in = sign_in,
        provider = escape(&settings.provider_label()),
    );

    page(&sign_in, &body)
}

/// Signed-in view: add form plus the collection's current entries
pub fn dashboard(collection: &BookmarkCollection, form: &FormValues) -> String {
    let header_right = format!(
        r#"<div class="user">
                <span class="email">{email}</span>
                <form method="post" action="/auth/signout"><button class="button secondary" type="submit">Sign out</button></form>
            </div>"#,
        email = escape(&collection.owner().email),
    );

    let body = format!(
        "{form}\n{list}",
        form = add_form(form),
        list = bookmark_list(collection.entries()),
    );

    page(&header_right, &body)
}

fn add_form(values: &FormValues) -> String {
    format!(
        r#"        <form class="card add" method="post" action="/bookmarks">
            <h2>Add Bookmark</h2>
            <label for="title">Title</label>
            <input id="title" name="title" type="text" placeholder="My Awesome Website" value="{title}" required>
            <label for="url">URL</label>
            <input id="url" name="url" type="url" placeholder="https://example.com" value="{url}" required>
            <button class="button" type="submit">Add Bookmark</button>
        </form>"#,
        title = escape(&values.title),
        url = escape(&values.url),
    )
}

fn bookmark_list(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return r#"        <section class="card empty">
            <h3>No bookmarks yet</h3>
            <p class="hint">Add your first bookmark above to get started!</p>
        </section>"#
            .to_string();
    }

    let items: String = entries.iter().map(bookmark_item).collect();

    format!(
        r#"        <section class="card list">
            <div class="list-head">
                <h2>My Bookmarks</h2>
                <p>{label}</p>
            </div>
{items}        </section>"#,
        label = saved_label(entries.len()),
        items = items,
    )
}

fn bookmark_item(entry: &Entry) -> String {
    let bookmark = &entry.bookmark;

    let (class, marker) = match entry.status {
        EntryStatus::Active => ("item", ""),
        EntryStatus::Removing => ("item removing", ""),
        EntryStatus::DeleteFailed => (
            "item delete-failed",
            r#"<span class="failed">Delete failed</span>"#,
        ),
    };

    let icon = match links::favicon_url(&bookmark.url) {
        Some(src) => format!(
            r#"<img src="{}" alt="{} favicon" width="32" height="32">"#,
            escape(&src),
            escape(&bookmark.title)
        ),
        None => "&#127760;".to_string(),
    };

    format!(
        r#"            <div class="{class}" data-id="{id}">
                <div class="icon">{icon}</div>
                <div class="body">
                    <h3>{title}</h3>
                    <div class="meta">
                        <a href="{url}" target="_blank" rel="noopener noreferrer">{domain}</a>
                        &bull; <time datetime="{datetime}">{date}</time> {marker}
                    </div>
                </div>
                <form method="post" action="/bookmarks/{id}/delete">
                    <button class="delete" type="submit" aria-label="Delete bookmark"{disabled}>&#128465;</button>
                </form>
            </div>
"#,
        class = class,
        id = bookmark.id,
        icon = icon,
        title = escape(&bookmark.title),
        url = escape(&bookmark.url),
        domain = escape(&links::domain_name(&bookmark.url)),
        datetime = time::to_storage(&bookmark.created_at),
        date = time::short_date(&bookmark.created_at),
        marker = marker,
        disabled = if entry.status == EntryStatus::Removing { " disabled" } else { "" },
    )
}

/// Consent page of the built-in identity provider
pub fn dev_login(redirect_to: &str, email: &str, invalid: bool) -> String {
    let error = if invalid {
        r#"<p class="error">Enter a valid email address.</p>"#
    } else {
        ""
    };

    let body = format!(
        r#"        <form class="card" method="post" action="/auth/dev-login">
            <h2>Sign in</h2>
            <label for="email">Email</label>
            <input id="email" name="email" type="email" value="{email}" required>
            {error}
            <input type="hidden" name="redirect_to" value="{redirect_to}">
            <button class="button" type="submit">Continue</button>
        </form>"#,
        email = escape(email),
        error = error,
        redirect_to = escape(redirect_to),
    );

    page("", &body)
}
