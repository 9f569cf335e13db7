//! Server-rendered pages.

use axum::response::Html;

use crate::domain::entity::profile::UserProfile;

const STYLESHEET: &str = "/static/style.css";

pub fn home_page() -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Blog Search</title>
    <link rel="stylesheet" href="{STYLESHEET}" />
  </head>
  <body>
    <h1>Blog Search</h1>
    <p>Sign in to get started.</p>
    <a class="button" href="/login">Login with Google</a>
  </body>
</html>
"#
    ))
}

pub fn welcome_page(user: &UserProfile) -> Html<String> {
    let name = escape_html(&user.name);
    let email = escape_html(&user.email);
    let avatar = if user.picture.is_empty() {
        String::new()
    } else {
        format!(r#"<img class="avatar" src="{}" alt="{name}" />"#, escape_html(&user.picture))
    };

    Html(format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Welcome</title>
    <link rel="stylesheet" href="{STYLESHEET}" />
  </head>
  <body>
    {avatar}
    <h1>Welcome, {name}</h1>
    <p>Signed in as {email}.</p>
    <form id="search">
      <input name="slug" placeholder="Tag, e.g. react" required />
      <button type="submit">Search blogs</button>
    </form>
    <ul id="results"></ul>
    <a href="/logout">Logout</a>
    <script>
      document.getElementById("search").addEventListener("submit", async (event) => {{
        event.preventDefault();
        const slug = new FormData(event.target).get("slug");
        const response = await fetch("/search-blogs/", {{
          method: "POST",
          headers: {{ "Content-Type": "application/json" }},
          body: JSON.stringify({{ slug }}),
        }});
        const list = document.getElementById("results");
        list.replaceChildren();
        if (!response.ok) {{
          list.textContent = "Search failed (" + response.status + ")";
          return;
        }}
        const {{ posts }} = await response.json();
        for (const post of posts) {{
          const link = document.createElement("a");
          link.href = post.blog_url;
          link.textContent = post.title;
          const item = document.createElement("li");
          item.appendChild(link);
          list.appendChild(item);
        }}
      }});
    </script>
  </body>
</html>
"#
    ))
}

/// Page shown when the provider refuses or the callback cannot be verified.
pub fn error_page(code: &str) -> Html<String> {
    let code = escape_html(code);

    Html(format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Login failed</title>
    <link rel="stylesheet" href="{STYLESHEET}" />
  </head>
  <body>
    <h1>Login failed</h1>
    <p>The identity provider reported: <code class="error">{code}</code></p>
    <a href="/">Back to home</a>
  </body>
</html>
"#
    ))
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
