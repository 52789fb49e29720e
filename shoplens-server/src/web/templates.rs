//! Inline HTML pages.
//!
//! The pages are small enough that a template engine would be more code
//! than the pages themselves; substitution happens on `{{name}}` markers
//! and every interpolated value is escaped first.

const PAGE_STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; background: #f6f6f7;
           color: #1a1a1a; display: flex; justify-content: center; }
    main { max-width: 40rem; margin-top: 15vh; text-align: center; }
    h1 { font-size: 1.6rem; }
    form { margin-top: 1.5rem; }
    input[type=text] { padding: 0.6rem; width: 60%; font-size: 1rem;
                       border: 1px solid #c4c4c8; border-radius: 4px; }
    button { padding: 0.6rem 1.2rem; font-size: 1rem; border: 0;
             border-radius: 4px; background: #3f7d58; color: #fff; }
    .reason { color: #5c5c61; }
    .verdict-yes { color: #2e7d4f; }
    .verdict-no { color: #9c3c3c; }
    a { color: #3f7d58; }
"#;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Shoplens</title>
  <style>{{style}}</style>
</head>
<body>
  <main>
    <h1>Is it a Shopify store?</h1>
    <p>Enter a domain or URL and Shoplens will check the site for
       Shopify markers.</p>
    <form method="post" action="/">
      <input type="text" name="url" placeholder="shop.example.com"
             autofocus required>
      <button type="submit">Check</button>
    </form>
  </main>
</body>
</html>
"#;

const POLLING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Checking {{domain}}&hellip;</title>
  <style>{{style}}</style>
</head>
<body>
  <main>
    <h1>Checking {{domain}}&hellip;</h1>
    <p class="reason">This usually takes a few seconds. The page refreshes
       itself once the check finishes.</p>
  </main>
  <script>
    async function poll() {
      try {
        const response = await fetch("/status/{{domain}}");
        if (!response.ok) {
          throw new Error("status request failed: " + response.status);
        }
        const result = await response.json();
        if (result.status !== "in_progress") {
          window.location.reload();
          return;
        }
      } catch (err) {
        console.error("poll failed", err);
      }
      setTimeout(poll, 1000);
    }
    poll();
  </script>
</body>
</html>
"#;

const RESULT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{domain}} &mdash; Shoplens</title>
  <style>{{style}}</style>
</head>
<body>
  <main>
    <h1 class="{{verdict_class}}">{{headline}}</h1>
    {{reason_html}}
    <p><a href="/">Check another site</a></p>
  </main>
</body>
</html>
"#;

/// Escape a value for interpolation into HTML text or attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
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

pub fn landing_page() -> String {
    LANDING_PAGE.replace("{{style}}", PAGE_STYLE)
}

pub fn polling_page(domain: &str) -> String {
    POLLING_PAGE
        .replace("{{style}}", PAGE_STYLE)
        .replace("{{domain}}", &escape_html(domain))
}

pub fn result_page(
    domain: &str,
    is_shopify: bool,
    reason: Option<&str>,
) -> String {
    let domain = escape_html(domain);
    let (verdict_class, headline) = if is_shopify {
        ("verdict-yes", format!("Yes &mdash; {domain} is a Shopify store"))
    } else {
        (
            "verdict-no",
            format!("No &mdash; {domain} does not look like a Shopify store"),
        )
    };
    let reason_html = reason
        .map(|reason| {
            format!("<p class=\"reason\">{}</p>", escape_html(reason))
        })
        .unwrap_or_default();

    RESULT_PAGE
        .replace("{{style}}", PAGE_STYLE)
        .replace("{{domain}}", &domain)
        .replace("{{verdict_class}}", verdict_class)
        .replace("{{headline}}", &headline)
        .replace("{{reason_html}}", &reason_html)
}
