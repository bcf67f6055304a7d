//! HTML building blocks shared by the pages.

use axum::response::Html;
use inventory::Environment;

/// Escape text for use in element content and quoted attributes.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NoticeKind {
    Success,
    Warning,
    Error,
}

pub(crate) fn notice(kind: NoticeKind, text: &str) -> String {
    let class = match kind {
        NoticeKind::Success => "success",
        NoticeKind::Warning => "warning",
        NoticeKind::Error => "error",
    };
    format!(r#"<p class="notice {class}" role="status">{}</p>"#, escape(text))
}

/// A `<select>` with its label. `options` are `(value, text)` pairs.
pub(crate) fn select(
    name: &str,
    label: &str,
    options: &[(String, String)],
    selected: Option<&str>,
) -> String {
    let mut html = format!(
        r#"<label for="{name}">{}</label><select id="{name}" name="{name}">"#,
        escape(label)
    );
    for (value, text) in options {
        let mark = if Some(value.as_str()) == selected {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            r#"<option value="{}"{mark}>{}</option>"#,
            escape(value),
            escape(text)
        ));
    }
    html.push_str("</select>");
    html
}

/// Wrap `body` in the common layout with navigation and the environment
/// banner.
pub(crate) fn layout(title: &str, environment: Environment, debug: bool, body: &str) -> Html<String> {
    let banner = match environment {
        Environment::Production => r#"<span class="env production">PRODUCTION</span>"#,
        Environment::Development => r#"<span class="env development">DEVELOPMENT</span>"#,
    };
    let debug = if debug {
        notice(NoticeKind::Warning, "Running in DEBUG mode")
    } else {
        String::new()
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 60rem; margin: 0 auto; padding: 1rem; }}
nav a {{ margin-right: 1rem; }}
label {{ display: block; margin-top: .75rem; font-weight: bold; }}
table {{ border-collapse: collapse; margin: 1rem 0; }}
th, td {{ border: 1px solid #ccc; padding: .3rem .6rem; text-align: left; }}
.notice {{ padding: .5rem; border-radius: 4px; }}
.success {{ background: #e3f6e3; }}
.warning {{ background: #fff4d6; }}
.error {{ background: #fde2e2; }}
.env {{ float: right; font-size: .8rem; padding: .2rem .4rem; }}
.production {{ background: #e3f6e3; }}
.development {{ background: #fff4d6; }}
</style>
</head>
<body>
<nav>{banner}<a href="/">Kandang</a><a href="/inbound">Masuk</a><a href="/outbound">Keluar</a><a href="/dashboard">Dashboard</a></nav>
{debug}
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
    ))
}
