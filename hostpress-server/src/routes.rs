//! Per-host site routes: theme, stylesheet, sitemap and robots.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use hostpress_axum::params::request_host;
use hostpress_axum::HostpressAxumError;
use hostpress_core::{derive_theme, HostKey, HostpressApp};
use hostpress_store::BlogStore;

#[derive(Clone)]
pub struct SiteState {
    pub store: Arc<dyn BlogStore>,
    pub app: HostpressApp,
}

impl SiteState {
    fn scheme(&self) -> String {
        self.app
            .get("site.scheme")
            .unwrap_or_else(|| "http".to_string())
    }
}

pub fn site_router(state: SiteState) -> Router<()> {
    Router::new()
        .route("/api/theme", get(theme_json))
        .route("/theme.css", get(theme_css))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
        .with_state(state)
}

async fn theme_json(headers: HeaderMap, uri: Uri) -> impl IntoResponse {
    Json(derive_theme(&request_host(&headers, &uri)))
}

async fn theme_css(headers: HeaderMap, uri: Uri) -> impl IntoResponse {
    let css = derive_theme(&request_host(&headers, &uri)).to_css_variables();
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css)
}

async fn sitemap(
    State(state): State<SiteState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<impl IntoResponse, HostpressAxumError> {
    let host = request_host(&headers, &uri);
    let posts = state
        .store
        .list_posts(&HostKey::new(host.as_str()), 0, None)
        .await?;

    let base = format!("{}://{}", state.scheme(), host);
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    push_url(&mut xml, &base, &now, "daily", "1");
    for post in &posts {
        let lastmod = post.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        push_url(
            &mut xml,
            &format!("{base}/posts/{}", post.slug),
            &lastmod,
            "weekly",
            "0.7",
        );
    }
    xml.push_str("</urlset>\n");

    tracing::debug!(%host, entries = posts.len() + 1, "sitemap");
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

async fn robots(State(state): State<SiteState>, headers: HeaderMap, uri: Uri) -> impl IntoResponse {
    let host = request_host(&headers, &uri);
    let body = format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\n\nSitemap: {}://{}/sitemap.xml\n",
        state.scheme(),
        host
    );
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

fn push_url(xml: &mut String, loc: &str, lastmod: &str, changefreq: &str, priority: &str) {
    let _ = write!(
        xml,
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
        xml_escape(loc),
        lastmod,
        changefreq,
        priority
    );
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_locations() {
        assert_eq!(xml_escape("a&b<c>\"'"), "a&amp;b&lt;c&gt;&quot;&apos;");
    }
}
