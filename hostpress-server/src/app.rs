use hostpress_core::HostpressApp;

/// Environment variables read into config keys, with their defaults.
const ENV_KEYS: [(&str, &str, &str); 7] = [
    ("HTTP_HOST", "http.host", "127.0.0.1"),
    ("HTTP_PORT", "http.port", "3000"),
    ("HOSTPRESS_DATABASE", "database.url", "hostpress.db"),
    ("PAGINATE_DEFAULT", "paginate.default", "20"),
    ("PAGINATE_MAX", "paginate.max", "100"),
    ("ADMIN_LOCAL_ONLY", "admin.local_only", "true"),
    ("SITE_SCHEME", "site.scheme", "http"),
];

/// Build the app config from `vars` (usually `std::env::vars()`).
///
/// Named variables win over defaults; `HOSTPRESS__A__B` style variables are
/// applied last and map to `a.b`.
pub fn hostpress_app<I>(vars: I) -> HostpressApp
where
    I: IntoIterator<Item = (String, String)>,
{
    let app = HostpressApp::new();
    let vars: Vec<(String, String)> = vars.into_iter().collect();

    for (env, key, default) in ENV_KEYS {
        let value = vars
            .iter()
            .find(|(k, _)| k == env)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string());
        app.set(key, value);
    }

    app.load_env("HOSTPRESS__", vars);
    app
}
