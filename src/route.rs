//! URL path → route resolution for the HTTP front end.
use once_cell::sync::Lazy;
use regex::Regex;

static DOCUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([A-Za-z0-9_-]+(?:/[A-Za-z0-9_-]+)*)\.json$").expect("valid document pattern")
});

// Dots may only separate name characters, so `..` never matches.
static RAW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([A-Za-z0-9_-]+(?:[./][A-Za-z0-9_-]+)*)$").expect("valid raw pattern")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Index,
    /// `/<name>.json`, a document rendered from a typed value.
    Document(String),
    /// `/<name>`, content served as stored.
    Raw(String),
    NotFound,
}

impl Route {
    pub fn resolve(path: &str) -> Self {
        if path == "/" {
            return Route::Index;
        }
        if let Some(caps) = DOCUMENT.captures(path) {
            return Route::Document(caps[1].to_owned());
        }
        if let Some(caps) = RAW.captures(path) {
            return Route::Raw(caps[1].to_owned());
        }
        Route::NotFound
    }
}
