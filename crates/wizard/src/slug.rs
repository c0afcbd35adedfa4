//! Publication slugs and their public URLs

use regex_lite::Regex;
use std::sync::OnceLock;

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/publicacion/([^/?#]+)/").expect("valid slug pattern"))
}

/// Public URL of a publication: `<origin>/publicacion/<slug>/`
pub fn preview_url(origin: &str, slug: &str) -> String {
    format!("{}/publicacion/{}/", origin.trim_end_matches('/'), slug)
}

/// Pull the slug out of a URL typed by hand
pub fn extract_slug(url: &str) -> Option<String> {
    slug_pattern()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_url() {
        assert_eq!(
            preview_url("https://repo.test/", "informe-anual-2024-ab12"),
            "https://repo.test/publicacion/informe-anual-2024-ab12/"
        );
    }

    #[test]
    fn test_extract_slug() {
        assert_eq!(
            extract_slug("https://repo.test/publicacion/mi-tesis-2023/").as_deref(),
            Some("mi-tesis-2023")
        );
        assert_eq!(
            extract_slug("/publicacion/mi-tesis/?ref=home").as_deref(),
            Some("mi-tesis")
        );
        assert_eq!(extract_slug("https://repo.test/publicacion/sin-barra"), None);
        assert_eq!(extract_slug("https://otro.test/articulo/x/"), None);
    }
}
