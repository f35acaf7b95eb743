//! Адрес backend для запросов из браузера

/// Порт backend, если адрес не задан явно
const DEFAULT_API_PORT: u16 = 3000;

/// Базовый адрес API.
///
/// Берётся из `<meta name="api-base" content="...">`, если такой тег есть в странице,
/// иначе строится из текущего адреса с портом 3000.
/// Пустая строка, если окно недоступно.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };

    let configured = window
        .document()
        .and_then(|d| d.query_selector("meta[name=\"api-base\"]").ok().flatten())
        .and_then(|meta| meta.get_attribute("content"));
    if let Some(base) = configured.filter(|b| !b.trim().is_empty()) {
        return normalize_base(&base);
    }

    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:{}", protocol, hostname, DEFAULT_API_PORT)
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// Полный URL по пути API
///
/// # Example
/// ```ignore
/// let url = api_url("/api/records");
/// ```
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_strips_trailing_slash() {
        assert_eq!(normalize_base(" http://localhost:8080/ "), "http://localhost:8080");
        assert_eq!(normalize_base("/backend"), "/backend");
    }
}
