use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Число с разделителями триад: 1234567 -> "1.234.567"
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Middleware для логирования HTTP запросов
///
/// Пишет метод, путь с query, статус, длительность и размер ответа
/// (если он известен из заголовков). Ошибки сервера уходят уровнем warn.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let size = response
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(format_number)
        .unwrap_or_else(|| "-".to_string());

    if status.is_server_error() {
        tracing::warn!(%method, %uri, status = status.as_u16(), elapsed_ms, size = %size, "request failed");
    } else {
        tracing::info!(%method, %uri, status = status.as_u16(), elapsed_ms, size = %size, "request");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567), "1.234.567");
    }
}
