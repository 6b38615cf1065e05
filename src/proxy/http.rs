//! Just enough HTTP/1.1 for the proxy: read a request head, write a response.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

const MAX_HEADER_LINES: usize = 100;
const MAX_LINE_LENGTH: u64 = 8 * 1024;

/// Headers sent with every response, errors included.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET,OPTIONS"),
    ("Access-Control-Allow-Headers", "*"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Options,
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
}

/// Read a request line and skip the headers that follow it.
///
/// Returns `Ok(None)` for a connection that closed early or a request head that
/// is not HTTP.
pub async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<Option<Request>> {
    let mut line = String::new();
    if !read_line(reader, &mut line).await? {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let (Some(method), Some(path), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Ok(None);
    };
    if !version.starts_with("HTTP/") {
        return Ok(None);
    }
    let request = Request {
        method: Method::parse(method),
        path: path.to_string(),
    };

    for _ in 0..MAX_HEADER_LINES {
        if !read_line(reader, &mut line).await? {
            return Ok(None);
        }
        if line.trim_end().is_empty() {
            return Ok(Some(request));
        }
    }

    Ok(None)
}

/// Read one newline-terminated line of at most `MAX_LINE_LENGTH` bytes into
/// `line`. Returns false at end of input or when the line is too long.
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R, line: &mut String) -> io::Result<bool> {
    line.clear();
    let read = (&mut *reader).take(MAX_LINE_LENGTH).read_line(line).await?;
    Ok(read > 0 && line.ends_with('\n'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    pub fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        CORS_HEADERS
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
            .or_else(|| name.eq_ignore_ascii_case("Content-Type").then_some(self.content_type))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        head.push_str(&format!("Content-Type: {}\r\n", self.content_type));
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        for (name, value) in CORS_HEADERS {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_request() {
        let raw = b"OPTIONS /quiz HTTP/1.1\r\nHost: localhost\r\nOrigin: http://a.b\r\n\r\n";
        let request = read_request(&mut &raw[..]).await.unwrap().unwrap();
        assert_eq!(request.method, Method::Options);
        assert_eq!(request.path, "/quiz");

        let raw = b"DELETE / HTTP/1.0\r\n\r\n";
        let request = read_request(&mut &raw[..]).await.unwrap().unwrap();
        assert_eq!(request.method, Method::Other("DELETE".to_string()));

        assert_eq!(read_request(&mut &b"hello\r\n"[..]).await.unwrap(), None);
        assert_eq!(read_request(&mut &b""[..]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_lines() {
        let endless = vec![b'a'; 64 * 1024];
        assert_eq!(read_request(&mut &endless[..]).await.unwrap(), None);

        let mut raw = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
        raw.extend(std::iter::repeat_n(b'x', 16 * 1024));
        raw.extend_from_slice(b"\r\n\r\n");
        assert_eq!(read_request(&mut &raw[..]).await.unwrap(), None);

        // A head cut off before the blank line is not a request either.
        assert_eq!(read_request(&mut &b"GET / HTTP/1.1\r\nHost: a"[..]).await.unwrap(), None);
    }

    #[test]
    fn test_response_bytes() {
        let response = Response::text(405, "Method Not Allowed");
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(text.contains("Access-Control-Allow-Methods: GET,OPTIONS\r\n"));
        assert!(text.contains("Access-Control-Allow-Headers: *\r\n"));
        assert!(text.contains("Content-Length: 18\r\n"));
        assert!(text.ends_with("\r\n\r\nMethod Not Allowed"));
    }
}
