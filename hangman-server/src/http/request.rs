//! Hand-rolled request framing and parsing.
//!
//! A request is complete once the blank line ending the headers has arrived
//! and, when a `Content-Length` header is present, that many body bytes
//! follow it. Reads that stop short of either are errors rather than being
//! treated as the end of the request. Without `Content-Length` the body is
//! whatever arrived together with the headers.

use std::collections::HashMap;

use tokio::io::{AsyncRead, AsyncReadExt};

use super::ConnectionError;

pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Value the login form sends for `currentUser` when nobody is logged in.
/// The browser percent-encodes `$$$` and we never decode it.
pub const EMPTY_USER_SENTINEL: &str = "%24%24%24";

const READ_CHUNK: usize = 1024;

/// Form field names the pages post back. These are the wire contract.
pub mod field {
    pub const CURRENT_USER: &str = "currentUser";
    pub const USERNAME: &str = "uname";
    pub const PASSWORD: &str = "psw";
    pub const START_NEW_GAME: &str = "startnewgame";
    pub const GUESSED_LETTER: &str = "guessedLetter";
    pub const LOGOUT: &str = "logoutcuruser";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Request headers were never terminated")]
    MissingTerminator,
    #[error("Request body shorter than Content-Length ({expected} bytes expected, {received} received)")]
    TruncatedBody { expected: usize, received: usize },
    #[error("Invalid Content-Length header")]
    InvalidContentLength,
    #[error("Request exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// `application/x-www-form-urlencoded` fields, kept exactly as sent.
///
/// Values are never percent-decoded. A later duplicate key replaces an
/// earlier one, and a key without `=` is present with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: HashMap<String, String>,
}

impl FormFields {
    pub fn parse(body: &str) -> Self {
        let fields = body
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Request target without the leading `/`.
    pub path: String,
    /// Extension after the last `.` of the path, if any.
    pub type_hint: Option<String>,
    /// Body fields; always empty for anything but `POST`.
    pub form: FormFields,
}

/// Parses one complete request.
pub fn parse_request(bytes: &[u8]) -> Result<Request, ParseError> {
    let head_end = find_terminator(bytes).ok_or(ParseError::MissingTerminator)?;
    let head = String::from_utf8_lossy(&bytes[..head_end]);

    let (method, rest) = if let Some(rest) = head.strip_prefix("GET ") {
        (Method::Get, rest)
    } else if let Some(rest) = head.strip_prefix("POST ") {
        (Method::Post, rest)
    } else {
        return Ok(Request {
            method: Method::Other,
            path: String::new(),
            type_hint: None,
            form: FormFields::default(),
        });
    };

    let request_line = rest.lines().next().unwrap_or_default();
    let target = match request_line.find(" HTTP/") {
        Some(end) => &request_line[..end],
        None => request_line.trim_end(),
    };
    let path = target.strip_prefix('/').unwrap_or(target).to_string();
    let type_hint = path
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_string());

    let form = if method == Method::Post {
        let body = String::from_utf8_lossy(&bytes[head_end + HEADER_TERMINATOR.len()..]);
        FormFields::parse(body.trim_end_matches(['\r', '\n']))
    } else {
        FormFields::default()
    };

    Ok(Request {
        method,
        path,
        type_hint,
        form,
    })
}

/// Reads exactly one request from `reader`, enforcing `max_bytes`.
pub async fn read_request<R>(reader: &mut R, max_bytes: usize) -> Result<Vec<u8>, ConnectionError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let head_end = loop {
        if let Some(end) = find_terminator(&buffer) {
            break end;
        }
        if buffer.len() >= max_bytes {
            return Err(ParseError::TooLarge { limit: max_bytes }.into());
        }

        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            if buffer.is_empty() {
                return Err(ConnectionError::Closed);
            }
            return Err(ParseError::MissingTerminator.into());
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let body_start = head_end + HEADER_TERMINATOR.len();
    let body_len = match content_length(&buffer[..head_end])? {
        Some(length) => length,
        // Without a length the body is whatever arrived with the headers.
        None => buffer.len() - body_start,
    };
    let total = body_start
        .checked_add(body_len)
        .filter(|total| *total <= max_bytes)
        .ok_or(ParseError::TooLarge { limit: max_bytes })?;

    while buffer.len() < total {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Err(ParseError::TruncatedBody {
                expected: body_len,
                received: buffer.len() - body_start,
            }
            .into());
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    // Anything after the declared body belongs to no request we serve.
    buffer.truncate(total);
    Ok(buffer)
}

fn find_terminator(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

fn content_length(head: &[u8]) -> Result<Option<usize>, ParseError> {
    let head = String::from_utf8_lossy(head);
    for line in head.lines().skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                return value
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| ParseError::InvalidContentLength);
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn post(body: &str) -> Vec<u8> {
        format!(
            "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        )
        .into_bytes()
    }

    #[test]
    fn test_get_path_and_type_hint() {
        let request = parse_request(b"GET /gallows10.png HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "gallows10.png");
        assert_eq!(request.type_hint.as_deref(), Some("png"));
        assert!(request.form.is_empty());
    }

    #[test]
    fn test_get_root_has_no_type_hint() {
        let request = parse_request(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path, "");
        assert_eq!(request.type_hint, None);
    }

    #[test]
    fn test_type_hint_uses_last_dot() {
        let request = parse_request(b"GET /archive.tar.gz HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(request.type_hint.as_deref(), Some("gz"));
    }

    #[test]
    fn test_get_ignores_body() {
        let request = parse_request(b"GET /login.html HTTP/1.1\r\n\r\nuname=admin").unwrap();
        assert!(request.form.is_empty());
    }

    #[test]
    fn test_other_methods() {
        for raw in [
            &b"PUT / HTTP/1.1\r\n\r\n"[..],
            b"get / HTTP/1.1\r\n\r\n",
            b"GETX / HTTP/1.1\r\n\r\n",
            b"POSTAL / HTTP/1.1\r\n\r\n",
        ] {
            assert_eq!(parse_request(raw).unwrap().method, Method::Other);
        }
    }

    #[test]
    fn test_missing_terminator() {
        assert_eq!(
            parse_request(b"GET / HTTP/1.1\r\nHost: x\r\n"),
            Err(ParseError::MissingTerminator)
        );
        assert_eq!(parse_request(b""), Err(ParseError::MissingTerminator));
    }

    #[test]
    fn test_post_form_fields() {
        let request =
            parse_request(&post("currentUser=%24%24%24&uname=admin&psw=password")).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.form.get("currentUser"), Some(EMPTY_USER_SENTINEL));
        assert_eq!(request.form.get("uname"), Some("admin"));
        assert_eq!(request.form.get("psw"), Some("password"));
        assert_eq!(request.form.len(), 3);
    }

    #[test]
    fn test_values_are_not_percent_decoded() {
        let request = parse_request(&post("psw=p%40ss+word&x=%2F")).unwrap();
        assert_eq!(request.form.get("psw"), Some("p%40ss+word"));
        assert_eq!(request.form.get("x"), Some("%2F"));
    }

    #[test]
    fn test_marker_field_without_equals() {
        let request = parse_request(&post("currentUser=admin&startnewgame")).unwrap();
        assert!(request.form.contains("startnewgame"));
        assert_eq!(request.form.get("startnewgame"), Some(""));
    }

    #[test]
    fn test_marker_field_with_empty_value() {
        let request = parse_request(&post("logoutcuruser=&currentUser=admin")).unwrap();
        assert_eq!(request.form.get("logoutcuruser"), Some(""));
        assert_eq!(request.form.get("currentUser"), Some("admin"));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let request = parse_request(&post("guessedLetter=a&guessedLetter=b")).unwrap();
        assert_eq!(request.form.get("guessedLetter"), Some("b"));
        assert_eq!(request.form.len(), 1);
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let request = parse_request(&post("psw=a=b")).unwrap();
        assert_eq!(request.form.get("psw"), Some("a=b"));
    }

    #[test]
    fn test_empty_segments_skipped() {
        let request = parse_request(&post("&&currentUser=admin&&")).unwrap();
        assert_eq!(request.form.len(), 1);
    }

    #[test]
    fn test_trailing_newline_trimmed_from_body() {
        let request = parse_request(b"POST / HTTP/1.1\r\n\r\nguessedLetter=e\r\n").unwrap();
        assert_eq!(request.form.get("guessedLetter"), Some("e"));
    }

    #[test]
    fn test_content_length_header_is_case_insensitive() {
        assert_eq!(content_length(b"POST / HTTP/1.1\r\ncontent-LENGTH:  12"), Ok(Some(12)));
        assert_eq!(content_length(b"POST / HTTP/1.1\r\nHost: x"), Ok(None));
        assert_eq!(
            content_length(b"POST / HTTP/1.1\r\nContent-Length: lots"),
            Err(ParseError::InvalidContentLength)
        );
    }

    #[tokio::test]
    async fn test_read_request_across_chunks() {
        let mut reader = Builder::new()
            .read(b"POST / HTTP/1.1\r\nContent-Le")
            .read(b"ngth: 16\r\n\r\n")
            .read(b"guessedLetter")
            .read(b"=e&")
            .build();

        let bytes = read_request(&mut reader, 4096).await.unwrap();
        let request = parse_request(&bytes).unwrap();
        assert_eq!(request.form.get("guessedLetter"), Some("e"));
    }

    #[tokio::test]
    async fn test_read_request_without_body() {
        let mut reader = Builder::new().read(b"GET /index.html HTTP/1.1\r\n\r\n").build();
        let bytes = read_request(&mut reader, 4096).await.unwrap();
        assert_eq!(parse_request(&bytes).unwrap().path, "index.html");
    }

    #[tokio::test]
    async fn test_read_request_truncated_body() {
        let mut reader = Builder::new()
            .read(b"POST / HTTP/1.1\r\nContent-Length: 20\r\n\r\nuname=admin")
            .build();

        let result = read_request(&mut reader, 4096).await;
        assert!(matches!(
            result,
            Err(ConnectionError::Parse(ParseError::TruncatedBody {
                expected: 20,
                received: 11
            }))
        ));
    }

    #[tokio::test]
    async fn test_read_request_peer_closes_before_terminator() {
        let mut reader = Builder::new().read(b"GET / HTTP/1.1\r\n").build();
        let result = read_request(&mut reader, 4096).await;
        assert!(matches!(
            result,
            Err(ConnectionError::Parse(ParseError::MissingTerminator))
        ));
    }

    #[tokio::test]
    async fn test_read_request_immediate_close() {
        let mut reader = Builder::new().build();
        let result = read_request(&mut reader, 4096).await;
        assert!(matches!(result, Err(ConnectionError::Closed)));
    }

    #[tokio::test]
    async fn test_read_request_too_large() {
        let mut reader = Builder::new().read(&[b'A'; 64]).build();
        let result = read_request(&mut reader, 32).await;
        assert!(matches!(
            result,
            Err(ConnectionError::Parse(ParseError::TooLarge { limit: 32 }))
        ));
    }

    #[tokio::test]
    async fn test_read_request_keeps_body_without_content_length() {
        let mut reader = Builder::new()
            .read(b"POST / HTTP/1.1\r\nHost: x\r\n\r\ncurrentUser=%24%24%24&uname=admin&psw=password")
            .build();

        let bytes = read_request(&mut reader, 4096).await.unwrap();
        let request = parse_request(&bytes).unwrap();
        assert_eq!(request.form.get("uname"), Some("admin"));
        assert_eq!(request.form.get("psw"), Some("password"));
    }

    #[tokio::test]
    async fn test_read_request_content_length_overflow() {
        let mut reader = Builder::new()
            .read(b"POST / HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n")
            .build();
        let result = read_request(&mut reader, 1024).await;
        assert!(matches!(
            result,
            Err(ConnectionError::Parse(ParseError::TooLarge { limit: 1024 }))
        ));
    }

    #[tokio::test]
    async fn test_read_request_declared_body_too_large() {
        let mut reader = Builder::new()
            .read(b"POST / HTTP/1.1\r\nContent-Length: 5000\r\n\r\n")
            .build();
        let result = read_request(&mut reader, 1024).await;
        assert!(matches!(
            result,
            Err(ConnectionError::Parse(ParseError::TooLarge { limit: 1024 }))
        ));
    }
}
