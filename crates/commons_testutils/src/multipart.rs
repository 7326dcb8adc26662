use axum::body::Body;
use http::{header, Method, Request};

const BOUNDARY: &str = "commons-testutils-boundary";

/// Builds `multipart/form-data` request bodies.
///
/// ```
/// use commons_testutils::MultipartBody;
///
/// let request = MultipartBody::new()
///     .text("name", "alice")
///     .file("docs", "scan.png", "image/png", b"\x89PNG")
///     .into_request("/upload");
/// assert_eq!(request.method(), "POST");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    buffer: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!(r#"form-data; name="{name}""#), None);
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a file part. `content_type` is what the client claims, not what the bytes are.
    pub fn file(
        mut self,
        name: &str,
        file_name: &str,
        content_type: &str,
        data: impl AsRef<[u8]>,
    ) -> Self {
        self.open_part(
            &format!(r#"form-data; name="{name}"; filename="{file_name}""#),
            Some(content_type),
        );
        self.buffer.extend_from_slice(data.as_ref());
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buffer
    }

    /// A `POST` to `uri` carrying this body.
    pub fn into_request(self, uri: &str) -> Request<Body> {
        let content_type = self.content_type();
        let mut request = Request::new(Body::from(self.into_bytes()));
        *request.method_mut() = Method::POST;
        match uri.parse() {
            Ok(uri) => *request.uri_mut() = uri,
            Err(err) => panic!("invalid uri {uri}: {err}"),
        }
        match content_type.parse() {
            Ok(value) => {
                request.headers_mut().insert(header::CONTENT_TYPE, value);
            }
            Err(err) => panic!("invalid content type: {err}"),
        }
        request
    }

    fn open_part(&mut self, disposition: &str, content_type: Option<&str>) {
        self.buffer.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        self.buffer
            .extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
        if let Some(content_type) = content_type {
            self.buffer
                .extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        self.buffer.extend_from_slice(b"\r\n");
    }
}
