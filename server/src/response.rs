//! The response type returned by every handler, and conversions into it.
use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use meshplot::EncodedResponse;

/// The outgoing response, as handed over to `hyper`.
pub type Response = http::Response<Full<Bytes>>;

/// Convert a type into a [`Response`].
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

/// An empty response with the given status code.
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        let mut response = Response::new(Full::default());
        *response.status_mut() = self;
        response
    }
}

/// A `200 OK` carrying the encoded body and its content type.
impl IntoResponse for EncodedResponse {
    fn into_response(self) -> Response {
        let EncodedResponse { content_type, body } = self;
        let mut response = Response::new(Full::new(body));
        response.headers_mut().insert(CONTENT_TYPE, content_type);
        response
    }
}

/// A response with a `text/plain; charset=utf-8` body.
pub fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    let mut response = Response::new(Full::new(Bytes::from(body.into())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(mime::TEXT_PLAIN_UTF_8.as_ref()),
    );
    response
}

/// A `200 OK` with an `application/json` body.
pub fn json<T: serde::Serialize>(value: &T) -> Result<Response, serde_json::Error> {
    let body = serde_json::to_vec(value)?;
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()),
    );
    Ok(response)
}

/// A `405 Method Not Allowed`, listing the methods the route accepts.
pub fn method_not_allowed(allowed: &'static str) -> Response {
    let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allowed));
    response
}

#[cfg(test)]
mod tests {
    use super::{IntoResponse, json, method_not_allowed, plain_text};
    use http::StatusCode;
    use http_body_util::BodyExt;
    use meshplot::{EncodedResponse, Msgpack};

    async fn body(response: super::Response) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn encoded_responses_carry_their_content_type() {
        let encoded: EncodedResponse = Msgpack::new(&vec![1, 2, 3]).unwrap().into();
        let expected_body = encoded.body.clone();

        let response = encoded.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/msgpack");
        assert_eq!(body(response).await, expected_body.to_vec());
    }

    #[tokio::test]
    async fn plain_text_and_json_bodies() {
        let response = plain_text(StatusCode::NOT_FOUND, "Nope");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body(response).await, b"Nope");

        let response = json(&["a", "b"]).unwrap();
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(body(response).await, br#"["a","b"]"#);
    }

    #[test]
    fn method_not_allowed_lists_the_allowed_methods() {
        let response = method_not_allowed("GET");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "GET");
    }
}
