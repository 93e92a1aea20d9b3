//! Encoded response bodies.
use bytes::Bytes;
use http::HeaderValue;

/// The media type used for MessagePack-encoded bodies.
pub const APPLICATION_MSGPACK: &str = "application/msgpack";

/// A response body with `Content-Type` set to `application/msgpack`.
///
/// Structs are encoded as maps keyed by field name, so that clients can
/// decode the body without knowing the field order.
///
/// # Example
///
/// ```rust
/// use meshplot::Msgpack;
///
/// #[derive(serde::Serialize)]
/// struct Labels {
///     xlabel: String,
///     ylabel: String,
/// }
///
/// let labels = Labels {
///     xlabel: "R".into(),
///     ylabel: "Z".into(),
/// };
/// let body = Msgpack::new(labels).expect("Failed to serialize the response body");
///
/// assert_eq!(body.content_type(), "application/msgpack");
/// ```
#[derive(Debug, Clone)]
pub struct Msgpack(Bytes);

impl Msgpack {
    /// Build a new [`Msgpack`] body by serializing to MessagePack an instance of type `T`.
    ///
    /// It returns an error if serialization fails.
    pub fn new<T>(value: T) -> Result<Self, MsgpackSerializationError>
    where
        T: serde::Serialize,
    {
        let bytes = rmp_serde::to_vec_named(&value).map_err(MsgpackSerializationError)?;
        Ok(Self(bytes.into()))
    }

    pub fn content_type(&self) -> HeaderValue {
        HeaderValue::from_static(APPLICATION_MSGPACK)
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
/// The error returned by [`Msgpack::new`] when the serialization into MessagePack fails.
pub struct MsgpackSerializationError(rmp_serde::encode::Error);

/// An encoded body, paired with its media type.
///
/// It isn't tied to any web framework: the HTTP layer is in charge of turning
/// it into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    pub content_type: HeaderValue,
    pub body: Bytes,
}

impl From<Msgpack> for EncodedResponse {
    fn from(body: Msgpack) -> Self {
        Self {
            content_type: body.content_type(),
            body: body.into_bytes(),
        }
    }
}
