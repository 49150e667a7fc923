//! Preview mode - draft content instead of the published release

/// Cookie set by the Prismic toolbar (and by `/api/preview`)
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// Which content release a request or build reads from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewMode {
    /// Published content, read from the master ref
    #[default]
    Published,
    /// Draft content, read from a preview ref
    Draft(String),
}

impl PreviewMode {
    /// Preview mode from an optional ref; blank refs mean published content
    pub fn from_ref(reference: Option<&str>) -> Self {
        match reference.map(str::trim) {
            Some(r) if !r.is_empty() => PreviewMode::Draft(r.to_string()),
            _ => PreviewMode::Published,
        }
    }

    /// Preview mode from a raw `Cookie` header value
    pub fn from_cookie_header(header: Option<&str>) -> Self {
        let reference = header.and_then(|h| {
            h.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == PREVIEW_COOKIE).then(|| decode_cookie_value(value))
            })
        });
        Self::from_ref(reference.as_deref())
    }

    /// The draft ref to query with, `None` for published content
    pub fn draft_ref(&self) -> Option<&str> {
        match self {
            PreviewMode::Published => None,
            PreviewMode::Draft(r) => Some(r),
        }
    }

    /// Whether the "exit preview" control is shown
    pub fn is_active(&self) -> bool {
        matches!(self, PreviewMode::Draft(_))
    }
}

fn decode_cookie_value(value: &str) -> String {
    percent_encoding::percent_decode_str(value.trim_matches('"'))
        .decode_utf8_lossy()
        .into_owned()
}
