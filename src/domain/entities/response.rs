/// What a plugin hands back from `process`.
///
/// Mirrors the three shapes a handler may produce: nothing, one value, or an
/// ordered sequence that may contain holes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Response {
    #[default]
    Empty,
    Text(String),
    Lines(Vec<Option<String>>),
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Response::Text(text.into())
    }

    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Response::Lines(lines.into_iter().map(|s| Some(s.into())).collect())
    }

    /// Flatten into the text values that survive: holes are dropped, and a
    /// lone empty text counts as no response.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Response::Empty => Vec::new(),
            Response::Text(s) if s.is_empty() => Vec::new(),
            Response::Text(s) => vec![s],
            Response::Lines(lines) => lines.into_iter().flatten().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Response::Empty => true,
            Response::Text(s) => s.is_empty(),
            Response::Lines(lines) => lines.iter().all(Option::is_none),
        }
    }
}

impl From<()> for Response {
    fn from(_: ()) -> Self {
        Response::Empty
    }
}

impl From<String> for Response {
    fn from(s: String) -> Self {
        Response::Text(s)
    }
}

impl From<&str> for Response {
    fn from(s: &str) -> Self {
        Response::Text(s.to_string())
    }
}

impl<T: Into<Response>> From<Option<T>> for Response {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<Vec<String>> for Response {
    fn from(lines: Vec<String>) -> Self {
        Response::Lines(lines.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for Response {
    fn from(lines: Vec<&str>) -> Self {
        Response::lines(lines)
    }
}

impl From<Vec<Option<String>>> for Response {
    fn from(lines: Vec<Option<String>>) -> Self {
        Response::Lines(lines)
    }
}

impl From<Vec<Option<&str>>> for Response {
    fn from(lines: Vec<Option<&str>>) -> Self {
        Response::Lines(lines.into_iter().map(|l| l.map(str::to_string)).collect())
    }
}
