use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::form_urlencoded;

pub const FILE_ID: &str = "fileId";
pub const USER_ID: &str = "userId";
pub const STATE: &str = "state";

/// Launch parameters, parsed once from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionParams {
    values: HashMap<String, String>,
}

impl SessionParams {
    /// Accepts `?a=b&c=d` or `a=b&c=d`. Later duplicates win.
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let values = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { values }
    }

    /// Empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn file_id(&self) -> Option<&str> {
        self.get(FILE_ID)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID)
    }

    pub fn state(&self) -> Option<&str> {
        self.get(STATE)
    }

    /// The document requested by an `open` state, if the state is usable.
    pub fn open_request(&self) -> Option<OpenRequest> {
        parse_open_state(self.state()?)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct StateParam {
    action: Option<String>,
    #[serde(default)]
    ids: Vec<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub file_id: String,
    pub user_id: Option<String>,
}

/// Malformed JSON, another action, or an empty id list all yield `None`.
pub fn parse_open_state(raw: &str) -> Option<OpenRequest> {
    let state: StateParam = match serde_json::from_str(raw) {
        Ok(state) => state,
        Err(e) => {
            tracing::debug!("Ignoring unparsable state parameter: {e}");
            return None;
        }
    };
    if state.action.as_deref() != Some("open") {
        return None;
    }
    let file_id = state.ids.into_iter().next().filter(|id| !id.is_empty())?;
    Some(OpenRequest {
        file_id,
        user_id: state.user_id,
    })
}

/// Location pushed after a document has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "fileId")]
    pub file_id: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl HistoryEntry {
    pub fn new(file_id: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            file_id: file_id.into(),
            user_id,
        }
    }

    /// `?fileId=<id>&userId=<id>`, form encoded.
    pub fn url(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(FILE_ID, &self.file_id)
            .append_pair(USER_ID, self.user_id.as_deref().unwrap_or(""))
            .finish();
        format!("?{query}")
    }

    pub fn from_query(query: &str) -> Option<Self> {
        let params = SessionParams::parse(query);
        Some(Self {
            file_id: params.file_id()?.to_string(),
            user_id: params.user_id().map(str::to_string),
        })
    }
}
