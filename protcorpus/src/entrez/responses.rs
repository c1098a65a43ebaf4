use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ESearchResult {
    pub esearchresult: ESearchData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ESearchData {
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub idlist: Vec<String>,
    /// WebEnv session identifier for the history server
    #[serde(default)]
    pub webenv: Option<String>,
    /// Query key within the WebEnv session
    #[serde(default, rename = "querykey")]
    pub query_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EPostResponse {
    pub epostresult: EPostData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EPostData {
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
    #[serde(default)]
    pub webenv: Option<String>,
    #[serde(default, rename = "querykey")]
    pub query_key: Option<String>,
}
