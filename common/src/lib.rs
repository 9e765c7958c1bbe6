pub mod demo_analysis;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub demo_id: String,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParseResponse {
    pub status: String,
}

impl ParseResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_owned(),
        }
    }
}
