use crate::foundation::error::DrapeError;

/// Category of a user-visible notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    AssetLoad,
    Persist,
    Validation,
    Render,
}

/// A failure converted at its operation boundary into something the host can show.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Source URL for asset failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub retryable: bool,
}

impl Notice {
    pub fn asset_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            kind: NoticeKind::AssetLoad,
            message: format!("could not load '{url}': {}", reason.into()),
            url: Some(url),
            retryable: true,
        }
    }

    pub fn persist(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Persist,
            message: message.into(),
            url: None,
            retryable: true,
        }
    }
}

impl From<&DrapeError> for Notice {
    fn from(e: &DrapeError) -> Self {
        match e {
            DrapeError::AssetLoad { url, reason } => Self::asset_load(url.as_str(), reason.as_str()),
            DrapeError::Persist(msg) => Self::persist(msg.as_str()),
            DrapeError::Validation(msg) => Self {
                kind: NoticeKind::Validation,
                message: msg.clone(),
                url: None,
                retryable: false,
            },
            other => Self {
                kind: NoticeKind::Render,
                message: other.to_string(),
                url: None,
                retryable: other.is_retryable(),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/notice.rs"]
mod tests;
