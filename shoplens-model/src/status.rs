/// Externally visible state of a check, as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CheckStatus {
    InProgress,
    Succeeded,
    Failed,
}

/// JSON document served to polling clients.
///
/// Field names are a wire contract shared with the browser extension:
/// `status`, `reason`, `is_shopify`, `domain`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusReport {
    pub status: CheckStatus,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none", default)
    )]
    pub reason: Option<String>,
    pub is_shopify: bool,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none", default)
    )]
    pub domain: Option<String>,
}

impl StatusReport {
    pub fn in_progress() -> Self {
        Self {
            status: CheckStatus::InProgress,
            reason: None,
            is_shopify: false,
            domain: None,
        }
    }

    pub fn succeeded(reason: Option<String>) -> Self {
        Self {
            status: CheckStatus::Succeeded,
            reason,
            is_shopify: true,
            domain: None,
        }
    }

    pub fn failed(reason: Option<String>) -> Self {
        Self {
            status: CheckStatus::Failed,
            reason,
            is_shopify: false,
            domain: None,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn in_progress_omits_optional_fields() {
        let json = serde_json::to_value(StatusReport::in_progress()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "in_progress", "is_shopify": false})
        );
    }

    #[test]
    fn succeeded_carries_reason() {
        let report =
            StatusReport::succeeded(Some("Found 'myshopify' in page content".into()));
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["is_shopify"], true);
        assert_eq!(json["reason"], "Found 'myshopify' in page content");
    }
}
