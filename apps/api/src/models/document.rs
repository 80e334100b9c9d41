use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Row in the `documents` table: one generated email or report, owned by
/// the user who requested it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub user_id: i64,
    pub doc_type: String,
    pub title: Option<String>,
    pub prompt_input: Option<String>,
    pub content: String,
    pub tone: String,
    pub structure: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Length of the content preview returned by history listings.
const PREVIEW_LENGTH: usize = 200;

/// Compact listing shape for history pages: metadata plus a content preview.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub doc_type: String,
    pub title: Option<String>,
    pub tone: String,
    pub structure: Option<String>,
    pub created_at: DateTime<Utc>,
    pub content_preview: String,
}

impl From<&DocumentRow> for DocumentSummary {
    fn from(row: &DocumentRow) -> Self {
        let content_preview = if row.content.chars().count() > PREVIEW_LENGTH {
            let truncated: String = row.content.chars().take(PREVIEW_LENGTH).collect();
            format!("{truncated}...")
        } else {
            row.content.clone()
        };

        DocumentSummary {
            id: row.id,
            doc_type: row.doc_type.clone(),
            title: row.title.clone(),
            tone: row.tone.clone(),
            structure: row.structure.clone(),
            created_at: row.created_at,
            content_preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_content(content: &str) -> DocumentRow {
        DocumentRow {
            id: 1,
            user_id: 1,
            doc_type: "email".to_string(),
            title: None,
            prompt_input: None,
            content: content.to_string(),
            tone: "professional".to_string(),
            structure: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_short_content_not_truncated() {
        let summary = DocumentSummary::from(&row_with_content("short body"));
        assert_eq!(summary.content_preview, "short body");
    }

    #[test]
    fn test_long_content_truncated_with_ellipsis() {
        let summary = DocumentSummary::from(&row_with_content(&"x".repeat(300)));
        assert_eq!(summary.content_preview.chars().count(), 203);
        assert!(summary.content_preview.ends_with("..."));
    }
}
