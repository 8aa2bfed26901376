//! FILENAME: core/engine/src/labels.rs
//! PURPOSE: Localized strings and formatters used when rendering and exporting cells.

use crate::date_format::{GregorianFallback, HebrewDateFormatter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// User-visible strings. Defaults are Hebrew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Labels {
    pub yes: String,
    pub no: String,
    /// Placeholder for null, missing and empty values.
    pub empty_value: String,
    pub lookup_error: String,
    pub lookup_loading: String,
    pub load_failed: String,
    pub no_results: String,
    pub live: String,
    pub offline: String,
    pub actions_header: String,
    pub fullscreen: String,
    pub exit_fullscreen: String,
    pub export: String,
    pub reset: String,
    pub columns: String,
    pub edit: String,
    pub delete: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            yes: "כן".to_string(),
            no: "לא".to_string(),
            empty_value: "-".to_string(),
            lookup_error: "שגיאה".to_string(),
            lookup_loading: "טוען...".to_string(),
            load_failed: "שגיאה בטעינת הנתונים".to_string(),
            no_results: "לא נמצאו תוצאות".to_string(),
            live: "פעיל".to_string(),
            offline: "לא פעיל".to_string(),
            actions_header: "פעולות".to_string(),
            fullscreen: "מסך מלא".to_string(),
            exit_fullscreen: "יציאה ממסך מלא".to_string(),
            export: "ייצוא לאקסל".to_string(),
            reset: "איפוס סינון ומיון".to_string(),
            columns: "עמודות".to_string(),
            edit: "עריכה".to_string(),
            delete: "מחיקה".to_string(),
        }
    }
}

impl Labels {
    pub fn boolean(&self, value: bool) -> &str {
        if value {
            &self.yes
        } else {
            &self.no
        }
    }
}

/// Labels plus the injected Hebrew calendar formatter.
#[derive(Debug, Clone)]
pub struct Localization {
    pub labels: Labels,
    pub hebrew: Arc<dyn HebrewDateFormatter>,
}

impl Localization {
    pub fn new(labels: Labels, hebrew: Arc<dyn HebrewDateFormatter>) -> Self {
        Localization { labels, hebrew }
    }
}

impl Default for Localization {
    fn default() -> Self {
        Localization {
            labels: Labels::default(),
            hebrew: Arc::new(GregorianFallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_labels_keep_defaults() {
        let labels: Labels = serde_json::from_str(r#"{ "emptyValue": "—", "yes": "Yes" }"#).unwrap();
        assert_eq!(labels.empty_value, "—");
        assert_eq!(labels.boolean(true), "Yes");
        assert_eq!(labels.boolean(false), "לא");
    }
}
