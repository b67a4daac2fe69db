use serde::Deserialize;

use formstate_path::PathOptions;

/// Per-form engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Start the session in validate-all mode (edit forms often do).
    pub initial_validate_all: bool,
    /// Drop back to touched-only validation after a step is left.
    pub reset_validate_all_on_advance: bool,
    /// Limits for the string-path convenience methods.
    pub path: PathOptions,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            initial_validate_all: false,
            reset_validate_all_on_advance: true,
            path: PathOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_config() {
        let opts: FormOptions = serde_json::from_value(json!({"initial_validate_all": true})).unwrap();
        assert!(opts.initial_validate_all);
        assert!(opts.reset_validate_all_on_advance);
        assert_eq!(opts.path.max_depth, formstate_path::MAX_PATH_DEPTH);
        assert_eq!(opts.path.max_index, formstate_path::MAX_PATH_INDEX);

        let opts: FormOptions = serde_json::from_value(json!({"path": {"max_depth": 4}})).unwrap();
        assert_eq!(opts.path.max_depth, 4);
    }
}
