//! User preferences for card export, persisted as versioned JSON.
//! 卡片匯出的使用者偏好設定，以具版本號的 JSON 保存。

mod preferences;

pub use preferences::{
    ExportPreferences, Preferences, PreferencesError, PreferencesStore, PREFERENCES_DIR_NAME,
    PREFERENCES_FILE_NAME,
};
