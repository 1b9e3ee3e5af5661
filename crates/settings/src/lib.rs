pub mod preferences;

pub use preferences::{
    default_preferences_path, GenerationPreferences, Preferences, PreferencesError,
    PreferencesStore, PreviewPreferences,
};
