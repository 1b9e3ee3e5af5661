//! Static catalog of the languages CodeGenius can generate and preview.
//! （CodeGenius 可產生與預覽之語言的靜態目錄。）
//!
//! The catalog is data only: each language carries display metadata and the
//! render strategy the preview engine should use. Adding a language means
//! adding a row to [`CATALOG`] and a variant to [`LanguageId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Identifier of a supported language.
/// （支援語言的識別子。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LanguageId {
    Html,
    Css,
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Python,
    Java,
    Kotlin,
    Swift,
    C,
    Cpp,
    CSharp,
    Go,
    Rust,
    Dart,
    Php,
    Ruby,
    Sql,
    Markdown,
}

/// How the preview engine should treat code written in a language.
/// （預覽引擎處理該語言程式碼的方式。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStrategy {
    /// Code is a markup document rendered as-is.
    Markup,
    /// Code is a stylesheet applied to a demonstration page.
    Stylesheet,
    /// Code is a classic script run inside a blank page.
    Script,
    /// No real execution; a disclosed simulation is shown instead.
    Simulated,
}

impl RenderStrategy {
    pub fn is_web(self) -> bool {
        !matches!(self, RenderStrategy::Simulated)
    }
}

/// Icon keys understood by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKey {
    Globe,
    Codepen,
    FileCode,
    Terminal,
    Cpu,
    Layers,
    Database,
    FileType,
}

impl IconKey {
    pub fn as_str(self) -> &'static str {
        match self {
            IconKey::Globe => "globe",
            IconKey::Codepen => "codepen",
            IconKey::FileCode => "file-code",
            IconKey::Terminal => "terminal",
            IconKey::Cpu => "cpu",
            IconKey::Layers => "layers",
            IconKey::Database => "database",
            IconKey::FileType => "file-type",
        }
    }
}

/// Display metadata and strategy for one language.
/// （單一語言的顯示資訊與預覽策略。）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    pub id: LanguageId,
    pub display_name: &'static str,
    pub icon: IconKey,
    pub extension: &'static str,
    pub aliases: &'static [&'static str],
    pub strategy: RenderStrategy,
}

impl LanguageInfo {
    const fn new(
        id: LanguageId,
        display_name: &'static str,
        icon: IconKey,
        extension: &'static str,
        aliases: &'static [&'static str],
        strategy: RenderStrategy,
    ) -> Self {
        Self {
            id,
            display_name,
            icon,
            extension,
            aliases,
            strategy,
        }
    }
}

use IconKey as I;
use LanguageId as L;
use RenderStrategy as R;

/// Catalog rows, in picker order.
pub static CATALOG: [LanguageInfo; 20] = [
    LanguageInfo::new(L::Html, "HTML", I::Globe, "html", &["htm"], R::Markup),
    LanguageInfo::new(L::Css, "CSS", I::Codepen, "css", &[], R::Stylesheet),
    LanguageInfo::new(L::JavaScript, "JavaScript", I::FileCode, "js", &["js", "mjs"], R::Script),
    LanguageInfo::new(L::TypeScript, "TypeScript", I::FileCode, "ts", &["ts"], R::Simulated),
    LanguageInfo::new(L::Jsx, "JSX", I::FileCode, "jsx", &[], R::Simulated),
    LanguageInfo::new(L::Tsx, "TSX", I::FileCode, "tsx", &[], R::Simulated),
    LanguageInfo::new(L::Python, "Python", I::Terminal, "py", &["py"], R::Simulated),
    LanguageInfo::new(L::Java, "Java", I::Codepen, "java", &[], R::Simulated),
    LanguageInfo::new(L::Kotlin, "Kotlin", I::Codepen, "kt", &["kt"], R::Simulated),
    LanguageInfo::new(L::Swift, "Swift", I::Codepen, "swift", &[], R::Simulated),
    LanguageInfo::new(L::C, "C", I::Cpu, "c", &[], R::Simulated),
    LanguageInfo::new(L::Cpp, "C++", I::Cpu, "cpp", &["cpp", "cxx"], R::Simulated),
    LanguageInfo::new(L::CSharp, "C#", I::Codepen, "cs", &["cs", "csharp"], R::Simulated),
    LanguageInfo::new(L::Go, "Go", I::Codepen, "go", &["golang"], R::Simulated),
    LanguageInfo::new(L::Rust, "Rust", I::Layers, "rs", &["rs"], R::Simulated),
    LanguageInfo::new(L::Dart, "Dart", I::Codepen, "dart", &[], R::Simulated),
    LanguageInfo::new(L::Php, "PHP", I::Globe, "php", &[], R::Simulated),
    LanguageInfo::new(L::Ruby, "Ruby", I::Codepen, "rb", &["rb"], R::Simulated),
    LanguageInfo::new(L::Sql, "SQL", I::Database, "sql", &[], R::Simulated),
    LanguageInfo::new(L::Markdown, "Markdown", I::FileType, "md", &["md"], R::Simulated),
];

/// Prompt suggestions offered under the prompt box.
pub const SUGGESTIONS: [&str; 4] = [
    "Create a responsive navbar with a logo",
    "Generate a Python function to calculate Fibonacci",
    "Create a Java class for a simple banking system",
    "Write a Flutter widget for a custom card",
];

/// Placeholder shown by an empty editor.
pub const DEFAULT_CODE_PLACEHOLDER: &str = "// Generated code will appear here";

/// Language selected when the application starts.
pub const DEFAULT_LANGUAGE: LanguageId = LanguageId::Html;

impl LanguageId {
    /// Every language in picker order.
    pub fn all() -> impl Iterator<Item = LanguageId> {
        CATALOG.iter().map(|info| info.id)
    }

    /// Catalog row for this language.
    /// （取得此語言的目錄資料。）
    pub fn info(self) -> &'static LanguageInfo {
        // Rows are declared in variant order.
        let info = &CATALOG[self as usize];
        debug_assert_eq!(info.id, self);
        info
    }

    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    pub fn strategy(self) -> RenderStrategy {
        self.info().strategy
    }

    /// Whether the language has a renderable preview surface.
    pub fn is_web_renderable(self) -> bool {
        self.strategy().is_web()
    }

    /// Guesses a language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<LanguageId> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        CATALOG
            .iter()
            .find(|info| info.extension == ext || info.aliases.contains(&ext.as_str()))
            .map(|info| info.id)
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Raised when text does not name a catalog language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown language `{0}`")]
pub struct LanguageParseError(pub String);

impl FromStr for LanguageId {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let needle = input.trim();
        CATALOG
            .iter()
            .find(|info| {
                info.display_name.eq_ignore_ascii_case(needle)
                    || info
                        .aliases
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(needle))
            })
            .map(|info| info.id)
            .ok_or_else(|| LanguageParseError(input.to_string()))
    }
}

impl Serialize for LanguageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for LanguageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_variant_order() {
        for (index, info) in CATALOG.iter().enumerate() {
            assert_eq!(info.id as usize, index, "row {} out of order", info.display_name);
        }
        assert_eq!(LanguageId::all().count(), 20);
    }

    #[test]
    fn only_html_css_and_javascript_are_web() {
        let web: Vec<_> = LanguageId::all()
            .filter(|lang| lang.is_web_renderable())
            .collect();
        assert_eq!(
            web,
            vec![LanguageId::Html, LanguageId::Css, LanguageId::JavaScript]
        );
    }

    #[test]
    fn parse_accepts_display_names_and_aliases() {
        assert_eq!("html".parse::<LanguageId>().unwrap(), LanguageId::Html);
        assert_eq!("C++".parse::<LanguageId>().unwrap(), LanguageId::Cpp);
        assert_eq!("csharp".parse::<LanguageId>().unwrap(), LanguageId::CSharp);
        assert_eq!(" js ".parse::<LanguageId>().unwrap(), LanguageId::JavaScript);
        assert_eq!("SQL".parse::<LanguageId>().unwrap(), LanguageId::Sql);
        let err = "cobol".parse::<LanguageId>().unwrap_err();
        assert_eq!(err.to_string(), "unknown language `cobol`");
    }

    #[test]
    fn every_display_name_round_trips_through_parse() {
        for lang in LanguageId::all() {
            assert_eq!(lang.display_name().parse::<LanguageId>().unwrap(), lang);
        }
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(LanguageId::from_extension("py"), Some(LanguageId::Python));
        assert_eq!(LanguageId::from_extension(".HTM"), Some(LanguageId::Html));
        assert_eq!(LanguageId::from_extension("rs"), Some(LanguageId::Rust));
        assert_eq!(LanguageId::from_extension("exe"), None);
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&LanguageId::CSharp).unwrap();
        assert_eq!(json, "\"C#\"");
        let back: LanguageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LanguageId::CSharp);
    }
}
