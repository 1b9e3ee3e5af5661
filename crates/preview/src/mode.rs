use codegenius_catalog::{LanguageId, RenderStrategy};

/// How a run is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Code becomes a sandboxed document.
    WebDocument,
    /// Code is not executed; a fixed transcript is shown.
    Simulated,
}

/// Picks the render mode for a language. Never looks at the code.
/// （依語言選擇呈現模式，不檢視程式碼內容。）
pub fn select_mode(language: LanguageId) -> RenderMode {
    match language.strategy() {
        RenderStrategy::Markup | RenderStrategy::Stylesheet | RenderStrategy::Script => {
            RenderMode::WebDocument
        }
        RenderStrategy::Simulated => RenderMode::Simulated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_table_is_total() {
        use LanguageId::*;
        let expected = [
            (Html, RenderMode::WebDocument),
            (Css, RenderMode::WebDocument),
            (JavaScript, RenderMode::WebDocument),
            (TypeScript, RenderMode::Simulated),
            (Jsx, RenderMode::Simulated),
            (Tsx, RenderMode::Simulated),
            (Python, RenderMode::Simulated),
            (Java, RenderMode::Simulated),
            (Kotlin, RenderMode::Simulated),
            (Swift, RenderMode::Simulated),
            (C, RenderMode::Simulated),
            (Cpp, RenderMode::Simulated),
            (CSharp, RenderMode::Simulated),
            (Go, RenderMode::Simulated),
            (Rust, RenderMode::Simulated),
            (Dart, RenderMode::Simulated),
            (Php, RenderMode::Simulated),
            (Ruby, RenderMode::Simulated),
            (Sql, RenderMode::Simulated),
            (Markdown, RenderMode::Simulated),
        ];
        assert_eq!(expected.len(), LanguageId::all().count());
        for (language, mode) in expected {
            assert_eq!(select_mode(language), mode, "{language}");
        }
    }
}
