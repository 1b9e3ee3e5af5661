use codegenius_catalog::LanguageId;

use crate::console::ConsoleLine;

/// Fixed transcript shown for languages that are never executed.
/// （非網頁語言不會真正執行，只顯示固定的模擬輸出。）
///
/// Depends on the language name only; the code is not inspected.
pub fn simulated_transcript(language: LanguageId) -> Vec<ConsoleLine> {
    let name = language.display_name();
    vec![
        ConsoleLine::log(format!("Compiling {name}...")),
        ConsoleLine::log(format!("> Run {name} script")),
        ConsoleLine::log("[System]: Execution simulated for demo purposes."),
        ConsoleLine::log("[System]: Syntax check passed."),
        ConsoleLine::log("Output:"),
        ConsoleLine::log("(Program exited with code 0)"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_transcript_is_exact() {
        let lines: Vec<_> = simulated_transcript(LanguageId::Python)
            .iter()
            .map(|line| line.text().to_string())
            .collect();
        assert_eq!(
            lines,
            vec![
                "Compiling Python...",
                "> Run Python script",
                "[System]: Execution simulated for demo purposes.",
                "[System]: Syntax check passed.",
                "Output:",
                "(Program exited with code 0)",
            ]
        );
    }

    #[test]
    fn transcript_has_no_error_lines() {
        for language in LanguageId::all() {
            let transcript = simulated_transcript(language);
            assert_eq!(transcript.len(), 6);
            assert!(transcript.iter().all(|line| !line.is_error()));
        }
    }
}
