//! Builds the standalone document shown for web languages.
//! （為網頁語言組合可獨立呈現的文件。）

use codegenius_catalog::{LanguageId, RenderStrategy};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::instrument::instrumentation_snippet;
use crate::resource::SessionId;

static HEAD_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("head tag pattern"));
static BODY_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<body(?:\s[^>]*)?>").expect("body tag pattern"));
static SCRIPT_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(script)").expect("script close pattern"));
static STYLE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(style)").expect("style close pattern"));

/// Where the instrumentation ended up in an HTML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionPoint {
    /// Right after the opening `<head>` tag.
    Head,
    /// Right after the opening `<body>` tag.
    Body,
    /// The code had neither; a minimal document was built around it.
    Wrapped,
}

/// Document text produced for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedDocument {
    pub html: String,
    pub injection: InjectionPoint,
}

/// Builds the preview document for `code`, or `None` for simulated languages.
pub fn synthesize_document(
    code: &str,
    language: LanguageId,
    session: SessionId,
) -> Option<SynthesizedDocument> {
    match language.strategy() {
        RenderStrategy::Markup => Some(markup_document(code, &instrumentation_snippet(session))),
        RenderStrategy::Stylesheet => Some(SynthesizedDocument {
            html: stylesheet_document(code),
            injection: InjectionPoint::Wrapped,
        }),
        RenderStrategy::Script => Some(SynthesizedDocument {
            html: script_document(code, &instrumentation_snippet(session)),
            injection: InjectionPoint::Head,
        }),
        RenderStrategy::Simulated => None,
    }
}

fn markup_document(code: &str, snippet: &str) -> SynthesizedDocument {
    for (pattern, point) in [
        (&*HEAD_OPEN, InjectionPoint::Head),
        (&*BODY_OPEN, InjectionPoint::Body),
    ] {
        if let Some(found) = pattern.find(code) {
            let mut html = String::with_capacity(code.len() + snippet.len());
            html.push_str(&code[..found.end()]);
            html.push_str(snippet);
            html.push_str(&code[found.end()..]);
            return SynthesizedDocument {
                html,
                injection: point,
            };
        }
    }

    SynthesizedDocument {
        html: format!(
            "<!DOCTYPE html><html><head>{snippet}</head><body>{code}</body></html>"
        ),
        injection: InjectionPoint::Wrapped,
    }
}

// Baseline rules live in a cascade layer so unlayered user rules always win.
const STYLESHEET_BASELINE: &str = r#"@layer codegenius-baseline {
  body { font-family: 'Inter', sans-serif; padding: 20px; color: #333; background: #fff; }
  .demo-box {
    padding: 20px;
    border: 2px dashed #ddd;
    border-radius: 8px;
    margin-top: 20px;
    text-align: center;
    background: #f9fafb;
  }
  .demo-box button { margin-top: 10px; padding: 8px 16px; cursor: pointer; }
  .demo-samples { margin-top: 20px; }
  h2 { color: #111; }
  p { color: #555; }
}"#;

const STYLESHEET_BODY: &str = r#"<h3>CSS Preview Mode</h3>
<p>The CSS generated is applied to this page.</p>

<div class="demo-box">
  <h2>Sample Heading</h2>
  <p>Sample paragraph text to demonstrate typography.</p>
  <button>Sample Button</button>
</div>

<div class="demo-samples">
  <div class="card">.card element</div>
  <div class="container">.container element</div>
  <button class="btn">.btn element</button>
</div>"#;

fn stylesheet_document(code: &str) -> String {
    let user = STYLE_CLOSE.replace_all(code, r"<\/$1");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<style>{user}</style>\n<style>{STYLESHEET_BASELINE}</style>\n</head>\n<body>\n{STYLESHEET_BODY}\n</body>\n</html>\n"
    )
}

const SCRIPT_PAGE_STYLE: &str =
    "body { margin: 0; font-family: sans-serif; background-color: #ffffff; } \
     .js-preview { padding: 20px; } \
     .js-preview h3 { margin-top: 0; color: #888; } \
     .js-preview p { font-size: 14px; color: #666; }";

fn script_document(code: &str, snippet: &str) -> String {
    let user = SCRIPT_CLOSE.replace_all(code, r"<\/$1");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>{snippet}<style>{SCRIPT_PAGE_STYLE}</style></head>\n<body>\n\
         <div class=\"js-preview\">\n\
         <h3>JavaScript Preview</h3>\n\
         <p>This is a sandbox for your JS code. Check the Console tab for output.</p>\n\
         <div id=\"app\"></div>\n\
         </div>\n\
         <script>\n\
         try {{\n{user}\n}} catch (e) {{\n  console.error(e);\n}}\n\
         </script>\n\
         </body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(code: &str, language: LanguageId) -> SynthesizedDocument {
        synthesize_document(code, language, SessionId::new(7)).expect("web language")
    }

    #[test]
    fn simulated_languages_have_no_document() {
        assert!(synthesize_document("print(1)", LanguageId::Python, SessionId::new(1)).is_none());
    }

    #[test]
    fn html_prefers_head_anchor() {
        let doc = build(
            "<html><head><title>t</title></head><body><p>x</p></body></html>",
            LanguageId::Html,
        );
        assert_eq!(doc.injection, InjectionPoint::Head);
        let snippet_at = doc.html.find("<script>").unwrap();
        assert!(snippet_at > doc.html.find("<head>").unwrap());
        assert!(snippet_at < doc.html.find("<title>").unwrap());
        assert_eq!(doc.html.matches("var session = 7;").count(), 1);
    }

    #[test]
    fn html_falls_back_to_body_anchor() {
        let doc = build("<body><h1>Hi</h1></body>", LanguageId::Html);
        assert_eq!(doc.injection, InjectionPoint::Body);
        assert!(doc.html.starts_with("<body><script>"));
        assert!(doc.html.find("<script>").unwrap() < doc.html.find("<h1>").unwrap());
        assert!(doc.html.ends_with("<h1>Hi</h1></body>"));
    }

    #[test]
    fn html_anchor_match_is_case_insensitive_and_allows_attributes() {
        let doc = build(r#"<BODY class="dark"><p>x</p></BODY>"#, LanguageId::Html);
        assert_eq!(doc.injection, InjectionPoint::Body);
        assert!(doc.html.starts_with(r#"<BODY class="dark"><script>"#));
    }

    #[test]
    fn header_element_is_not_a_head_anchor() {
        let doc = build("<header>Top</header><p>x</p>", LanguageId::Html);
        assert_eq!(doc.injection, InjectionPoint::Wrapped);
        assert!(doc.html.starts_with("<!DOCTYPE html><html><head><script>"));
        assert!(doc
            .html
            .ends_with("</head><body><header>Top</header><p>x</p></body></html>"));
    }

    #[test]
    fn stylesheet_is_applied_before_layered_baseline() {
        let doc = build("h2 { color: red; }", LanguageId::Css);
        let user_at = doc.html.find("h2 { color: red; }").unwrap();
        let baseline_at = doc.html.find("@layer codegenius-baseline").unwrap();
        assert!(user_at < baseline_at);
        for sample in ["<h2>", "<p>", "<button", "class=\"card\"", "class=\"container\"", "class=\"btn\""] {
            assert!(doc.html.contains(sample), "missing {sample}");
        }
        assert!(!doc.html.contains("style=\""), "inline styles would beat user rules");
    }

    #[test]
    fn stylesheet_document_carries_no_instrumentation() {
        let doc = build("p { margin: 0; }", LanguageId::Css);
        assert!(!doc.html.contains("postMessage"));
        assert!(!doc.html.contains("<script>"));
    }

    #[test]
    fn stylesheet_cannot_close_its_style_element() {
        let doc = build("p { color: red; } </STYLE><script>alert(1)</script>", LanguageId::Css);
        assert!(doc.html.contains(r"<\/STYLE><script>alert(1)</script>"));
        assert_eq!(doc.html.matches("</style>").count(), 2);
    }

    #[test]
    fn script_runs_guarded_after_instrumentation() {
        let doc = build("console.log('hi');", LanguageId::JavaScript);
        let snippet_at = doc.html.find("var session = 7;").unwrap();
        let user_at = doc.html.find("console.log('hi');").unwrap();
        assert!(snippet_at < user_at);
        let try_at = doc.html.find("try {\nconsole.log('hi');\n}").unwrap();
        assert!(try_at < user_at);
        assert!(doc.html.contains("} catch (e) {\n  console.error(e);\n}"));
        assert!(doc.html.contains("<div id=\"app\"></div>"));
    }

    #[test]
    fn script_cannot_close_its_script_element() {
        let doc = build("var s = '</script><b>x</b>';", LanguageId::JavaScript);
        assert!(doc.html.contains(r"var s = '<\/script><b>x</b>';"));
    }
}
