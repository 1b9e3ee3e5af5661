//! Console instrumentation injected into every web preview.
//!
//! The snippet overrides `console.log`, `console.error` and `window.onerror`
//! inside the sandboxed document and forwards each call to the host as
//! `{ type, message, session }`. Nothing in the snippet may throw.

use crate::resource::SessionId;

const SESSION_PLACEHOLDER: &str = "__CODEGENIUS_SESSION__";

const SNIPPET_TEMPLATE: &str = r#"<script>
(function () {
  var session = __CODEGENIUS_SESSION__;
  var originalLog = console.log;
  var originalError = console.error;

  function serialize(args) {
    return Array.prototype.map.call(args, function (arg) {
      if (arg instanceof Error) return arg.name + ': ' + arg.message;
      if (typeof arg === 'object') return JSON.stringify(arg);
      return String(arg);
    }).join(' ');
  }

  function send(type, args) {
    try {
      window.parent.postMessage({ type: type, message: serialize(args), session: session }, '*');
    } catch (e) {
      // unserializable arguments are dropped
    }
  }

  console.log = function () {
    originalLog.apply(console, arguments);
    send('console', arguments);
  };

  console.error = function () {
    originalError.apply(console, arguments);
    send('error', arguments);
  };

  window.onerror = function (msg, url, line) {
    try {
      window.parent.postMessage({ type: 'error', message: msg + ' (Line ' + line + ')', session: session }, '*');
    } catch (e) {
      // ignore
    }
  };
})();
</script>"#;

/// Returns the instrumentation `<script>` element for the given run.
/// （回傳指定執行階段所用的主控台攔截腳本。）
pub fn instrumentation_snippet(session: SessionId) -> String {
    SNIPPET_TEMPLATE.replace(SESSION_PLACEHOLDER, &session.get().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_stamped_with_session() {
        let snippet = instrumentation_snippet(SessionId::new(42));
        assert!(snippet.starts_with("<script>"));
        assert!(snippet.ends_with("</script>"));
        assert!(snippet.contains("var session = 42;"));
        assert!(!snippet.contains(SESSION_PLACEHOLDER));
    }

    #[test]
    fn snippet_overrides_all_reporting_entry_points() {
        let snippet = instrumentation_snippet(SessionId::new(1));
        assert!(snippet.contains("console.log = function"));
        assert!(snippet.contains("console.error = function"));
        assert!(snippet.contains("window.onerror = function"));
        assert!(snippet.contains("send('console', arguments)"));
        assert!(snippet.contains("send('error', arguments)"));
        assert!(snippet.contains("try {"), "posting must be guarded");
    }
}
