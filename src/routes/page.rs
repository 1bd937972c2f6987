//! Server-rendered troubleshooting page.
//!
//! The page is a plain HTML form. Field values, the result, and error text
//! are escaped before interpolation. The inline script only mirrors the
//! server-side gate (button enabled iff some field is non-blank) and shows
//! the busy indicator once the form is submitted.

use std::fmt::Write;

use crate::error::ErrorCode;
use crate::form::{FormState, Phase};

pub const DOWNLOAD_FILENAME: &str = "maintenance_troubleshooting_plan.txt";

const PENDING_REFRESH_SECS: u32 = 3;

const STYLE: &str = r"
body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; color: #1f2328; }
h1 { margin-bottom: 0.2rem; }
.caption { color: #59636e; margin-top: 0; }
label { display: block; font-weight: 600; margin: 1rem 0 0.3rem; }
input[type=text], textarea { width: 100%; box-sizing: border-box; padding: 0.5rem; font: inherit; }
.row { display: flex; gap: 1rem; }
.row > div { flex: 1; }
.actions { display: flex; gap: 0.6rem; margin-top: 1rem; align-items: center; }
button { padding: 0.5rem 1.2rem; font: inherit; cursor: pointer; }
button.primary { background: #1f6feb; color: #fff; border: none; border-radius: 4px; }
button:disabled { opacity: 0.5; cursor: not-allowed; }
.banner { padding: 0.7rem 1rem; border-radius: 4px; margin: 1rem 0; }
.banner.error { background: #ffebe9; border: 1px solid #ff8182; }
.banner.busy { background: #ddf4ff; border: 1px solid #54aeff; }
pre.result { white-space: pre-wrap; background: #f6f8fa; padding: 1rem; border-radius: 4px; }
hr { margin: 1.5rem 0; border: none; border-top: 1px solid #d1d9e0; }
";

const SCRIPT: &str = r"
(function () {
  const form = document.getElementById('troubleshoot-form');
  const button = document.getElementById('troubleshoot-button');
  const busy = document.getElementById('busy');
  const inputs = Array.from(form.querySelectorAll('[data-field]'));
  const usable = () => inputs.some((input) => input.value.trim() !== '');
  const gate = () => { if (!form.dataset.pending) { button.disabled = !usable(); } };
  inputs.forEach((input) => input.addEventListener('input', gate));
  form.addEventListener('submit', (event) => {
    if (form.dataset.pending || !usable()) { event.preventDefault(); return; }
    form.dataset.pending = '1';
    button.disabled = true;
    busy.hidden = false;
  });
  gate();
})();
";

/// Render the full page for one session. `error` is the failure of the
/// request being answered, if any; otherwise a failure recorded in the
/// session phase is shown.
#[must_use]
pub fn render(form: &FormState, error: Option<&dyn ErrorCode>) -> String {
    let pending = form.is_pending();
    let fields = form.field_values();

    let mut html = String::with_capacity(4096);
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if pending {
        let _ = writeln!(html, "<meta http-equiv=\"refresh\" content=\"{PENDING_REFRESH_SECS}\">");
    }
    html.push_str("<title>Maintenance Troubleshooter</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<h1>\u{1f527} Maintenance Troubleshooter</h1>\n");
    html.push_str("<p class=\"caption\">Type a problem. Get a fast troubleshooting plan.</p>\n");

    if let Some(err) = error {
        push_error_banner(&mut html, err.error_code(), &err.to_string());
    } else if let Phase::ErrorShown { code, message } = form.phase() {
        push_error_banner(&mut html, code, message);
    }

    let _ = writeln!(
        html,
        "<form id=\"troubleshoot-form\" method=\"post\" action=\"/troubleshoot\"{}>",
        if pending { " data-pending=\"1\"" } else { "" }
    );
    let _ = writeln!(html, "<input type=\"hidden\" name=\"form_id\" value=\"{}\">", form.form_id());
    html.push_str("<div class=\"row\">\n<div>\n");
    push_text_input(&mut html, "machine_model", "Machine / control model", "e.g. Haas VF2, Fanuc 31i", &fields.machine_model);
    html.push_str("</div>\n<div>\n");
    push_text_input(&mut html, "alarm_code", "Alarm code", "e.g. SV0407", &fields.alarm_code);
    html.push_str("</div>\n</div>\n");
    let _ = writeln!(
        html,
        "<label for=\"problem_text\">Describe the problem</label>\n\
         <textarea id=\"problem_text\" name=\"problem_text\" rows=\"6\" data-field \
         placeholder=\"Example: Motor trips overload after 15 minutes on a pump. 480V 3-phase.\">{}</textarea>",
        escape_html(&fields.problem_text)
    );
    html.push_str("<div class=\"actions\">\n");
    let _ = writeln!(
        html,
        "<button id=\"troubleshoot-button\" class=\"primary\" type=\"submit\"{}>Troubleshoot</button>",
        if pending || !form.has_usable_input() { " disabled" } else { "" }
    );
    html.push_str("<button type=\"submit\" form=\"reset-form\">Reset</button>\n</div>\n</form>\n");
    html.push_str("<form id=\"reset-form\" method=\"post\" action=\"/reset\"></form>\n");

    let _ = writeln!(
        html,
        "<div id=\"busy\" class=\"banner busy\"{}>Troubleshooting\u{2026} waiting for the plan.</div>",
        if pending { "" } else { " hidden" }
    );

    if let Some(result) = form.last_result() {
        html.push_str("<hr>\n<h2>Troubleshooting plan</h2>\n");
        let _ = writeln!(html, "<pre class=\"result\">{}</pre>", escape_html(result));
        let _ = writeln!(
            html,
            "<p><a href=\"/download\" download=\"{DOWNLOAD_FILENAME}\">Download plan (.txt)</a></p>"
        );
    }

    html.push_str("<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn push_text_input(html: &mut String, name: &str, label: &str, placeholder: &str, value: &str) {
    let _ = writeln!(
        html,
        "<label for=\"{name}\">{label}</label>\n\
         <input type=\"text\" id=\"{name}\" name=\"{name}\" data-field placeholder=\"{placeholder}\" value=\"{}\">",
        escape_html(value)
    );
}

fn push_error_banner(html: &mut String, code: &str, message: &str) {
    let _ = writeln!(
        html,
        "<div class=\"banner error\" role=\"alert\"><strong>{}</strong> {}</div>",
        escape_html(code),
        escape_html(message)
    );
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
