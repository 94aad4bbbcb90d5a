use tablechat_data::{ChartKind, ChartSpec, Dataset};
use tablechat_types::{ChatTurn, Role, Temperature, HALLUCINATION_THRESHOLD};

use crate::web::protocol::Notice;
use crate::web::session_manager::{SessionId, SessionState};

const STYLE: &str = include_str!("../../web/style.css");
const VEGA_SCRIPTS: &str = r#"<script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
<script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
<script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>"#;

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escaped text with line breaks kept
fn escape_multiline(s: &str) -> String {
    escape_html(s).replace('\n', "<br>")
}

/// JSON is embedded in a <script> element, so a literal "</" must not
/// appear in it.
fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Render the whole session page
pub fn render_page(session_id: SessionId, state: &SessionState, preview_rows: usize) -> String {
    let mut body = String::new();

    body.push_str(&render_sidebar(session_id, state.temperature));
    body.push_str("<main>\n<h1>Table Agent</h1>\n");
    body.push_str("<p>Upload a CSV or XLSX file and query answers from your data.</p>\n");

    if let Some(notice) = &state.notice {
        body.push_str(&render_notice(notice));
    }

    body.push_str(&render_upload_form(session_id, state.file_name.as_deref()));

    match &state.dataset {
        Some(dataset) => {
            body.push_str(&render_preview(dataset, preview_rows));
            body.push_str(&render_chart_form(session_id, dataset, state.chart.as_ref()));
            if let Some(chart) = &state.chart {
                body.push_str(&render_chart(chart));
            }
            body.push_str(&render_query_form(session_id, state.temperature));
        }
        None => body.push_str(&render_notice(&Notice::Warning("No file uploaded yet.".to_string()))),
    }

    body.push_str(&render_history(state.history.newest_first()));
    body.push_str("</main>\n");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Table Agent</title>\n<style>\n{}</style>\n{}\n</head>\n<body>\n{}</body>\n</html>\n",
        STYLE, VEGA_SCRIPTS, body
    )
}

fn render_notice(notice: &Notice) -> String {
    format!(
        "<div class=\"{}\">{}</div>\n",
        notice.css_class(),
        escape_multiline(notice.message())
    )
}

fn render_sidebar(session_id: SessionId, temperature: Temperature) -> String {
    format!(
        r#"<aside>
<h3>Settings</h3>
<form method="post" action="/session/{id}/settings">
<label for="settings-temperature">LLM Temperature: <output id="temperature-value">{temp}</output></label><br>
<input type="range" id="settings-temperature" name="temperature" min="0" max="1" step="0.01" value="{temp}"
 oninput="document.getElementById('temperature-value').value = Number(this.value).toFixed(2); var q = document.getElementById('query-temperature'); if (q) q.value = this.value">
<button type="submit">Apply</button>
</form>
<p class="hint">Adjust the LLM Temperature: a higher value makes the output more random, while a lower value makes it more deterministic.</p>
<p class="hint">NOTE: Anything above {threshold} may produce hallucinations</p>
<hr>
<p class="hint">You will need an OpenAI API key to chat. Set <code>OPENAI_API_KEY</code> in the environment or a <code>.env</code> file, or put <code>openai_api_key</code> in <code>secrets.toml</code>.</p>
</aside>
"#,
        id = session_id,
        temp = temperature,
        threshold = HALLUCINATION_THRESHOLD,
    )
}

fn render_upload_form(session_id: SessionId, file_name: Option<&str>) -> String {
    let current = file_name
        .map(|name| format!("<p class=\"hint\">Current file: {}</p>\n", escape_html(name)))
        .unwrap_or_default();

    format!(
        r#"<form method="post" action="/session/{}/upload" enctype="multipart/form-data">
<label for="file">Upload CSV or XLSX file</label><br>
<input type="file" id="file" name="file" accept=".csv,.xlsx,text/csv,application/vnd.openxmlformats-officedocument.spreadsheetml.sheet">
<button type="submit">Upload</button>
</form>
{}"#,
        session_id, current
    )
}

/// Data preview table followed by the column list
pub fn render_preview(dataset: &Dataset, rows: usize) -> String {
    let mut html = String::from("<h3>Data Preview:</h3>\n<table class=\"preview\">\n<tr><th></th>");
    for column in dataset.columns() {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr>\n");

    for (i, row) in dataset.head(rows).iter().enumerate() {
        html.push_str(&format!("<tr><th>{}</th>", i));
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell.to_string())));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    html.push_str("<h3>Available Columns:</h3>\n<ul class=\"columns\">\n");
    for column in dataset.columns() {
        html.push_str(&format!("<li>{}</li>\n", escape_html(column)));
    }
    html.push_str("</ul>\n");
    html
}

fn column_options(dataset: &Dataset, selected: Option<&str>) -> String {
    dataset
        .columns()
        .iter()
        .map(|c| {
            let attr = if Some(c.as_str()) == selected { " selected" } else { "" };
            format!("<option value=\"{0}\"{1}>{0}</option>", escape_html(c), attr)
        })
        .collect()
}

fn render_chart_form(session_id: SessionId, dataset: &Dataset, chart: Option<&ChartSpec>) -> String {
    let request = chart.map(|c| &c.request);
    let kinds: String = ChartKind::ALL
        .iter()
        .map(|kind| {
            let attr = if request.map(|r| r.kind) == Some(*kind) { " selected" } else { "" };
            format!("<option value=\"{}\"{}>{}</option>", kind.key(), attr, kind.label())
        })
        .collect();

    format!(
        r#"<form method="post" action="/session/{id}/chart">
<label>Choose a chart type <select name="chart_type">{kinds}</select></label><br>
<label>Choose the x-axis column <select name="x_column">{x}</select></label><br>
<label>Choose the y-axis column <select name="y_column">{y}</select></label><br>
<button type="submit">Generate Chart</button>
</form>
"#,
        id = session_id,
        kinds = kinds,
        x = column_options(dataset, request.map(|r| r.x_column.as_str())),
        y = column_options(dataset, request.map(|r| r.y_column.as_str())),
    )
}

fn render_chart(chart: &ChartSpec) -> String {
    format!(
        "<div id=\"chart\"></div>\n<script>\nvegaEmbed('#chart', {}, {{ actions: false }});\n</script>\n",
        script_safe_json(&chart.to_json())
    )
}

fn render_query_form(session_id: SessionId, temperature: Temperature) -> String {
    format!(
        r#"<form method="post" action="/session/{}/execute" onsubmit="this.classList.add('busy')">
<label for="query">Enter a query:</label><br>
<input type="text" id="query" name="query" size="60">
<input type="hidden" id="query-temperature" name="temperature" value="{}">
<button type="submit">Execute</button>
<span class="spinner">Generating response...</span>
</form>
"#,
        session_id,
        temperature.value()
    )
}

fn render_turn(turn: &ChatTurn) -> String {
    let (class, avatar) = match turn.role() {
        Role::Assistant => ("bot", "AI"),
        Role::User => ("user", "You"),
    };
    format!(
        "<div class=\"chat-message {}\">\n<div class=\"avatar\">{}</div>\n<div class=\"message\">{}</div>\n</div>\n",
        class,
        avatar,
        escape_multiline(turn.text())
    )
}

/// Chat turns in the order given; the page passes them newest first
pub fn render_history<'a>(turns: impl Iterator<Item = &'a ChatTurn>) -> String {
    let mut html = String::from("<section class=\"chat\">\n");
    for turn in turns {
        html.push_str(&render_turn(turn));
    }
    html.push_str("</section>\n");
    html
}
