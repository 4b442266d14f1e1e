use chrono::SecondsFormat;

use crate::chart::Figure;
use crate::config::Statistic;
use crate::error::ReportError;
use crate::report::{Report, Tab};
use crate::stats::SummaryRow;

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";

// ---------------------------------------------------------------------------
// render_html
// ---------------------------------------------------------------------------

/// Render a report as a standalone HTML document with inline CSS.
///
/// Charts are drawn by Chart.js (loaded from a CDN); each tab's charts are
/// created the first time the tab is shown so they size correctly.
pub fn render_html(report: &Report) -> Result<String, ReportError> {
    let generated = report
        .generated_at
        .to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut tab_buttons = String::from(
        "<button class=\"tab-button active\" data-tab=\"overview\">Overview</button>\n",
    );
    let mut tab_panels = String::new();
    for tab in &report.tabs {
        tab_buttons.push_str(&format!(
            "<button class=\"tab-button\" data-tab=\"{id}\">{title}</button>\n",
            id = html_escape(&tab.id),
            title = html_escape(&tab.title),
        ));
        tab_panels.push_str(&render_tab(tab));
    }

    let chart_configs = chart_configs_json(report)?;
    let error_rate = report.error_rate() * 100.0;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<script src="{cdn}"></script>
<style>
  *, *::before, *::after {{ box-sizing: border-box; }}
  body {{
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    margin: 0; padding: 2rem;
    background: #0f172a; color: #e2e8f0;
    line-height: 1.5;
  }}
  h1 {{ font-size: 1.75rem; font-weight: 700; color: #f1f5f9; margin: 0 0 0.25rem; }}
  h2 {{ font-size: 1.125rem; font-weight: 600; color: #94a3b8;
        text-transform: uppercase; letter-spacing: 0.05em;
        margin: 2rem 0 0.75rem; border-bottom: 1px solid #1e293b; padding-bottom: 0.5rem; }}
  .meta {{ color: #64748b; font-size: 0.875rem; margin-bottom: 1.5rem; }}
  .meta span {{ margin-right: 1.5rem; }}
  .tabs {{ display: flex; gap: 0.25rem; border-bottom: 1px solid #334155; margin-bottom: 1.5rem; }}
  .tab-button {{
    background: none; border: none; color: #94a3b8; cursor: pointer;
    padding: 0.625rem 1rem; font-size: 0.875rem; font-weight: 600;
    border-bottom: 2px solid transparent;
  }}
  .tab-button.active {{ color: #f1f5f9; border-bottom-color: #60a5fa; }}
  .tab-panel {{ display: none; }}
  .tab-panel.active {{ display: block; }}
  .stats-grid {{
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(180px, 1fr));
    gap: 1rem; margin-bottom: 2rem;
  }}
  .stat-card {{
    background: #1e293b; border: 1px solid #334155;
    border-radius: 0.5rem; padding: 1rem 1.25rem;
  }}
  .stat-card .label {{
    font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em;
    color: #64748b; margin-bottom: 0.25rem;
  }}
  .stat-card .value {{ font-size: 1.5rem; font-weight: 700; color: #f1f5f9; }}
  .stat-card .unit {{ font-size: 0.875rem; color: #94a3b8; margin-left: 0.2rem; }}
  .stat-card.good .value {{ color: #34d399; }}
  .stat-card.warn .value {{ color: #fbbf24; }}
  .stat-card.bad  .value {{ color: #f87171; }}
  .charts-grid {{
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(520px, 1fr));
    gap: 1.5rem;
  }}
  .chart-card {{
    background: #1e293b; border: 1px solid #334155;
    border-radius: 0.5rem; padding: 1rem;
  }}
  .chart-container {{ position: relative; height: 360px; }}
  table {{
    width: 100%; border-collapse: collapse; font-size: 0.8125rem;
    background: #1e293b; border-radius: 0.5rem; overflow: hidden;
    margin-bottom: 2rem;
  }}
  thead {{ background: #0f172a; }}
  th {{
    padding: 0.625rem 0.875rem; text-align: left;
    font-weight: 600; color: #94a3b8;
    text-transform: uppercase; letter-spacing: 0.04em;
    font-size: 0.75rem;
  }}
  td {{ padding: 0.5rem 0.875rem; border-top: 1px solid #334155; color: #cbd5e1; }}
  td.num {{ text-align: right; font-variant-numeric: tabular-nums; }}
  tr:hover td {{ background: #243352; }}
  .swatch {{ display: inline-block; width: 0.75rem; height: 0.75rem; border-radius: 2px; margin-right: 0.4rem; }}
  footer {{
    margin-top: 3rem; padding-top: 1rem; border-top: 1px solid #1e293b;
    color: #475569; font-size: 0.8125rem;
  }}
</style>
</head>
<body>
<h1>{title}</h1>
<div class="meta">
  <span>X axis: {x_axis}</span>
  <span>Grouped by: {color_by}</span>
  <span>Statistics: {statistics}</span>
</div>

<nav class="tabs">
{tab_buttons}</nav>

<section class="tab-panel active" id="tab-overview">
<h2>Summary</h2>
<div class="stats-grid">
  <div class="stat-card">
    <div class="label">Data Groups</div>
    <div class="value">{group_count}</div>
  </div>
  <div class="stat-card">
    <div class="label">Benchmark Runs</div>
    <div class="value">{run_count}</div>
  </div>
  <div class="stat-card">
    <div class="label">Total Requests</div>
    <div class="value">{total_requests}</div>
  </div>
  <div class="stat-card {error_class}">
    <div class="label">Error Rate</div>
    <div class="value">{error_rate:.2}<span class="unit">%</span></div>
  </div>
</div>

<h2>Data Groups</h2>
<table>
  <thead>
    <tr><th>Group</th><th>Series</th><th>Metadata</th><th>Runs</th></tr>
  </thead>
  <tbody>
{group_rows}
  </tbody>
</table>

<h2>Runs</h2>
<table>
  <thead>
    <tr>
{run_header}
    </tr>
  </thead>
  <tbody>
{run_rows}
  </tbody>
</table>
</section>

{tab_panels}
<footer>Generated by benchreport &bull; {generated}</footer>

<script>
const CHART_CONFIGS = {chart_configs};
const TAB_CHARTS = {tab_charts};
const created = new Set();

function showTab(id) {{
  document.querySelectorAll('.tab-button').forEach((b) => b.classList.toggle('active', b.dataset.tab === id));
  document.querySelectorAll('.tab-panel').forEach((p) => p.classList.toggle('active', p.id === 'tab-' + id));
  (TAB_CHARTS[id] || []).forEach((chartId) => {{
    if (created.has(chartId)) return;
    created.add(chartId);
    new Chart(document.getElementById(chartId), CHART_CONFIGS[chartId]);
  }});
}}

document.querySelectorAll('.tab-button').forEach((b) => b.addEventListener('click', () => showTab(b.dataset.tab)));
</script>
</body>
</html>
"#,
        title = html_escape(&report.title),
        cdn = CHART_JS_CDN,
        x_axis = report.x_axis.label(),
        color_by = html_escape(report.color_by.as_deref().unwrap_or("data group")),
        statistics = statistics_label(&report.statistics),
        tab_buttons = tab_buttons,
        group_count = report.groups.len(),
        run_count = report.total_runs(),
        total_requests = report.total_requests(),
        error_rate = error_rate,
        error_class = if error_rate < 1.0 { "good" } else if error_rate < 5.0 { "warn" } else { "bad" },
        group_rows = render_group_rows(report),
        run_header = render_run_header(report),
        run_rows = render_run_rows(report),
        tab_panels = tab_panels,
        generated = generated,
        chart_configs = chart_configs,
        tab_charts = tab_charts_json(report)?,
    ))
}

fn render_tab(tab: &Tab) -> String {
    let cards: String = tab
        .figures
        .iter()
        .map(render_figure_card)
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "<section class=\"tab-panel\" id=\"tab-{id}\">\n<h2>{title}</h2>\n\
         <div class=\"charts-grid\">\n{cards}\n</div>\n</section>\n",
        id = html_escape(&tab.id),
        title = html_escape(&tab.title),
        cards = cards,
    )
}

fn render_figure_card(figure: &Figure) -> String {
    format!(
        "<div class=\"chart-card\"><div class=\"chart-container\">\
         <canvas id=\"{id}\" aria-label=\"{title}\"></canvas></div></div>",
        id = html_escape(&figure.id),
        title = html_escape(&figure.title),
    )
}

fn render_group_rows(report: &Report) -> String {
    let colors = report.colors();
    report
        .groups
        .iter()
        .map(|g| {
            let metadata = g
                .extra_metadata
                .iter()
                .map(|(k, v)| format!("{}={}", html_escape(k), html_escape(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "<tr><td>{}</td><td><span class=\"swatch\" style=\"background:{}\"></span>{}</td>\
                 <td>{}</td><td class=\"num\">{}</td></tr>",
                html_escape(&g.name),
                colors.color(&g.color_key),
                html_escape(&g.color_key),
                metadata,
                g.runs,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_run_header(report: &Report) -> String {
    let mut cells = vec![
        "<th>Group</th>".to_string(),
        format!("<th>{}</th>", report.x_axis.label()),
        "<th>Strategy</th>".to_string(),
        "<th>Requests</th>".to_string(),
        "<th>Errors</th>".to_string(),
        "<th>Duration (s)</th>".to_string(),
    ];
    for metric in SummaryRow::TABLE_METRICS {
        cells.push(format!(
            "<th>{} mean ({})</th>",
            metric.title(),
            html_escape(metric.unit())
        ));
    }
    cells.push("<th>Source</th>".to_string());
    cells.join("")
}

fn render_run_rows(report: &Report) -> String {
    report
        .rows
        .iter()
        .map(render_run_row)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_run_row(row: &SummaryRow) -> String {
    let mut cells = vec![
        format!("<td>{}</td>", html_escape(&row.group)),
        format!("<td class=\"num\">{}</td>", fmt_opt(row.level)),
        format!("<td>{}</td>", html_escape(&row.strategy)),
        format!("<td class=\"num\">{}</td>", row.successful_requests),
        format!("<td class=\"num\">{}</td>", row.errored_requests),
        format!("<td class=\"num\">{}</td>", fmt_opt(row.duration_secs)),
    ];
    for metric in SummaryRow::TABLE_METRICS {
        let value = row.metric(metric).and_then(|s| s.get(Statistic::Mean));
        cells.push(format!("<td class=\"num\">{}</td>", fmt_opt(value)));
    }
    cells.push(format!("<td>{}</td>", html_escape(&row.source_file)));
    format!("<tr>{}</tr>", cells.join(""))
}

fn chart_configs_json(report: &Report) -> Result<String, ReportError> {
    let configs: serde_json::Map<String, serde_json::Value> = report
        .figures()
        .map(|f| (f.id.clone(), f.to_chartjs()))
        .collect();
    Ok(script_safe(&serde_json::to_string(&configs)?))
}

fn tab_charts_json(report: &Report) -> Result<String, ReportError> {
    let tabs: serde_json::Map<String, serde_json::Value> = report
        .tabs
        .iter()
        .map(|t| {
            let ids: Vec<&str> = t.figures.iter().map(|f| f.id.as_str()).collect();
            (t.id.clone(), serde_json::json!(ids))
        })
        .collect();
    Ok(script_safe(&serde_json::to_string(&tabs)?))
}

fn statistics_label(statistics: &[Statistic]) -> String {
    statistics
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "—".to_string())
}

/// Keep embedded JSON from terminating the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
