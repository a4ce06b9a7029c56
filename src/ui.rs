use crate::models::{CardsResponse, DateRange, MetricCard};

pub fn render_dashboard(range: DateRange, cards: Option<&CardsResponse>) -> String {
    let site = cards.map(|c| c.site.as_str()).unwrap_or("No site yet");
    let body = match cards {
        Some(response) if !response.cards.is_empty() => {
            response.cards.iter().map(render_card).collect::<String>()
        }
        _ => r#"<p class="empty">No metrics recorded. POST points to <code>/api/sites/{site}/metrics/{metric}</code>.</p>"#
            .to_string(),
    };

    INDEX_HTML
        .replace("{{RANGE_OPTIONS}}", &render_range_options(range))
        .replace("{{RANGE_LABEL}}", range.label())
        .replace("{{SITE}}", &escape(site))
        .replace("{{CARDS}}", &body)
}

fn render_range_options(selected: DateRange) -> String {
    DateRange::ALL
        .iter()
        .map(|range| {
            let class = if *range == selected { "range active" } else { "range" };
            format!(
                r#"<a class="{class}" href="/?range={symbol}">{symbol}</a>"#,
                symbol = range.as_str()
            )
        })
        .collect()
}

fn render_card(card: &MetricCard) -> String {
    let latest = card
        .latest
        .map(format_number)
        .unwrap_or_else(|| "&ndash;".to_string());
    format!(
        r#"<article class="card"><h2>{metric}</h2><p class="value">{latest}</p><p class="total">{total} this period</p>{badge}</article>"#,
        metric = escape(&card.metric),
        total = format_number(card.trend.current_value),
        badge = render_badge(card.trend.trend_percent),
    )
}

// No badge at all when there is no baseline to compare against.
fn render_badge(trend_percent: Option<f64>) -> String {
    match trend_percent {
        Some(value) if value > 0.0 => format!(r#"<span class="badge up">+{value:.1}%</span>"#),
        Some(value) if value < 0.0 => format!(r#"<span class="badge down">{value:.1}%</span>"#),
        Some(_) => r#"<span class="badge flat">0.0%</span>"#.to_string(),
        None => String::new(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>SEO Dashboard</title>
  <style>
    :root {
      --bg: #f4f6fb;
      --ink: #1d2433;
      --muted: #6a7385;
      --card: #ffffff;
      --up: #1a8f5a;
      --down: #c8402f;
      --accent: #3056d3;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1080px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: end;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .ranges {
      display: flex;
      gap: 6px;
    }

    .range {
      padding: 6px 12px;
      border-radius: 999px;
      color: var(--muted);
      text-decoration: none;
      border: 1px solid #d7dbe6;
    }

    .range.active {
      color: #fff;
      background: var(--accent);
      border-color: var(--accent);
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      padding: 18px 20px;
      box-shadow: 0 12px 30px rgba(29, 36, 51, 0.08);
    }

    .card h2 {
      margin: 0;
      font-size: 0.95rem;
      color: var(--muted);
      text-transform: capitalize;
    }

    .value {
      margin: 8px 0 2px;
      font-size: 2rem;
      font-weight: 600;
    }

    .total {
      margin: 0 0 10px;
      color: var(--muted);
      font-size: 0.85rem;
    }

    .badge {
      font-size: 0.8rem;
      padding: 2px 8px;
      border-radius: 999px;
    }

    .badge.up {
      color: var(--up);
      background: rgba(26, 143, 90, 0.12);
    }

    .badge.down {
      color: var(--down);
      background: rgba(200, 64, 47, 0.12);
    }

    .badge.flat {
      color: var(--muted);
      background: #eceff5;
    }

    .empty {
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>{{SITE}}</h1>
        <p class="subtitle">{{RANGE_LABEL}} compared with the previous period</p>
      </div>
      <nav class="ranges">{{RANGE_OPTIONS}}</nav>
    </header>
    <section class="cards">{{CARDS}}</section>
  </main>
</body>
</html>
"#;
