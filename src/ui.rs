use crate::calendar::{build_month, first_of_month, parse_month};
use crate::models::{AppData, ScheduledProduct};
use crate::progress::skin_rating;
use crate::scheduler::last_day_of_month;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use std::fmt::Write;

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub month: Option<String>,
    pub date: Option<NaiveDate>,
}

pub fn render_index(today: NaiveDate, query: &IndexQuery, data: &AppData, window: usize) -> String {
    let selected = query.date.unwrap_or(today);
    let first = query
        .month
        .as_deref()
        .and_then(parse_month)
        .unwrap_or_else(|| first_of_month(selected));

    let prev = first_of_month(first - Duration::days(1));
    let next = last_day_of_month(first) + Duration::days(1);
    let routine = data.routines.day(selected);

    INDEX_HTML
        .replace("{{MONTH_LABEL}}", &first.format("%B %Y").to_string())
        .replace("{{PREV}}", &prev.format("%Y-%m").to_string())
        .replace("{{NEXT}}", &next.format("%Y-%m").to_string())
        .replace("{{GRID}}", &render_grid(data, first, today, selected))
        .replace("{{SELECTED}}", &selected.format("%A, %B %-d").to_string())
        .replace("{{AM}}", &render_slot(&routine.am))
        .replace("{{PM}}", &render_slot(&routine.pm))
        .replace("{{RATING}}", &format!("{:.1}", skin_rating(data, window)))
        .replace("{{SHELF}}", &data.shelf.len().to_string())
}

fn render_grid(data: &AppData, first: NaiveDate, today: NaiveDate, selected: NaiveDate) -> String {
    let month = build_month(&data.routines, first);
    let mut html = String::new();
    for name in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
        let _ = write!(html, r#"<div class="head">{name}</div>"#);
    }
    for _ in 0..month.leading_blanks {
        html.push_str(r#"<div class="cell blank"></div>"#);
    }
    for day in &month.days {
        let mut classes = String::from("cell");
        if day.date == today {
            classes.push_str(" today");
        }
        if day.date == selected {
            classes.push_str(" selected");
        }
        let _ = write!(
            html,
            r#"<a class="{classes}" href="/?month={month}&date={date}"><span class="num">{num}</span>{am}{pm}</a>"#,
            month = first.format("%Y-%m"),
            date = day.date,
            num = day.date.day(),
            am = if day.has_am { r#"<i class="dot am"></i>"# } else { "" },
            pm = if day.has_pm { r#"<i class="dot pm"></i>"# } else { "" },
        );
    }
    html
}

fn render_slot(products: &[ScheduledProduct]) -> String {
    if products.is_empty() {
        return r#"<p class="empty">No products in this routine.</p>"#.to_string();
    }
    let mut html = String::from("<ul>");
    for product in products {
        let _ = write!(
            html,
            "<li><strong>{}</strong><span>{}</span></li>",
            escape(&product.name),
            escape(&product.brand)
        );
    }
    html.push_str("</ul>");
    html
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>SkinProve · Routine Calendar</title>
  <style>
    :root {
      --peach-50: #fff7f2;
      --peach-200: #ffd9c2;
      --peach-400: #ffa577;
      --peach-500: #ff8a50;
      --peach-600: #e86f35;
      --ink: #2d2926;
      --muted: #8a817a;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--peach-50), #fffaf3 60%, #ffeadb);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px;
    }

    main {
      max-width: 1100px;
      margin: 0 auto;
      display: grid;
      grid-template-columns: 2fr 1fr;
      gap: 24px;
    }

    header {
      max-width: 1100px;
      margin: 0 auto 24px;
      display: flex;
      justify-content: space-between;
      align-items: baseline;
    }

    h1 { margin: 0; font-size: 2rem; }
    h2 { margin: 0 0 12px; font-size: 1.2rem; }

    .card {
      background: white;
      border-radius: 16px;
      box-shadow: 0 12px 32px rgba(232, 111, 53, 0.12);
      padding: 20px;
    }

    .nav { display: flex; gap: 12px; align-items: center; margin-bottom: 16px; }
    .nav a { color: var(--peach-600); text-decoration: none; font-weight: 600; }

    .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      border: 1px solid #eee;
      border-radius: 12px;
      overflow: hidden;
    }

    .head {
      background: #fafafa;
      padding: 10px;
      text-align: center;
      font-size: 0.85rem;
      color: var(--muted);
    }

    .cell {
      height: 80px;
      border: 1px solid #f1f1f1;
      padding: 6px;
      color: inherit;
      text-decoration: none;
      position: relative;
    }

    .cell:hover { background: var(--peach-50); }
    .cell.selected { background: var(--peach-200); }
    .cell.today .num {
      background: var(--peach-500);
      color: white;
      border-radius: 999px;
      padding: 2px 7px;
    }

    .dot { display: block; width: 8px; height: 8px; border-radius: 999px; margin-top: 6px; }
    .dot.am { background: var(--peach-400); }
    .dot.pm { background: var(--peach-600); }

    ul { list-style: none; margin: 0; padding: 0; display: grid; gap: 8px; }
    li { background: #faf7f5; border-radius: 10px; padding: 10px; display: grid; }
    li span { color: var(--muted); font-size: 0.85rem; }
    .empty { color: var(--muted); font-size: 0.9rem; text-align: center; }
    .summary { color: var(--muted); }

    @media (max-width: 800px) {
      main { grid-template-columns: 1fr; }
    }
  </style>
</head>
<body>
  <header>
    <h1>SkinProve</h1>
    <p class="summary">Skin rating {{RATING}}/10 · {{SHELF}} products on your shelf</p>
  </header>
  <main>
    <section class="card">
      <div class="nav">
        <a href="/?month={{PREV}}">&larr;</a>
        <h2>{{MONTH_LABEL}}</h2>
        <a href="/?month={{NEXT}}">&rarr;</a>
      </div>
      <div class="grid">{{GRID}}</div>
    </section>
    <aside class="card">
      <h2>{{SELECTED}}</h2>
      <h3>Morning Routine</h3>
      {{AM}}
      <h3>Evening Routine</h3>
      {{PM}}
    </aside>
  </main>
</body>
</html>
"#;
