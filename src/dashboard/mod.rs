use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::db::Database;
use crate::fixtures::Fixture;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Public view of a participant record. The Telegram user id stays private.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub score: i64,
    pub changes: u32,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/fixtures", get(fixtures_handler))
        .route("/api/participants", get(participants_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/fixtures
async fn fixtures_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Fixture>> {
    Json(state.db.load_fixtures())
}

/// GET /api/participants
async fn participants_handler(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, ParticipantSummary>> {
    let roster = state.db.load_roster();
    let summaries = state
        .db
        .load_participant_records(&roster)
        .into_iter()
        .map(|(name, record)| {
            let summary = ParticipantSummary {
                score: record.score,
                changes: record.changes,
            };
            (name, summary)
        })
        .collect();
    Json(summaries)
}

/// Embedded single-file dashboard (HTML + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Premier Predictor</title>
<style>
  body { background: #0f1117; color: #e0e0e0; font-family: system-ui, sans-serif; margin: 2rem; }
  table { border-collapse: collapse; margin-bottom: 2rem; }
  th, td { padding: .4rem .9rem; border-bottom: 1px solid #2a2d3a; text-align: left; }
  th { color: #8888aa; font-size: .8rem; text-transform: uppercase; }
</style>
</head>
<body>
<h1>Premier Predictor</h1>
<h2>Participants</h2>
<table><thead><tr><th>Name</th><th>Score</th><th>Changes</th></tr></thead><tbody id="participants"></tbody></table>
<h2>Fixtures</h2>
<table><thead><tr><th>Id</th><th>Kickoff</th><th>Home</th><th>Away</th><th>Result</th></tr></thead><tbody id="fixtures"></tbody></table>
<script>
function cell(text) { const td = document.createElement('td'); td.textContent = text; return td; }
function row(values) { const tr = document.createElement('tr'); values.forEach(v => tr.appendChild(cell(v))); return tr; }
async function load() {
  const p = await fetch('/api/participants').then(r => r.ok ? r.json() : {});
  const pBody = document.getElementById('participants');
  Object.entries(p).sort((a, b) => a[1].score - b[1].score)
    .forEach(([name, r]) => pBody.appendChild(row([name, r.score, r.changes])));
  const f = await fetch('/api/fixtures').then(r => r.ok ? r.json() : []);
  const fBody = document.getElementById('fixtures');
  f.forEach(x => fBody.appendChild(row([x.id, x.kickoff === 'postponed' ? 'Postponed' : x.kickoff.at, x.home_team, x.away_team, x.result || ''])));
}
load();
</script>
</body>
</html>
"#;
