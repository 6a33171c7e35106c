//! Page handlers.

use axum::response::{Html, Redirect};

// ── Tarot page ────────────────────────────────────────────────────────────────

const TAROT_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Tarot</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #0f0f0f; color: #e0e0e0;
      padding: 2rem; max-width: 56rem; margin: 0 auto;
    }
    h1 { font-size: 1.5rem; margin-bottom: 1rem; }
    form { display: flex; gap: 0.75rem; align-items: center; margin-bottom: 1.5rem; }
    select, input, button {
      background: #1a1a1a; color: #e0e0e0;
      border: 1px solid #333; border-radius: 8px; padding: 0.4rem 0.8rem;
    }
    button { background: #2a2a3a; color: #c0c0e0; cursor: pointer; }
    button:hover { background: #3a3a5a; }
    #cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(14rem, 1fr)); gap: 1rem; }
    .card { padding: 1rem; border: 1px solid #333; border-radius: 12px; background: #1a1a1a; }
    .position { font-size: 0.75rem; color: #888; text-transform: uppercase; }
    .name { font-weight: 600; margin: 0.25rem 0 0.5rem; }
    .meaning { font-size: 0.9rem; color: #bbb; }
    .error { color: #e08080; }
  </style>
</head>
<body>
  <h1>Tarot</h1>
  <form id="draw">
    <label>Spread
      <select name="spread">
        <option value="single">single</option>
        <option value="three">three</option>
        <option value="cross">cross</option>
      </select>
    </label>
    <label>Count <input name="count" type="number" min="1" max="78" value="1" /></label>
    <button type="submit">Draw</button>
  </form>
  <div id="cards"></div>
  <script>
    const form = document.getElementById("draw");
    const out = document.getElementById("cards");
    form.addEventListener("submit", async (ev) => {
      ev.preventDefault();
      const params = new URLSearchParams(new FormData(form));
      out.textContent = "";
      const res = await fetch("/tarot/draw?" + params);
      const body = await res.json();
      if (!res.ok) {
        const p = document.createElement("p");
        p.className = "error";
        p.textContent = body.detail;
        out.appendChild(p);
        return;
      }
      for (const c of body.cards) {
        const div = document.createElement("div");
        div.className = "card";
        for (const [cls, text] of [["position", c.position], ["name", c.card], ["meaning", c.meaning]]) {
          const el = document.createElement("div");
          el.className = cls;
          el.textContent = text;
          div.appendChild(el);
        }
        out.appendChild(div);
      }
    });
  </script>
</body>
</html>
"#;

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /: the demo has no chat page of its own.
pub(super) async fn root() -> Redirect {
    Redirect::temporary("/tarot")
}

/// GET /tarot
pub(super) async fn tarot_page() -> Html<&'static str> {
    Html(TAROT_HTML)
}
