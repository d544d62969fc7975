use axum::{response::Html, Router, routing::get};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>AI Web Search</title>
  <style>
    body { font-family: Arial, sans-serif; text-align: center; margin: 50px; }
    input { padding: 10px; margin: 10px; width: 300px; }
    button { padding: 10px; background: blue; color: white; border: none; cursor: pointer; }
    button:disabled { background: #888; cursor: wait; }
    #results { margin: 20px auto 0; max-width: 720px; text-align: left; }
    .result { margin-bottom: 1rem; }
    .error { color: #b00020; }
  </style>
</head>
<body>
  <h1>AI Web Search</h1>
  <form id="searchForm">
    <input type="text" id="keyword" placeholder="Enter a search keyword" autofocus />
    <button id="searchBtn" type="submit">Search</button>
  </form>
  <div id="results"></div>

  <script>
    const form = document.getElementById('searchForm');
    const button = document.getElementById('searchBtn');
    const results = document.getElementById('results');

    function escapeHtml(text) {
      const div = document.createElement('div');
      div.textContent = text;
      return div.innerHTML;
    }

    function safeHref(link) {
      return /^https?:\/\//i.test(link) ? link : '#';
    }

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const keyword = document.getElementById('keyword').value;
      if (!keyword.trim()) {
        results.innerHTML = '<p class="error">Enter a keyword first.</p>';
        return;
      }

      button.disabled = true;
      results.innerHTML = '<p>Searching...</p>';
      try {
        const response = await fetch('/search/', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ keyword })
        });
        const data = await response.json();
        if (!response.ok) {
          results.innerHTML = `<p class="error">${escapeHtml(data.detail || 'Search failed.')}</p>`;
          return;
        }

        let html = `<h2>Results for "${escapeHtml(data.keyword)}":</h2>`;
        if (!data.results.length) {
          html += '<p>No results.</p>';
        }
        data.results.forEach(result => {
          html += `<div class="result"><strong>${escapeHtml(result.title)}</strong><br>` +
            `${escapeHtml(result.snippet)}<br>` +
            `<a href="${escapeHtml(safeHref(result.link))}" target="_blank" rel="noopener">Read more</a></div>`;
        });
        results.innerHTML = html;
      } catch (err) {
        results.innerHTML = `<p class="error">${escapeHtml(String(err))}</p>`;
      } finally {
        button.disabled = false;
      }
    });
  </script>
</body>
</html>"#)
}
