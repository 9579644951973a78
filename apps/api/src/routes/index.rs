use axum::response::Html;

/// GET /
/// Upload/paste form. Posts to the classify endpoint and shows the label.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Resume Classification System</title>
<style>
  body { font-family: system-ui, sans-serif; background: linear-gradient(135deg, #1e3a8a, #0f172a); min-height: 100vh; margin: 0; }
  .card { background: #fff; max-width: 760px; margin: 60px auto; padding: 40px; border-radius: 18px; }
  .title { font-size: 32px; font-weight: 700; text-align: center; color: #0f172a; }
  .section { font-weight: 600; margin: 25px 0 10px; color: #1e293b; }
  textarea { width: 100%; height: 150px; background: #f8fafc; }
  .result { background: #e0f2fe; color: #0369a1; padding: 16px; border-radius: 10px; text-align: center; font-size: 20px; font-weight: 600; margin-top: 25px; }
  .error { background: #fee2e2; color: #b91c1c; }
  [hidden] { display: none; }
</style>
</head>
<body>
<div class="card">
  <div class="title">Resume Classification System</div>
  <form id="classify">
    <div class="section">Upload Resume (PDF / DOCX)</div>
    <input type="file" name="file" accept=".pdf,.docx">
    <div class="section">Paste Resume Text (Optional)</div>
    <textarea name="text" placeholder="Paste resume content here..."></textarea>
    <button type="submit">Classify</button>
  </form>
  <div id="result" class="result" hidden></div>
</div>
<script>
  const form = document.getElementById("classify");
  const result = document.getElementById("result");
  form.addEventListener("submit", async (event) => {
    event.preventDefault();
    result.hidden = true;
    result.classList.remove("error");
    const response = await fetch("/api/v1/classify", { method: "POST", body: new FormData(form) });
    const body = await response.json().catch(() => ({ error: { message: "Request failed (" + response.status + ")" } }));
    if (!response.ok) {
      result.textContent = body.error.message;
      result.classList.add("error");
      result.hidden = false;
    } else if (body.label !== null) {
      result.textContent = "Predicted Role: " + body.label;
      result.hidden = false;
    }
  });
</script>
</body>
</html>
"#;
