//! Embedded HTML served by the upload UI. The assets are kept as
//! `&'static str` so they are bundled directly inside the binary without
//! filesystem lookups.

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Brain Tumor MRI Classification</title>
  <style>
    body { font-family: sans-serif; max-width: 640px; margin: 4rem auto; color: #222; }
    form { border: 1px solid #ccc; border-radius: 8px; padding: 2rem; }
    button { margin-top: 1rem; padding: 0.5rem 1.5rem; }
    nav a { margin-right: 1rem; }
  </style>
</head>
<body>
  <nav><a href="/">Classify</a><a href="/home">About</a></nav>
  <h1>Brain Tumor MRI Classification</h1>
  <p>Upload an MRI scan to classify it as glioma, meningioma, pituitary, or no tumor.</p>
  <form action="/predict" method="post" enctype="multipart/form-data">
    <input type="file" name="file" accept="image/*">
    <button type="submit">Predict</button>
  </form>
</body>
</html>
"#;

pub const HOME_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>About - Brain Tumor MRI Classification</title>
  <style>
    body { font-family: sans-serif; max-width: 640px; margin: 4rem auto; color: #222; }
    nav a { margin-right: 1rem; }
  </style>
</head>
<body>
  <nav><a href="/">Classify</a><a href="/home">About</a></nav>
  <h1>About</h1>
  <p>This service runs a convolutional network trained on brain MRI scans and
  sorts each upload into one of four classes: glioma, meningioma, pituitary
  tumor, or no tumor.</p>
  <p>Predictions are informational only and are not a medical diagnosis.</p>
</body>
</html>
"#;

/// Result shell served on a direct `GET /result`, with no prediction bound.
pub const RESULT_SHELL_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Result - Brain Tumor MRI Classification</title>
  <style>
    body { font-family: sans-serif; max-width: 640px; margin: 4rem auto; color: #222; }
    nav a { margin-right: 1rem; }
  </style>
</head>
<body>
  <nav><a href="/">Classify</a><a href="/home">About</a></nav>
  <h1>Result</h1>
  <p>No prediction yet. <a href="/">Upload a scan</a> to get one.</p>
</body>
</html>
"#;

const RESULT_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Result - Brain Tumor MRI Classification</title>
  <style>
    body { font-family: sans-serif; max-width: 640px; margin: 4rem auto; color: #222; }
    img { max-width: 100%; border: 1px solid #ccc; border-radius: 8px; }
    .label { font-size: 1.5rem; font-weight: bold; }
    nav a { margin-right: 1rem; }
  </style>
</head>
<body>
  <nav><a href="/">Classify</a><a href="/home">About</a></nav>
  <h1>Result</h1>
  <p>Predicted class: <span class="label">{{label}}</span></p>
  <img src="data:image/jpeg;base64,{{image}}" alt="{{filename}}">
  <p>Stored as <code>{{filename}}</code></p>
  <p><a href="/">Classify another scan</a></p>
</body>
</html>
"#;

pub fn render_result(filename: &str, label: &str, image_base64: &str) -> String {
    RESULT_TEMPLATE
        .replace("{{label}}", label)
        .replace("{{image}}", image_base64)
        .replace("{{filename}}", filename)
}
