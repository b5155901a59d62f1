// Static parts of generated pages.

pub const HTML_BEGIN: &str = concat!(
    "<!DOCTYPE html>\n<html>\n<head>\n",
    "<meta charset=\"UTF-8\"/>\n",
    "<base target=\"_blank\"/>\n",
    "<meta name=\"viewport\" content=\"width=device-width,initial-scale=1.0,user-scalable=yes\"/>\n",
    "<title>odr</title>\n"
);

pub const DEFAULT_CSS: &str = concat!(
    "*{margin:0px;position:relative;}\n",
    "body{padding:5px;}\n",
    "table{width:0px;}\n",
    "p{padding:0 !important;}\n",
    "span{margin:0 !important;}\n",
    ".whitespace{white-space:pre-wrap;}\n",
    ".slide{overflow:hidden;margin:0 auto 10px auto !important;border:1px solid #ccc;}\n"
);

pub const SPREADSHEET_CSS: &str = concat!(
    "table{border-collapse:collapse;display:block;}\n",
    "td{vertical-align:top;}\n",
    "p{font-family:\"Arial\";font-size:10pt;}\n"
);

/// Collects edited text on Ctrl+S and downloads it as
/// `{"modifiedText": {"<id>": "<text>"}}`.
pub const EDIT_SCRIPT: &str = r#"
var odrModified = {};
new MutationObserver(function (mutations) {
  mutations.forEach(function (mutation) {
    var span = mutation.target.parentElement;
    if (span && span.dataset.odrCid !== undefined) {
      odrModified[span.dataset.odrCid] = true;
    }
  });
}).observe(document.body, { characterData: true, subtree: true });

function generateDiff() {
  var diff = { modifiedText: {} };
  Object.keys(odrModified).forEach(function (cid) {
    var span = document.querySelector('[data-odr-cid="' + cid + '"]');
    if (span) {
      diff.modifiedText[cid] = span.innerText;
    }
  });
  return diff;
}

document.addEventListener('keydown', function (event) {
  if ((event.ctrlKey || event.metaKey) && event.key === 's') {
    event.preventDefault();
    var blob = new Blob([JSON.stringify(generateDiff())], { type: 'application/json' });
    var link = document.createElement('a');
    link.href = URL.createObjectURL(blob);
    link.download = 'diff.json';
    link.click();
  }
});
"#;

/// Assemble a complete page.
pub fn page(css: &str, body: &str, script: Option<&str>) -> String {
    let mut out = String::with_capacity(HTML_BEGIN.len() + css.len() + body.len() + 256);
    out.push_str(HTML_BEGIN);
    out.push_str("<style>\n");
    out.push_str(css);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(body);
    out.push_str("\n</body>\n");
    if let Some(script) = script {
        out.push_str("<script>");
        out.push_str(script);
        out.push_str("</script>\n");
    }
    out.push_str("</html>\n");
    out
}
