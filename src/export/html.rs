use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::export::{Exporter, SvgExporter};
use crate::interaction::CodeOverlay;
use crate::session::RenderSession;

const PAGE_STYLE: &str = r#"
body { margin: 0; font-family: Helvetica, Arial, sans-serif; }
#graphContainer { position: relative; overflow: hidden; cursor: default; }
#toolbarDiv, #outlineContainer { position: absolute; background: #fff; border: 1px solid #999; z-index: 2; }
#toolbarDiv { padding: 4px; }
#toolbarDiv img { width: 32px; height: 32px; margin: 2px; }
.source { display: none; }
#modalBackdrop { display: none; position: fixed; inset: 0; background: rgba(0,0,0,0.5); z-index: 10; }
#modalWindow { position: absolute; background: #fff; border: 1px solid #666; overflow: auto; }
#modalWindow h3 { margin: 0; padding: 4px 8px; background: #eee; }
#modalWindow pre { margin: 8px; }
"#;

const PAGE_SCRIPT: &str = r#"
(function () {
  var backdrop = document.getElementById('modalBackdrop');
  var win = document.getElementById('modalWindow');
  var body = document.getElementById('modalBody');
  function close() { backdrop.style.display = 'none'; body.innerHTML = ''; }
  backdrop.addEventListener('click', function (e) { if (e.target === backdrop) close(); });
  document.getElementById('modalClose').addEventListener('click', close);
  document.querySelectorAll('#graphContainer g.edge').forEach(function (g) {
    g.addEventListener('dblclick', function (e) {
      var src = document.querySelector('.source[data-edge="' + CSS.escape(g.dataset.cellId) + '"]');
      if (!src) return;
      body.innerHTML = src.innerHTML;
      win.style.left = Math.max(100, e.offsetX - WIDTH / 2) + 'px';
      win.style.top = Math.max(10, e.offsetY) + 'px';
      backdrop.style.display = 'block';
      e.preventDefault();
    });
  });
})();
"#;

/// Renders a standalone HTML page: the SVG diagram, toolbar and outline
/// placeholders, and a double-click source window per edge.
#[derive(Debug, Clone, Default)]
pub struct HtmlExporter {
    pub svg: SvgExporter,
    /// Page title.
    pub title: Option<String>,
}

impl HtmlExporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn toolbar_html(&self, session: &RenderSession) -> String {
        let win = session.toolbar_window().bounds;
        let mut out = format!(
            "<div id=\"toolbarDiv\" style=\"left:{}px;top:{}px;width:{}px;height:{}px\">",
            win.x, win.y, win.width, win.height
        );
        for (item, url) in session.toolbar() {
            out.push_str(&format!(
                "<img src=\"{}\" title=\"{}\" alt=\"{}\">",
                encode_double_quoted_attribute(&url),
                item.title,
                item.title
            ));
        }
        out.push_str("</div>");
        out
    }

    fn sources_html(&self, session: &RenderSession) -> String {
        let scene = session.scene();
        let mut out = String::new();
        for (_, cell) in scene.edges() {
            let (content, class) = match &cell.value.code {
                Some(code) => (code.as_str(), "language-python"),
                None => (cell.value.label.as_str(), "plain"),
            };
            out.push_str(&format!(
                "<div class=\"source\" data-edge=\"{}\"><pre><code class=\"{class}\">{}</code></pre></div>\n",
                encode_double_quoted_attribute(&cell.id),
                encode_text(content)
            ));
        }
        out
    }
}

/// Opening tag of the frame around the graph, sized by the last sizing pass.
fn frame_open(session: &RenderSession) -> String {
    let Some(sizing) = session.sizing() else {
        return "<div id=\"graphFrame\">\n".to_string();
    };
    let mut tag = format!(
        "<div id=\"graphFrame\" style=\"height:{}px\"",
        sizing.frame_height
    );
    if let Some(h) = sizing.output_height {
        tag.push_str(&format!(" data-output-height=\"{h}\""));
    }
    if let Some(h) = sizing.parent_frame_height {
        tag.push_str(&format!(" data-parent-frame-height=\"{h}\""));
    }
    tag.push_str(">\n");
    tag
}

impl Exporter for HtmlExporter {
    fn render(&self, session: &RenderSession) -> String {
        let svg = self.svg.render(session);
        let outline = session.outline_window().bounds;
        let title = self.title.as_deref().unwrap_or("CREST diagram");
        let script = PAGE_SCRIPT.replace("WIDTH", &CodeOverlay::WIDTH.to_string());

        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        page.push_str(&format!("<title>{}</title>\n", encode_text(title)));
        page.push_str(&format!("<style>{PAGE_STYLE}</style>\n</head>\n<body>\n"));
        page.push_str(&self.toolbar_html(session));
        page.push('\n');
        page.push_str(&format!(
            "<div id=\"outlineContainer\" style=\"left:{}px;top:{}px;width:{}px;height:{}px\"></div>\n",
            outline.x, outline.y, outline.width, outline.height
        ));
        page.push_str(&frame_open(session));
        page.push_str(&format!(
            "<div id=\"graphContainer\" style=\"height:{}px\">\n{svg}\n</div>\n</div>\n",
            session.container_height()
        ));
        page.push_str(&self.sources_html(session));
        page.push_str(&format!(
            "<div id=\"modalBackdrop\"><div id=\"modalWindow\" style=\"width:{}px;height:{}px\">\
             <h3>SourceCode <button id=\"modalClose\">&times;</button></h3>\
             <div id=\"modalBody\"></div></div></div>\n",
            CodeOverlay::WIDTH,
            CodeOverlay::HEIGHT
        ));
        page.push_str(&format!("<script>{script}</script>\n</body>\n</html>\n"));
        page
    }
}
