//! Static HTML page built from the render instructions.

use crate::parallels::ParallelMapping;
use crate::render::{chapter_title, Marker, RenderOp};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: Georgia, serif; margin: 0; }
#main-content { padding: 2rem; transition: margin-right 0.2s; }
#main-content.sidebar-visible { margin-right: 40%; }
.verse.parallel { background: #fff3c4; cursor: pointer; }
.verse-number { color: #888; }
#josephus-sidebar { position: fixed; top: 0; right: 0; width: 40%; height: 100%;
  overflow-y: auto; background: #f7f7f7; border-left: 1px solid #ccc; display: none; padding: 1rem; box-sizing: border-box; }
#josephus-sidebar.visible { display: block; }
.parallel-entry h4 { margin-bottom: 0.25rem; }
"#;

const SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', () => {
  const parallels = JSON.parse(document.getElementById('parallels-data').textContent);
  const main = document.getElementById('main-content');
  const sidebar = document.getElementById('josephus-sidebar');
  const content = document.getElementById('josephus-content');
  const show = (on) => { sidebar.classList.toggle('visible', on); main.classList.toggle('sidebar-visible', on); };
  main.addEventListener('click', (event) => {
    const target = event.target.closest('.parallel');
    if (!target) { if (sidebar.classList.contains('visible')) show(false); return; }
    const [chapter, verse] = target.dataset.lukeRef.split(':');
    const entries = (parallels[chapter] || {})[verse] || [];
    if (entries.length === 0) return;
    content.replaceChildren();
    for (const entry of entries) {
      const div = document.createElement('div');
      div.className = 'parallel-entry';
      const h = document.createElement('h4'); h.textContent = entry.ref;
      const p = document.createElement('p'); p.textContent = entry.text;
      div.append(h, p);
      content.appendChild(div);
    }
    show(true);
  });
  document.getElementById('close-sidebar').addEventListener('click', () => show(false));
});
"#;

/// Escape text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup for the document body: one `div` per chapter run.
pub fn render_body(ops: &[RenderOp]) -> String {
    let mut out = String::new();
    let mut open_chapter = false;

    for op in ops {
        match op {
            RenderOp::ChapterHeading { chapter } => {
                if open_chapter {
                    out.push_str("</div>\n");
                }
                let _ = writeln!(
                    out,
                    "<div><h2 class=\"chapter-title\">{}</h2>",
                    escape(&chapter_title(*chapter))
                );
                open_chapter = true;
            }
            RenderOp::Verse {
                reference,
                text,
                marker,
            } => {
                match marker {
                    Marker::Parallel(key) => {
                        let _ = write!(out, "<span class=\"verse parallel\" data-luke-ref=\"{}\">", key.key());
                    }
                    Marker::Plain => out.push_str("<span class=\"verse\">"),
                }
                let _ = writeln!(
                    out,
                    "<sup class=\"verse-number\">{}</sup> {} </span>",
                    reference.verse,
                    escape(text)
                );
            }
        }
    }

    if open_chapter {
        out.push_str("</div>\n");
    }
    out
}

/// A standalone page: document, hidden sidebar, and the mapping embedded so no
/// fetches are needed.
pub fn render_page(title: &str, ops: &[RenderOp], mapping: &ParallelMapping) -> serde_json::Result<String> {
    // `</` would end the script element early.
    let data = serde_json::to_string(&mapping.to_raw())?.replace("</", "<\\/");

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{}</title>", escape(title));
    let _ = writeln!(page, "<style>{}</style>\n</head>\n<body>", STYLE);
    page.push_str("<main id=\"main-content\">\n<div id=\"luke-text-container\">\n");
    page.push_str(&render_body(ops));
    page.push_str("</div>\n</main>\n");
    page.push_str(
        "<aside id=\"josephus-sidebar\">\n<button id=\"close-sidebar\" type=\"button\">&times;</button>\n<div id=\"josephus-content\"></div>\n</aside>\n",
    );
    let _ = writeln!(page, "<script type=\"application/json\" id=\"parallels-data\">{}</script>", data);
    let _ = writeln!(page, "<script>{}</script>\n</body>\n</html>", SCRIPT);
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::parse_document;
    use crate::render::render_document;

    fn sample() -> (Vec<RenderOp>, ParallelMapping) {
        let mapping = ParallelMapping::from_json(
            r#"{"3": {"1": [{"ref": "Antiquities 18.2.1", "text": "</script> & more"}]}}"#,
        )
        .unwrap();
        let doc = parse_document("Luke 3:1: In the fifteenth <year>\n\nLuke 3:2: Annas & Caiaphas\n\nLuke 4:1: Jesus");
        (render_document(&doc, &mapping), mapping)
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_body_markup() {
        let (ops, _) = sample();
        let body = render_body(&ops);

        assert_eq!(body.matches("<h2 class=\"chapter-title\">").count(), 2);
        assert!(body.contains("<h2 class=\"chapter-title\">Chapter 3</h2>"));
        assert!(body.contains(
            "<span class=\"verse parallel\" data-luke-ref=\"3:1\"><sup class=\"verse-number\">1</sup> In the fifteenth &lt;year&gt; </span>"
        ));
        assert!(body.contains("<span class=\"verse\"><sup class=\"verse-number\">2</sup> Annas &amp; Caiaphas </span>"));
        assert_eq!(body.matches("<div>").count(), body.matches("</div>").count());
    }

    #[test]
    fn test_page_embeds_mapping_safely() {
        let (ops, mapping) = sample();
        let page = render_page("Luke", &ops, &mapping).unwrap();

        assert!(page.contains("id=\"josephus-sidebar\""));
        assert!(page.contains("id=\"close-sidebar\""));
        assert!(page.contains(r#""ref":"Antiquities 18.2.1""#));
        assert!(page.contains("<\\/script>"));
        assert_eq!(page.matches("</script>").count(), 2);
    }
}
