// HTML output for a `Stage`.
//
// `write_page` serializes the whole stage into one self-contained document:
// an inline stylesheet built from the active mode's palette and fonts, the
// mode indicator, the header, the poem container, the Randomize form and the
// slogan form. Interactions are plain form POSTs (`/randomize`, `/slogan`)
// answered with a redirect back to `/`, so the page works without scripts.
// Scripts are small inline hooks. Each image's `onerror` reports a failed
// load to `/image-failed/<block>` and reloads. The Randomize form's
// `onsubmit` refuses a second submit while the button is disabled, then
// disables it and shows the busy label until the redirect lands. The slogan
// form's `onsubmit` shows the loading text the same way.
//
// Entry staggering uses `animation-delay` from each block's
// `enter_delay_ms`. Notes are present in the markup but hidden until the
// stanza is hovered.
//
// Every piece of dataset text goes through `escape_html`.

use std::fmt::Write;

use crate::render::{PoemPane, PoemView, StanzaBlock};
use crate::slogan::SLOGAN_LOADING_TEXT;
use crate::stage::{BUSY_LABEL, Stage, ThemeStyle};

/// Palette used before any mode has been applied.
const NEUTRAL_THEME: (&str, &str, &str, &str) = ("#222222", "#555555", "#888888", "#f4f4f4");

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serialize `stage` into a complete HTML document.
pub fn write_page(stage: &Stage) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&stage.title));
    write_style(&mut html, stage.theme.as_ref());
    html.push_str("</head>\n");

    let body_class = stage.theme.as_ref().map_or("", |t| t.body_class);
    let _ = writeln!(html, "<body class=\"{body_class}\">");

    if let Some(indicator) = &stage.indicator {
        let _ = writeln!(
            html,
            "<div class=\"mode-indicator\">{}</div>",
            escape_html(indicator)
        );
    }

    let _ = write!(
        html,
        "<header>\n<h1>{}</h1>\n<p class=\"subtitle\">{}</p>\n</header>\n",
        escape_html(&stage.title),
        escape_html(&stage.subtitle)
    );

    html.push_str("<main id=\"poem-container\">\n");
    match &stage.poem {
        PoemPane::Empty => {}
        PoemPane::Poem(view) => write_poem(&mut html, view),
        PoemPane::Error(message) => {
            let _ = writeln!(html, "<div class=\"error\">{}</div>", escape_html(message));
        }
    }
    html.push_str("</main>\n");

    let disabled = if stage.control.disabled { " disabled" } else { "" };
    let _ = write!(
        html,
        "<form class=\"controls\" method=\"post\" action=\"/randomize\" \
         onsubmit=\"var b=document.getElementById('regenerate-btn');\
         if(b.disabled){{return false;}}\
         b.disabled=true;b.textContent='{busy}';return true;\">\n\
         <button id=\"regenerate-btn\" type=\"submit\"{disabled}>{}</button>\n\
         </form>\n",
        escape_html(stage.control.label),
        busy = escape_html(BUSY_LABEL),
    );

    let _ = write!(
        html,
        "<form id=\"aussie-slogan\" method=\"post\" action=\"/slogan\" \
         onsubmit=\"this.querySelector('.slogan-text').textContent='{loading}';return true;\">\n\
         <button class=\"slogan-text\" type=\"submit\">{}</button>\n\
         </form>\n",
        escape_html(&stage.slogan),
        loading = escape_html(SLOGAN_LOADING_TEXT),
    );

    html.push_str("</body>\n</html>\n");
    html
}

fn write_style(html: &mut String, theme: Option<&ThemeStyle>) {
    let (primary, secondary, accent, text) = match theme {
        Some(t) => (
            t.palette.primary,
            t.palette.secondary,
            t.palette.accent,
            t.palette.text,
        ),
        None => NEUTRAL_THEME,
    };
    let (heading_font, body_font) = theme.map_or(("Georgia, serif", "Georgia, serif"), |t| {
        (t.fonts.heading, t.fonts.body)
    });
    let background = theme.map_or(primary, |t| t.background);

    html.push_str("<style>\n");
    let _ = write!(
        html,
        ":root {{\n  --primary-color: {primary};\n  --secondary-color: {secondary};\n  \
         --accent-color: {accent};\n  --text-color: {text};\n  \
         --heading-font: {heading_font};\n  --body-font: {body_font};\n}}\n"
    );
    let _ = writeln!(
        html,
        "body {{ margin: 0; min-height: 100vh; background: {background}; \
         color: var(--text-color); font-family: var(--body-font); }}"
    );
    html.push_str(
        "h1, .act-label { font-family: var(--heading-font); color: var(--secondary-color); }\n\
         header { text-align: center; padding: 2rem 1rem 1rem; }\n\
         .mode-indicator { position: fixed; top: 1rem; right: 1rem; padding: 0.4rem 0.8rem; \
         border: 2px solid var(--accent-color); border-radius: 1rem; }\n\
         #poem-container { max-width: 48rem; margin: 0 auto; padding: 1rem; }\n\
         .poem-section { opacity: 0; animation: enter 0.6s ease-out forwards; margin-bottom: 2rem; }\n\
         @keyframes enter { from { opacity: 0; transform: translateY(1rem); } \
         to { opacity: 1; transform: none; } }\n\
         .image-container img { width: 100%; border-radius: 0.5rem; }\n\
         .stanza-notes { display: none; font-style: italic; opacity: 0.8; }\n\
         .poem-section:hover .stanza-notes { display: block; }\n\
         .error { text-align: center; color: var(--secondary-color); }\n\
         .controls { text-align: center; margin: 2rem 0; }\n\
         #regenerate-btn { font-size: 1.1rem; padding: 0.6rem 1.4rem; cursor: pointer; \
         background: var(--secondary-color); color: var(--primary-color); border: none; }\n\
         #regenerate-btn:disabled { opacity: 0.5; cursor: wait; }\n\
         #aussie-slogan { text-align: center; padding-bottom: 2rem; }\n\
         .slogan-text { background: none; border: none; color: var(--accent-color); \
         font: inherit; cursor: pointer; }\n",
    );
    html.push_str("</style>\n");
}

fn write_poem(html: &mut String, view: &PoemView) {
    for (index, block) in view.blocks.iter().enumerate() {
        write_block(html, index, block);
    }
}

fn write_block(html: &mut String, index: usize, block: &StanzaBlock) {
    let _ = writeln!(
        html,
        "<section class=\"poem-section\" style=\"animation-delay: {}ms\">",
        block.enter_delay_ms
    );

    if let Some(label) = &block.act_label {
        let _ = writeln!(html, "<div class=\"act-label\">{}</div>", escape_html(label));
    }

    // A block reports its failure once; after the retry a broken image stays.
    let onerror = if block.image_retried {
        String::new()
    } else {
        format!(
            " onerror=\"this.onerror=null;fetch('/image-failed/{index}',{{method:'POST'}})\
             .then(function(){{location.reload();}})\""
        )
    };
    let _ = writeln!(
        html,
        "<div class=\"image-container\"><img src=\"{}\" alt=\"{}\" data-tag=\"{}\" loading=\"lazy\"{onerror}></div>",
        escape_html(&block.image.src),
        escape_html(&block.image.alt),
        escape_html(&block.image.tag)
    );

    html.push_str("<div class=\"stanza\">\n");
    for line in &block.lines {
        let _ = writeln!(html, "<p>{}</p>", escape_html(line));
    }
    html.push_str("</div>\n");

    if let Some(notes) = &block.notes {
        let _ = writeln!(html, "<div class=\"stanza-notes\">{}</div>", escape_html(notes));
    }

    html.push_str("</section>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use crate::render::RENDER_ERROR_MESSAGE;
    use crate::theme::ModeId;
    use crate::verse::Act;

    fn block(retried: bool) -> StanzaBlock {
        StanzaBlock {
            act: Some(Act::Resolution),
            act_label: Some("ACT_3 (happy ending)".into()),
            image: Image::new("images/sunset.jpg", "Sunset", "sunset"),
            lines: vec!["the <end>".into()],
            notes: Some("Rachael & co".into()),
            enter_delay_ms: 200,
            image_retried: retried,
        }
    }

    fn stage_with(blocks: Vec<StanzaBlock>) -> Stage {
        let mut stage = Stage::new();
        stage.apply_mode(ModeId::Retro);
        stage.show_poem(PoemPane::Poem(PoemView {
            title: "t".into(),
            subtitle: "s".into(),
            blocks,
        }));
        stage
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn page_carries_mode_and_heading() {
        let mut stage = stage_with(Vec::new());
        stage.set_heading("Dog+Me+Daddy", "A marketing adventure against blurbo");
        let html = write_page(&stage);
        assert!(html.contains("<body class=\"retro-mode\">"));
        assert!(html.contains("<div class=\"mode-indicator\">Retro Mode</div>"));
        assert!(html.contains("--primary-color: #ff6b35;"));
        assert!(html.contains("<h1>Dog+Me+Daddy</h1>"));
        assert!(html.contains("A marketing adventure against blurbo"));
    }

    #[test]
    fn block_markup_has_label_delay_and_hidden_notes() {
        let html = write_page(&stage_with(vec![block(false)]));
        assert!(html.contains("animation-delay: 200ms"));
        assert!(html.contains("<div class=\"act-label\">ACT_3 (happy ending)</div>"));
        assert!(html.contains("<p>the &lt;end&gt;</p>"));
        assert!(html.contains("<div class=\"stanza-notes\">Rachael &amp; co</div>"));
        assert!(html.contains("/image-failed/0"));
    }

    #[test]
    fn retried_image_has_no_failure_hook() {
        let html = write_page(&stage_with(vec![block(true)]));
        assert!(!html.contains("/image-failed/"));
    }

    #[test]
    fn busy_control_is_disabled() {
        let mut stage = Stage::new();
        stage.begin_busy();
        let html = write_page(&stage);
        assert!(html.contains(
            "<button id=\"regenerate-btn\" type=\"submit\" disabled>Regenerating...</button>"
        ));
    }

    #[test]
    fn error_pane_replaces_poem() {
        let mut stage = Stage::new();
        stage.show_poem(PoemPane::Error(RENDER_ERROR_MESSAGE.into()));
        let html = write_page(&stage);
        assert!(html.contains(
            "<div class=\"error\">Failed to load poem. Please refresh.</div>"
        ));
        assert!(!html.contains("poem-section\""));
    }

    #[test]
    fn forms_guard_and_label_before_submitting() {
        let html = write_page(&Stage::new());
        assert!(html.contains("if(b.disabled){return false;}"));
        assert!(html.contains("b.disabled=true;b.textContent='Regenerating...';return true;"));
        assert!(html.contains(".textContent='Getting new wisdom...';return true;"));
        // The server-rendered label stays the idle one.
        assert!(html.contains(">Randomize</button>"));
    }

    #[test]
    fn unthemed_page_uses_neutral_palette() {
        let html = write_page(&Stage::new());
        assert!(html.contains("<body class=\"\">"));
        assert!(html.contains("--primary-color: #222222;"));
        assert!(!html.contains("mode-indicator\">"));
    }
}
