//! HTML and JSON rendering of the tally.
//!
//! Output depends only on its inputs, so rendering the same snapshot twice
//! yields byte-identical files.

use crate::types::*;
use serde::Serialize;

/// Page-level settings shared by the live page and archived copies
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Link to the live stream, shown in the header
    pub stream_url: Option<String>,
    /// Heading shown above the list
    pub title: String,
    /// Relative link to the archive listing
    pub archive_link: Option<String>,
}

impl PageOptions {
    pub fn live(stream_url: Option<String>) -> Self {
        Self {
            stream_url,
            title: "Game Suggestions".to_string(),
            archive_link: Some("archives/index.html".to_string()),
        }
    }
}

pub fn escape_html(text: &str) -> String {
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

fn vote_label(votes: u32) -> &'static str {
    if votes == 1 {
        "vote"
    } else {
        "votes"
    }
}

/// Ranked items as pretty JSON (`votes.json`)
pub fn render_votes_json(items: &[Item]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(items)
}

fn render_item(item: &Item) -> String {
    let link = item
        .url
        .as_deref()
        .map(|url| {
            format!(
                "\n    <div class=\"store-link\"><a href=\"{}\" target=\"_blank\">View on Store</a></div>",
                escape_html(url)
            )
        })
        .unwrap_or_default();

    format!(
        "  <div class=\"game\">\n    <div class=\"votes\">{} {}</div>\n    <div class=\"game-name\">{}</div>\n    <div class=\"suggester\">Suggested by: {} at {}</div>{}\n  </div>\n",
        item.votes,
        vote_label(item.votes),
        escape_html(&item.name),
        escape_html(&item.user),
        escape_html(&item.time),
        link
    )
}

/// Full tally page (`index.html` and archived copies)
pub fn render_tally_page(items: &[Item], options: &PageOptions) -> String {
    let mut links = String::new();
    if let Some(url) = &options.stream_url {
        links.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\">Watch Live</a>",
            escape_html(url)
        ));
    }
    if let Some(archive) = &options.archive_link {
        links.push_str(&format!(
            "<a href=\"{}\">View Archives</a>",
            escape_html(archive)
        ));
    }

    let list: String = if items.is_empty() {
        "  <p class=\"empty\">No votes yet.</p>\n".to_string()
    } else {
        items.iter().map(render_item).collect()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="UTF-8"/>
<meta http-equiv="Cache-Control" content="no-cache, no-store, must-revalidate"/>
<meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{title}</title>
<style>
body{{margin:0;font-family:monospace;color:#e0e0e0;background:#0a0a0a}}
.container{{max-width:900px;margin:2rem auto;padding:2rem}}
h1{{text-align:center;color:#00eaff}}
.links{{text-align:center;margin-bottom:1rem}}
.links a{{color:#00eaff;margin:0 0.5rem}}
.game{{border:2px solid #00eaff99;border-radius:12px;padding:1rem 1.5rem;margin:1rem 0}}
.votes{{font-weight:bold;color:#00eaff}}
.game-name{{font-size:1.5em;font-weight:bold;color:#00ff88}}
.suggester{{opacity:0.75;font-style:italic}}
.store-link a{{color:#888}}
</style>
</head><body>
<div class="container">
<h1>{title}</h1>
<div class="links">{links}</div>
<div id="games-list">
{list}</div>
<div class="howto">
<p>Vote for up to <strong>5 different games per day</strong>, but the same game only <strong>once per week</strong>.</p>
<p>In chat, type <code>!vote Game Name</code>. Votes reset every Saturday at midnight.</p>
</div>
</div>
</body></html>
"#,
        title = escape_html(&options.title),
        links = links,
        list = list,
    )
}

/// Listing of archived weeks, newest first (`archives/index.html`)
pub fn render_archive_index(entries: &[ArchiveEntry], stream_url: Option<&str>) -> String {
    let mut sorted: Vec<&ArchiveEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.week_id.cmp(&a.week_id));

    let mut html = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>Vote Archives</title>\n\
         <style>body{background:#0a0a0a;color:#c9d1d9;font-family:sans-serif;padding:20px}\
         .week{margin-bottom:1rem;padding:0.5rem 0;border-bottom:1px solid #333}\
         a{color:#888}</style></head><body>\n",
    );

    html.push_str("<div class=\"links\"><a href=\"../index.html\">Back to Suggestions</a>");
    if let Some(url) = stream_url {
        html.push_str(&format!(
            " <a href=\"{}\" target=\"_blank\">Watch Live</a>",
            escape_html(url)
        ));
    }
    html.push_str("</div>\n<h1>Vote Archives</h1>\n");

    if sorted.is_empty() {
        html.push_str("<p>No archives yet.</p>\n");
    }
    for entry in sorted {
        html.push_str(&format!(
            "<div class=\"week\"><strong>Week {}</strong><br>{} – {}<br>Total Votes: {}<br><a href=\"{}\">View Details</a></div>\n",
            escape_html(&entry.week_id),
            escape_html(&entry.start),
            escape_html(&entry.end),
            entry.total_votes,
            escape_html(&entry.file)
        ));
    }

    html.push_str("</body></html>\n");
    html
}
