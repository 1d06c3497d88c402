//! CSS-selector queries over whatthemovie pages.
//!
//! Documents are parsed with `scraper` and immediately reduced to owned
//! values, so nothing here is held across an `.await` by callers.

use std::collections::BTreeSet;

use scraper::{Html, Selector};

use crate::error::{WtmError, WtmResult};
use crate::types::SolutionLink;

pub const AUTHENTICITY_TOKEN: &str = "input[name='authenticity_token']";
pub const CSRF_META: &str = "meta[name='csrf-token']";
pub const STILL_SHOT: &str = "#still_shot";
pub const SOLUTION_BUTTON: &str = "#solucebutton";
pub const NSFW_MARKER: &str = "div.nsfw";
pub const TAG_LINKS: &str = "#shot_tag_list li a";

fn selector(css: &str) -> WtmResult<Selector> {
    Selector::parse(css).map_err(|e| WtmError::Selector(format!("{css}: {e}")))
}

/// Attribute of the first element matching `css`.
pub fn select_attr(doc: &Html, css: &str, attr: &str) -> WtmResult<Option<String>> {
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.to_string()))
}

/// Whether any element matches `css`.
pub fn exists(doc: &Html, css: &str) -> WtmResult<bool> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).next().is_some())
}

/// Text content of every element matching `css`.
pub fn select_texts(doc: &Html, css: &str) -> WtmResult<Vec<String>> {
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .collect())
}

/// `value` of the login form's authenticity token field.
pub fn authenticity_token(html: &str) -> WtmResult<Option<String>> {
    let doc = Html::parse_document(html);
    select_attr(&doc, AUTHENTICITY_TOKEN, "value")
}

/// `content` of the page's `csrf-token` meta tag.
pub fn csrf_token(html: &str) -> WtmResult<Option<String>> {
    let doc = Html::parse_document(html);
    select_attr(&doc, CSRF_META, "content")
}

/// Everything the acquisition loop needs from a `/shot/<id>` page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotPage {
    /// Final URL of the page, used as `Referer` for follow-up requests.
    pub page_url: String,
    /// `src` of the displayed still, as written in the page.
    pub image_src: String,
    pub solution: SolutionLink,
    pub nsfw: bool,
    pub tags: BTreeSet<String>,
    /// Page-level CSRF token, when the page carries one.
    pub csrf_token: Option<String>,
}

impl ShotPage {
    /// Parse a shot page. A page without `#still_shot` is an upstream
    /// contract break and fails with `MissingRequiredElement`.
    pub fn parse(html: &str, page_url: &str) -> WtmResult<Self> {
        let doc = Html::parse_document(html);

        let image_src = select_attr(&doc, STILL_SHOT, "src")?.ok_or_else(|| {
            WtmError::MissingRequiredElement {
                selector: STILL_SHOT,
                page_url: page_url.to_string(),
            }
        })?;

        let solution = SolutionLink::from_href(select_attr(&doc, SOLUTION_BUTTON, "href")?);
        let nsfw = exists(&doc, NSFW_MARKER)?;
        let tags = select_texts(&doc, TAG_LINKS)?.into_iter().collect();
        let csrf_token = select_attr(&doc, CSRF_META, "content")?;

        Ok(Self {
            page_url: page_url.to_string(),
            image_src,
            solution,
            nsfw,
            tags,
            csrf_token,
        })
    }
}
