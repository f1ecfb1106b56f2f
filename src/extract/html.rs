// src/extract/html.rs
// =============================================================================
// Pulls article and comment text out of a page.
//
// Pages come in two layouts, told apart by a class on the body container:
//
//   Article body  (.article-formatted-body > div)
//     parent has "article-formatted-body_version-1" -> legacy: one block
//     parent has "article-formatted-body_version-2" -> nodes: walk children
//
//   Comment body  (.tm-comment__body-content > div)
//     parent has "tm-comment__body-content_v2"      -> nodes: walk children
//     anything else                                  -> legacy: one block per comment
//
// In the nodes layout, h1-h6 and p elements are leaves and everything else is
// a container we recurse into.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (html5ever, so broken markup is repaired, never rejected)
// - Supports CSS selectors for finding elements
//
// Rust concepts:
// - Enums: PageKind and Layout make the variant dispatch explicit
// - Recursion over borrowed tree nodes (ElementRef<'a>)
// =============================================================================

use super::clean::{clean_markup, is_blank};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// Selectors are constants and known to be valid
static TITLE: Lazy<Selector> = Lazy::new(|| selector(".tm-title.tm-title_h1"));
static ARTICLE_BODY: Lazy<Selector> = Lazy::new(|| selector(".article-formatted-body > div"));
static COMMENT_BODY: Lazy<Selector> = Lazy::new(|| selector(".tm-comment__body-content > div"));

const ARTICLE_LEGACY_CLASS: &str = "article-formatted-body_version-1";
const ARTICLE_NODES_CLASS: &str = "article-formatted-body_version-2";
const COMMENT_NODES_CLASS: &str = "tm-comment__body-content_v2";

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e:?}"))
}

/// Which page of a link we are looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Article,
    Comments,
}

/// Which body layout the page used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One block of markup per body container
    Legacy,
    /// Headings and paragraphs nested in containers
    Nodes,
    /// No recognizable body on the page
    Missing,
}

/// Text pulled from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub layout: Layout,
    /// Cleaned, non-empty fragments in document order
    pub fragments: Vec<String>,
}

impl Extraction {
    /// What a page that could not be fetched contributes
    pub fn empty() -> Self {
        Extraction {
            layout: Layout::Missing,
            fragments: Vec::new(),
        }
    }
}

// Extracts text fragments from a page
//
// Parameters:
//   markup: the raw HTML of the page
//   kind: article page or comments page
//
// Returns: the detected layout plus the cleaned fragments
pub fn extract(markup: &str, kind: PageKind) -> Extraction {
    let document = Html::parse_document(markup);
    let mut fragments = Vec::new();

    let layout = match kind {
        PageKind::Article => {
            if let Some(title) = document.select(&TITLE).next() {
                push_cleaned(&title.inner_html(), &mut fragments);
            }
            extract_article_body(&document, &mut fragments)
        }
        PageKind::Comments => extract_comments(&document, &mut fragments),
    };

    Extraction { layout, fragments }
}

fn extract_article_body(document: &Html, fragments: &mut Vec<String>) -> Layout {
    let blocks: Vec<ElementRef> = document.select(&ARTICLE_BODY).collect();
    let Some(first) = blocks.first() else {
        return Layout::Missing;
    };

    if blocks.iter().any(|b| parent_has_class(b, ARTICLE_LEGACY_CLASS)) {
        push_cleaned(&first.inner_html(), fragments);
        Layout::Legacy
    } else if blocks.iter().any(|b| parent_has_class(b, ARTICLE_NODES_CLASS)) {
        for block in &blocks {
            collect_children(block, fragments);
        }
        Layout::Nodes
    } else {
        Layout::Missing
    }
}

fn extract_comments(document: &Html, fragments: &mut Vec<String>) -> Layout {
    let blocks: Vec<ElementRef> = document.select(&COMMENT_BODY).collect();
    if blocks.is_empty() {
        return Layout::Missing;
    }

    if blocks.iter().any(|b| parent_has_class(b, COMMENT_NODES_CLASS)) {
        for block in &blocks {
            collect_children(block, fragments);
        }
        Layout::Nodes
    } else {
        for block in &blocks {
            push_cleaned(&block.inner_html(), fragments);
        }
        Layout::Legacy
    }
}

fn collect_children(container: &ElementRef, fragments: &mut Vec<String>) {
    for child in container.children().filter_map(ElementRef::wrap) {
        collect_nodes(child, fragments);
    }
}

// Walks one node: leaves are collected, anything else is recursed into
fn collect_nodes(element: ElementRef, fragments: &mut Vec<String>) {
    match element.value().name() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p" => {
            push_cleaned(&element.inner_html(), fragments);
        }
        _ => collect_children(&element, fragments),
    }
}

fn push_cleaned(inner_html: &str, fragments: &mut Vec<String>) {
    let text = clean_markup(inner_html);
    if !is_blank(&text) {
        fragments.push(text);
    }
}

fn parent_has_class(element: &ElementRef, class: &str) -> bool {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .map_or(false, |parent| parent.value().classes().any(|c| c == class))
}
