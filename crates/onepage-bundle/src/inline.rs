//! Asset reference inlining.
//!
//! Replaces `<script src="...">` and `<link rel="stylesheet" href="...">` tags
//! with the referenced file's content wrapped in a `<script>` or `<style>`
//! block.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::assets::minify_css;

/// Kind of asset a reference tag points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// `<script src="app.js"></script>`
    Script,
    /// `<link rel="stylesheet" href="app.css">`
    Style,
}

impl AssetKind {
    /// Inlining passes, in the order they are applied.
    pub const PASSES: [AssetKind; 2] = [AssetKind::Script, AssetKind::Style];

    /// Tag matcher for this kind. Capture group 1 is the referenced path.
    fn pattern(self) -> &'static Regex {
        static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"<script\s+src="([^"]+)"></script>"#).expect("Invalid script tag regex")
        });
        static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"<link\s+rel="stylesheet"\s+href="([^"]+)">"#)
                .expect("Invalid stylesheet tag regex")
        });

        match self {
            AssetKind::Script => &SCRIPT_RE,
            AssetKind::Style => &STYLE_RE,
        }
    }

    /// Wrap file content in the block element for this kind.
    pub fn render(self, content: &str) -> String {
        match self {
            AssetKind::Script => {
                format!("<script>\n{}\n</script>", escape_script(content))
            }
            AssetKind::Style => format!("<style>\n{}\n</style>", content),
        }
    }
}

/// A reference from the document to an external asset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Asset kind
    pub kind: AssetKind,

    /// Path as written in the tag, relative to the working root
    pub path: String,
}

/// Find all references of one kind, in document order.
pub fn find_references(html: &str, kind: AssetKind) -> Vec<AssetReference> {
    kind.pattern()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| AssetReference {
            kind,
            path: m.as_str().to_string(),
        })
        .collect()
}

/// Escape closing script tags so inlined code cannot end its block early.
pub fn escape_script(content: &str) -> String {
    content.replace("</script>", "<\\/script>")
}

/// Inlines asset references relative to a working root.
#[derive(Debug, Clone)]
pub struct AssetInliner {
    root: PathBuf,
    minify_css: bool,
}

impl AssetInliner {
    /// Create an inliner resolving paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            minify_css: false,
        }
    }

    /// Minify stylesheet content before inlining it.
    pub fn with_minified_css(mut self, minify: bool) -> Self {
        self.minify_css = minify;
        self
    }

    /// Replace every reference of `kind` whose target exists.
    ///
    /// Tags pointing at missing files are left untouched.
    pub fn inline(&self, html: &str, kind: AssetKind) -> String {
        kind.pattern()
            .replace_all(html, |caps: &Captures| self.inline_tag(caps, kind))
            .into_owned()
    }

    /// Run every inlining pass in order.
    pub fn inline_all(&self, html: &str) -> String {
        AssetKind::PASSES
            .iter()
            .fold(html.to_string(), |doc, kind| self.inline(&doc, *kind))
    }

    fn inline_tag(&self, caps: &Captures, kind: AssetKind) -> String {
        let tag = &caps[0];
        let src = &caps[1];
        let path = self.root.join(src);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Asset not inlined: {}: {}", path.display(), e);
                return tag.to_string();
            }
        };

        tracing::debug!("Inlined {:?} asset {}", kind, src);

        match kind {
            AssetKind::Style if self.minify_css => match minify_css(&content) {
                Ok(minified) => kind.render(&minified),
                Err(e) => {
                    tracing::warn!("Failed to minify {}: {}", src, e);
                    kind.render(&content)
                }
            },
            _ => kind.render(&content),
        }
    }
}
