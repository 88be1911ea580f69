//! Paginated report document.
//!
//! Pages are written one at a time into a single self-contained HTML file,
//! each page an inline SVG followed by a CSS page break, so the document
//! prints to one page per sheet.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::output::ensure_parent;

const STYLE: &str = "body{margin:0;background:#0d0f14;color:#e8eaf0;font-family:sans-serif}\
header{padding:12px 24px;color:#7a8099;font-size:13px}\
section.page{page-break-after:always;break-after:page}\
section.page svg{display:block;width:100%;height:auto}";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Open multi-page document.
///
/// Closed by [`finish`](ReportDocument::finish); if dropped first, the
/// footer is still written so the pages already added are kept.
pub struct ReportDocument {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    pages: usize,
}

impl ReportDocument {
    pub fn create(path: impl AsRef<Path>, title: &str, generated: DateTime<Local>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_parent(&path)?;
        let file = File::create(&path)
            .with_context(|| format!("creating document {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        write!(
            writer,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
             <header>{title} &middot; generated {generated}</header>\n",
            title = escape(title),
            generated = generated.format("%Y-%m-%d %H:%M"),
        )?;
        debug!(path = %path.display(), "Document opened");

        Ok(ReportDocument {
            path,
            writer: Some(writer),
            pages: 0,
        })
    }

    /// Appends one rendered SVG page.
    pub fn add_page(&mut self, title: &str, svg: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .with_context(|| format!("document {} is closed", self.path.display()))?;
        self.pages += 1;
        write!(
            writer,
            "<section class=\"page\" id=\"page-{}\" aria-label=\"{}\">\n{}\n</section>\n",
            self.pages,
            escape(title),
            svg
        )?;
        Ok(())
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the footer and closes the file.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.close()?;
        info!(path = %self.path.display(), pages = self.pages, "Document written");
        Ok(self.path.clone())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.write_all(b"</body>\n</html>\n")?;
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for ReportDocument {
    fn drop(&mut self) {
        if self.writer.is_none() {
            return;
        }
        warn!(path = %self.path.display(), pages = self.pages, "Document closed before finishing");
        if let Err(e) = self.close() {
            error!(path = %self.path.display(), error = %e, "Failed to close document");
        }
    }
}
