use crate::render::{escape, RenderedPlot};
use antcore::AntennaModel;

/// What the push server currently hands out.
#[derive(Debug, Clone, Default)]
pub struct PublishedState {
    pub title: String,
    pub pages: Vec<RenderedPlot>,
    /// Parsed model for remote viewers, absent until published.
    pub model: Option<AntennaModel>,
    /// Last status line, shown above the plot links.
    pub status: Option<String>,
}

impl PublishedState {
    pub fn page(&self, name: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.content.as_str())
    }

    /// Landing page linking every published plot.
    pub fn index_page(&self) -> String {
        let title = escape(&self.title);
        let mut page = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n"
        );
        if let Some(status) = &self.status {
            page.push_str(&format!("<p class=\"status\">{}</p>\n", escape(status)));
        }
        page.push_str("<ul>\n");
        for plot in &self.pages {
            let name = escape(&plot.name);
            page.push_str(&format!("<li><a href=\"/plot/{name}\">{name}</a></li>\n"));
        }
        if self.model.is_some() {
            page.push_str("<li><a href=\"/model\">model (JSON)</a></li>\n");
        }
        page.push_str("</ul>\n</body>\n</html>\n");
        page
    }
}
