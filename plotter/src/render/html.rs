use super::escape;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// How exported pages load plotly.js.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HtmlExportOption {
    /// Script tag pointing at the plotly CDN.
    #[default]
    Cdn,
    /// `plotly.min.js` expected next to the exported file.
    Directory,
}

impl HtmlExportOption {
    pub fn script_tag(&self) -> String {
        let src = match self {
            HtmlExportOption::Cdn => PLOTLY_CDN,
            HtmlExportOption::Directory => "plotly.min.js",
        };
        format!(r#"<script src="{src}" charset="utf-8"></script>"#)
    }
}

impl std::str::FromStr for HtmlExportOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cdn" => Ok(HtmlExportOption::Cdn),
            "directory" => Ok(HtmlExportOption::Directory),
            other => Err(format!("unknown html export option \"{other}\", expected cdn or directory")),
        }
    }
}

/// A plotly figure plus an optional script run once it is drawn.
/// `{plot_id}` in the script is replaced by the id of the plot div.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotlyFigure {
    pub data: Vec<Value>,
    pub layout: Value,
    pub post_script: Option<String>,
}

impl PlotlyFigure {
    pub fn new(data: Vec<Value>, layout: Value) -> Self {
        Self {
            data,
            layout,
            post_script: None,
        }
    }

    pub fn with_script(mut self, script: String) -> Self {
        self.post_script = Some(script);
        self
    }

    /// Stand-alone HTML page drawing the figure into a div `plot_id`.
    pub fn to_html(
        &self,
        title: &str,
        plot_id: &str,
        export: HtmlExportOption,
        config: &Value,
    ) -> anyhow::Result<String> {
        let data = serde_json::to_string(&self.data)?;
        let layout = serde_json::to_string(&self.layout)?;
        let config = serde_json::to_string(config)?;
        let post = self
            .post_script
            .as_deref()
            .map(|s| s.replace("{plot_id}", plot_id))
            .unwrap_or_default();
        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n");
        page.push_str(&format!("<title>{}</title>\n", escape(title)));
        page.push_str(&export.script_tag());
        page.push_str("\n</head>\n<body>\n");
        page.push_str(&format!(
            r#"<div id="{plot_id}" class="plotly-graph-div" style="height:95vh; width:100%;"></div>"#
        ));
        page.push_str("\n<script type=\"text/javascript\">\n");
        page.push_str(&format!(
            "Plotly.newPlot(\"{plot_id}\", {data}, {layout}, {config}).then(function () {{\n{post}\n}});\n"
        ));
        page.push_str("</script>\n</body>\n</html>\n");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_embeds_figure_and_script() {
        let figure = PlotlyFigure::new(vec![json!({"type": "scatter", "x": [1, 2]})], json!({}))
            .with_script("var p = document.getElementById('{plot_id}');".into());
        let html = figure
            .to_html("a <b>", "plot-azimuth", HtmlExportOption::Directory, &json!({}))
            .unwrap();
        assert!(html.contains("<title>a &lt;b&gt;</title>"));
        assert!(html.contains(r#"<script src="plotly.min.js""#));
        assert!(html.contains(r#"Plotly.newPlot("plot-azimuth", [{"type":"scatter","x":[1,2]}]"#));
        assert!(html.contains("getElementById('plot-azimuth')"));
    }

    #[test]
    fn export_option_parses() {
        assert_eq!("CDN".parse::<HtmlExportOption>().unwrap(), HtmlExportOption::Cdn);
        assert!("inline".parse::<HtmlExportOption>().is_err());
    }
}
