use crate::render::{Backend, PlotData, PlotKind, RenderedPlot};
use crate::workflow::config::PlotConfig;
use anyhow::Context;
use antcore::model::swr::{apply_band_specs, ham_bands};
use antcore::processing::{CutAngles, PatternSet};
use antcore::telemetry::LogManager;
use antcore::AntennaModel;
use std::fs;
use std::path::{Path, PathBuf};

/// Turns a parsed model into plot data and writes what the backends render.
#[derive(Clone)]
pub struct Runner {
    config: PlotConfig,
}

impl Runner {
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn load_model(path: &Path) -> anyhow::Result<AntennaModel> {
        antcore::parse_file(path).with_context(|| format!("reading antenna data {}", path.display()))
    }

    pub fn prepare(&self, model: AntennaModel) -> anyhow::Result<PlotData> {
        let mut model = model;
        if let Some(title) = &self.config.title {
            model.title = title.clone();
        }
        let log = LogManager::new(model.title.as_str());
        if let Some(step) = self.config.interpolate_azimuth_step {
            model = model
                .interpolate_azimuth(step)
                .with_context(|| format!("interpolating azimuth with step {step}"))?;
        }
        let scaler = self.config.scaler()?;
        let selected = self.config.selected_plots();

        let patterns = if selected.iter().any(PlotKind::needs_pattern) && !model.gains().is_empty() {
            let polarization = self
                .config
                .polarization
                .or_else(|| model.default_polarization())
                .context("input has pattern data but no polarization")?;
            let cut = CutAngles {
                azimuth: self.config.angle_azimuth,
                elevation: self.config.angle_elevation,
            };
            Some(PatternSet::new(&model, polarization, cut).context("preparing pattern cuts")?)
        } else {
            None
        };

        let swr = if selected.iter().any(PlotKind::needs_impedance) && model.has_impedance() {
            Some(
                model
                    .swr(self.config.system_impedance)
                    .context("computing VSWR")?,
            )
        } else {
            None
        };

        let mut kinds = Vec::with_capacity(selected.len());
        for kind in selected {
            let (available, what) = if kind.needs_pattern() {
                (patterns.is_some(), "pattern")
            } else if kind.needs_impedance() {
                (swr.is_some(), "impedance")
            } else {
                (model.has_geometry(), "geometry")
            };
            if available {
                kinds.push(kind);
            } else {
                log.warn(&format!("skipping {} plot: input has no {what}", kind.label()));
            }
        }
        if kinds.is_empty() {
            anyhow::bail!("nothing to plot in \"{}\"", model.title);
        }

        let mut swr_target = None;
        let mut bands = Vec::new();
        if let Some(series) = &swr {
            if let Some(target) = self.config.swr.target_frequency {
                if series.contains_frequency(target) {
                    swr_target = Some(target);
                } else {
                    let (lo, hi) = series.frequency_range();
                    log.warn(&format!(
                        "target frequency {target} MHz outside {lo}..{hi} MHz, ignored"
                    ));
                }
            }
            let mut all = ham_bands();
            apply_band_specs(&mut all, &self.config.swr.bands).context("parsing --band")?;
            bands = series.bands_in_range(&all).into_iter().cloned().collect();
        }

        log.record(&format!(
            "plots: {}",
            kinds.iter().map(PlotKind::name).collect::<Vec<_>>().join(", ")
        ));
        Ok(PlotData {
            title: model.title.clone(),
            kinds,
            patterns,
            swr,
            swr_target,
            bands,
            geometry: model.geometry().clone(),
            scaler,
        })
    }

    pub fn render(&self, data: &PlotData, backend: &dyn Backend) -> anyhow::Result<Vec<RenderedPlot>> {
        backend
            .render(data, &self.config)
            .with_context(|| format!("rendering with the {} backend", backend.name()))
    }
}

/// Writes the single SVG document of the image backend.
pub fn write_image(plots: &[RenderedPlot], path: &Path) -> anyhow::Result<PathBuf> {
    let plot = plots.first().context("image backend produced no output")?;
    if !path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    {
        log::warn!("{} will contain SVG data", path.display());
    }
    create_parent(path)?;
    fs::write(path, &plot.content).with_context(|| format!("writing {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Writes `<prefix>-<name>.html` per plot.
pub fn write_html(plots: &[RenderedPlot], prefix: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(plots.len());
    for plot in plots {
        let path = PathBuf::from(format!("{prefix}-{}.html", plot.name));
        create_parent(&path)?;
        fs::write(&path, &plot.content).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}
