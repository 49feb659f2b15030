use anyhow::Context;
use antcore::prelude::ScaleMethod;
use antcore::processing::DecibelStyle;
use antcore::{AntennaModel, Polarization};
use clap::Parser;
use generator::pattern::{demo_model, DemoConfig};
use gui_bridge::bridge::GuiBridge;
use render::{HtmlExportOption, OutputMode, PlotKind, PlotlyBackend, SvgBackend};
use std::path::PathBuf;
use std::process::Command;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::PlotConfig;
use workflow::runner::{write_html, write_image, Runner};

mod generator;
mod gui_bridge;
mod render;
mod workflow;

const VIEWER_BINARY: &str = "antenna-viewer";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plot antenna patterns, VSWR and geometry from NEC-2, MININEC, EZNEC or measurement files",
    allow_negative_numbers = true
)]
struct Args {
    /// Simulation report or measurement file
    #[arg(required_unless_present = "demo")]
    filename: Option<PathBuf>,
    /// Plot a synthetic dipole instead of a file
    #[arg(long)]
    demo: bool,
    /// Load plot defaults from YAML; options given here win
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    azimuth: bool,
    #[arg(long)]
    elevation: bool,
    #[arg(long)]
    plot3d: bool,
    #[arg(long)]
    plot_vswr: bool,
    #[arg(long)]
    plot_geo: bool,
    #[arg(long)]
    plot_smith: bool,

    /// Azimuth angle of the elevation cut in degrees
    #[arg(long)]
    angle_azimuth: Option<f64>,
    /// Elevation angle above the horizon of the azimuth cut in degrees
    #[arg(long)]
    angle_elevation: Option<f64>,
    /// arrl, linear, linear_db or linear_voltage
    #[arg(long)]
    scaling_method: Option<ScaleMethod>,
    /// Lowest dB value shown by the linear_db scaling
    #[arg(long)]
    scaling_mindb: Option<f64>,
    /// Reference impedance of the VSWR and Smith charts in ohm
    #[arg(long)]
    system_impedance: Option<f64>,

    #[arg(long)]
    target_swr_frequency: Option<f64>,
    /// Color of the minimum VSWR marker, "none" hides it
    #[arg(long)]
    swr_min_color: Option<String>,
    #[arg(long)]
    swr_target_color: Option<String>,
    #[arg(long)]
    swr_show_impedance: bool,
    /// Show |Z| and phase instead of real and imaginary part
    #[arg(long)]
    swr_plot_impedance_angle: bool,
    #[arg(long)]
    swr_show_bands: bool,
    /// name:low,high in MHz; high <= low removes a band
    #[arg(long = "band")]
    bands: Vec<String>,

    /// sum, h or v
    #[arg(long)]
    polarization: Option<Polarization>,
    /// Resample measurement data on this azimuth step in degrees
    #[arg(long)]
    interpolate_azimuth_step: Option<f64>,

    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    title_font_size: Option<u32>,
    #[arg(long)]
    dpi: Option<u32>,
    #[arg(long)]
    margin_3d: Option<u32>,
    #[arg(long)]
    wireframe: bool,
    /// absolute, relative or both
    #[arg(long)]
    decibel_style: Option<DecibelStyle>,

    /// Write all plots into one SVG image
    #[arg(long)]
    output_file: Option<PathBuf>,
    /// Write <PREFIX>-<plot>.html per plot
    #[arg(short = 'H', long, value_name = "PREFIX")]
    export_html: Option<String>,
    /// cdn or directory
    #[arg(long)]
    html_export_option: Option<HtmlExportOption>,
    /// Serve the HTML plots to a browser until Ctrl+C
    #[arg(short = 'S', long)]
    show_in_browser: bool,
    #[arg(long)]
    port: Option<u16>,
    /// Open the interactive viewer with a frequency slider
    #[arg(long)]
    with_slider: bool,
}

impl Args {
    fn requested_plots(&self) -> Vec<PlotKind> {
        [
            (self.azimuth, PlotKind::Azimuth),
            (self.elevation, PlotKind::Elevation),
            (self.plot_vswr, PlotKind::Vswr),
            (self.plot3d, PlotKind::Plot3d),
            (self.plot_geo, PlotKind::Geometry),
            (self.plot_smith, PlotKind::Smith),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect()
    }

    /// Overrides file settings with the options given on the command line.
    fn apply(&self, config: &mut PlotConfig) {
        let plots = self.requested_plots();
        if !plots.is_empty() {
            config.plots = plots;
        }
        macro_rules! set {
            ($field:expr, $value:expr) => {
                if let Some(v) = $value.clone() {
                    $field = v;
                }
            };
        }
        config.angle_azimuth = self.angle_azimuth.or(config.angle_azimuth);
        config.angle_elevation = self.angle_elevation.or(config.angle_elevation);
        set!(config.scaling_method, self.scaling_method);
        set!(config.scaling_mindb, self.scaling_mindb);
        set!(config.system_impedance, self.system_impedance);
        config.polarization = self.polarization.or(config.polarization);
        config.interpolate_azimuth_step = self.interpolate_azimuth_step.or(config.interpolate_azimuth_step);

        config.swr.target_frequency = self.target_swr_frequency.or(config.swr.target_frequency);
        set!(config.swr.min_color, self.swr_min_color);
        set!(config.swr.target_color, self.swr_target_color);
        config.swr.show_impedance |= self.swr_show_impedance;
        config.swr.plot_impedance_angle |= self.swr_plot_impedance_angle;
        config.swr.show_bands |= self.swr_show_bands;
        config.swr.bands.extend(self.bands.iter().cloned());

        if self.title.is_some() {
            config.title = self.title.clone();
        }
        config.title_font_size = self.title_font_size.or(config.title_font_size);
        set!(config.dpi, self.dpi);
        set!(config.margin_3d, self.margin_3d);
        config.wireframe |= self.wireframe;
        set!(config.decibel_style, self.decibel_style);
        set!(config.html_export_option, self.html_export_option);
        set!(config.port, self.port);
    }

    fn output_mode(&self) -> anyhow::Result<OutputMode> {
        let mut modes = Vec::new();
        if let Some(path) = &self.output_file {
            modes.push(OutputMode::Image(path.clone()));
        }
        if let Some(prefix) = &self.export_html {
            modes.push(OutputMode::Html(prefix.clone()));
        }
        if self.show_in_browser {
            modes.push(OutputMode::Browser);
        }
        if modes.len() > 1 {
            anyhow::bail!("--output-file, --export-html and --show-in-browser exclude each other");
        }
        match modes.pop() {
            Some(OutputMode::Image(path)) => {
                if self.with_slider {
                    log::warn!("--with-slider has no effect with --output-file");
                }
                Ok(OutputMode::Image(path))
            }
            Some(mode) if self.with_slider => {
                anyhow::bail!("--with-slider cannot be combined with the HTML outputs ({mode:?})")
            }
            Some(mode) => Ok(mode),
            None => Ok(OutputMode::Window),
        }
    }

    fn load_model(&self) -> anyhow::Result<AntennaModel> {
        match &self.filename {
            Some(path) if !self.demo => Runner::load_model(path),
            _ => demo_model(&DemoConfig::default()),
        }
    }
}

fn wait_for_ctrl_c() -> anyhow::Result<()> {
    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;
    runtime.block_on(async {
        signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
        Ok::<(), anyhow::Error>(())
    })
}

fn viewer_command() -> Command {
    let sibling = std::env::current_exe()
        .ok()
        .map(|exe| exe.with_file_name(VIEWER_BINARY))
        .filter(|path| path.exists());
    match sibling {
        Some(path) => Command::new(path),
        None => Command::new(VIEWER_BINARY),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PlotConfig::load(path)?,
        None => PlotConfig::default(),
    };
    args.apply(&mut config);
    let mode = args.output_mode()?;

    let model = args.load_model()?;
    let runner = Runner::new(config.clone());
    let data = runner.prepare(model.clone())?;

    match mode {
        OutputMode::Image(path) => {
            let plots = runner.render(&data, &SvgBackend::new())?;
            let written = write_image(&plots, &path)?;
            println!("wrote {}", written.display());
        }
        OutputMode::Html(prefix) => {
            let plots = runner.render(&data, &PlotlyBackend::new(config.html_export_option))?;
            for path in write_html(&plots, &prefix)? {
                println!("wrote {}", path.display());
            }
        }
        OutputMode::Browser => {
            let plots = runner.render(&data, &PlotlyBackend::new(config.html_export_option))?;
            let bridge = GuiBridge::start(config.port)?;
            bridge.publish(&data.title, plots, Some(model))?;
            println!("open {} (Ctrl+C to stop)", bridge.url());
            wait_for_ctrl_c()?;
        }
        OutputMode::Window => {
            let bridge = GuiBridge::start(config.port)?;
            bridge.publish(&data.title, Vec::new(), Some(model.clone()))?;
            let slider = args.with_slider && model.frequencies().len() > 1;
            let mut command = viewer_command();
            command.arg("--remote").arg(bridge.url());
            if slider {
                command.arg("--slider");
            }
            bridge.publish_status("starting the interactive viewer")?;
            let status = command
                .status()
                .context("starting antenna-viewer; use --output-file or -H without it")?;
            if !status.success() {
                anyhow::bail!("antenna-viewer exited with {status}");
            }
        }
    }

    Ok(())
}
