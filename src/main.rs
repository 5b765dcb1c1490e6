use anyhow::Context;
use clap::{Parser, Subcommand};
use state_density_map::{config, data, fetch, filter, legend, normalize, preview, processing, render};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration; built-in defaults apply when omitted
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the census archive, replacing any existing copy
    Fetch,
    /// Print the first rows of the attribute table as CSV
    Head {
        #[arg(short, long, default_value = "5")]
        rows: usize,
    },
    /// Render the population density map
    Render {
        /// Draw all regions in one color, without density shading or legend
        #[arg(long)]
        raw: bool,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print density, normalized density and class per region as CSV
    Summary,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let app_config = config::AppConfig::load(cli.config.as_deref())?;
    let source = &app_config.source;
    let timeout = Duration::from_secs(source.timeout_secs);

    match &cli.command {
        Commands::Fetch => {
            fetch::fetch_archive(&source.url, &source.archive, timeout)?;
        }
        Commands::Head { rows } => {
            fetch::ensure_archive(&source.url, &source.archive, timeout)?;
            let table = data::load_regions(&source.archive, &app_config.schema)?;
            preview::write_head(&table, *rows, std::io::stdout().lock())?;
        }
        Commands::Render { raw, output } => {
            // 1. Fetch & load
            fetch::ensure_archive(&source.url, &source.archive, timeout)?;
            let table = data::load_regions(&source.archive, &app_config.schema)?;

            // 2. Drop regions that distort the layout
            let table = filter::apply(&table, &app_config.filter)?;

            // 3. Render
            if *raw {
                let path = output.clone().unwrap_or_else(|| app_config.render.raw_output.clone());
                render::render_raw(&table, &app_config.render, &path)?;
            } else {
                let (table, _) = processing::attach_density(&table)?;
                let path = output.clone().unwrap_or_else(|| app_config.render.output.clone());
                let scale = render::render_choropleth(&table, &app_config.render, &path)
                    .with_context(|| format!("Failed to render {:?}", path))?;
                info!("Class breaks: {:?}", scale.classification.breaks);
            }
            info!("Render complete!");
        }
        Commands::Summary => {
            fetch::ensure_archive(&source.url, &source.archive, timeout)?;
            let table = data::load_regions(&source.archive, &app_config.schema)?;
            let table = filter::apply(&table, &app_config.filter)?;
            let (table, densities) = processing::attach_density(&table)?;

            let normalized = normalize::normalize(&densities)?;
            let scale = legend::ColorScale::build(&densities, &app_config.render)?;
            info!("Legend range {}..{}", scale.vmin, scale.vmax);

            preview::write_summary(
                &table,
                &densities,
                &normalized,
                &scale.classification.classes,
                std::io::stdout().lock(),
            )?;
        }
    }

    Ok(())
}
