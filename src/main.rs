use clap::{Parser, Subcommand};
use weather_mcp::Result;
use weather_mcp::commands::{serve_mcp, show_current, show_forecast};
use weather_mcp::config::{run_interactive_config, show_config};
use weather_mcp::weather::{DEFAULT_FORECAST_DAYS, MAX_FORECAST_DAYS};

#[derive(Parser)]
#[command(name = "weather-mcp")]
#[command(about = "OpenWeatherMap current weather and forecasts as an MCP server")]
#[command(version)]
struct Cli {
    /// OpenWeatherMap API key, overriding the environment and config file
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the OpenWeatherMap API key and request defaults
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Start MCP server on stdio
    Serve,
    /// Print the current weather for a city
    Current {
        /// City name, e.g. "Tokyo"
        city: String,
    },
    /// Print a multi-day forecast for a city
    Forecast {
        /// City name, e.g. "Tokyo"
        city: String,
        /// Number of days to forecast
        #[arg(
            long,
            default_value_t = DEFAULT_FORECAST_DAYS,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_FORECAST_DAYS))
        )]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Serve => {
            serve_mcp(cli.api_key).await?;
        }
        Commands::Current { city } => {
            show_current(&city, cli.api_key).await?;
        }
        Commands::Forecast { city, days } => {
            show_forecast(&city, days, cli.api_key).await?;
        }
    }

    Ok(())
}
