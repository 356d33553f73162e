use std::io::Write;

use anyhow::Context;
use clap::Parser;
use metric_plugin::Runner;
use plugin_raritan::{Config, RaritanPlugin};
use raritan_agent::init_logger;

const BINARY: &str = env!("CARGO_BIN_NAME");

/// Runs the plugin once.
///
/// The steps are:
/// - parse the CLI
/// - load the config file, if any, and apply the CLI settings on top of it
/// - print the graph definitions or poll the PDU and print the values
///
/// Any error is logged and ends the process with a non-zero status: the agent
/// will simply try again at the next interval.
fn main() {
    init_logger();

    let args = cli::Cli::parse();
    log::debug!("Starting {BINARY} v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args) {
        log::error!("{e:?}");
        std::process::exit(1);
    }
}

fn run(args: cli::Cli) -> anyhow::Result<()> {
    let config = load_config(&args).context("could not load config")?;
    if let Some(tempfile) = &args.tempfile {
        log::debug!("Temp file {tempfile} is not used: the plugin has no diff metric.");
    }
    if config.allow_insecure {
        log::debug!("The TLS certificate of {} will not be verified.", config.endpoint);
    }

    let runner = Runner::new(RaritanPlugin::new(config));
    let mut stdout = std::io::stdout().lock();
    runner.run(&mut stdout)?;
    stdout.flush().context("could not write to stdout")?;
    Ok(())
}

/// Reads the config file (or takes the default config) and applies the CLI arguments.
fn load_config(args: &cli::Cli) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
            toml::from_str(&content).with_context(|| format!("invalid config file {path}"))?
        }
        None => Config::default(),
    };
    apply_args(&mut config, args);
    Ok(config)
}

fn apply_args(config: &mut Config, args: &cli::Cli) {
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(username) = &args.username {
        config.username = username.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }
    if let Some(prefix) = &args.metric_key_prefix {
        config.metric_key_prefix = prefix.clone();
    }
    if args.verify_tls {
        config.allow_insecure = false;
    }
}

/// Plugin command-line interface (CLI).
///
/// Every option is optional: unset options keep the value of the config file,
/// or the default value if there is no config file.
mod cli {
    use clap::Parser;

    // NOTE: the doc comment attached to `Cli` is used by clap as the description of
    // the application. It is displayed at the start of the help message.

    /// Reports the apparent and active power of a Raritan PDU to the metrics agent.
    #[derive(Parser)]
    #[command(
        version,
        after_help = "Long options take two dashes (--endpoint HOST), the single-dash form -endpoint is rejected."
    )]
    pub struct Cli {
        /// Host of the PDU [default: localhost]
        #[arg(long, env = "RARITAN_ENDPOINT")]
        pub endpoint: Option<String>,

        /// Username of the PDU account [default: admin]
        #[arg(long, env = "RARITAN_USERNAME")]
        pub username: Option<String>,

        /// Password of the PDU account [default: raritan]
        #[arg(long, env = "RARITAN_PASSWORD", hide_env_values = true)]
        pub password: Option<String>,

        /// Metric key prefix [default: raritan]
        #[arg(long, env = "RARITAN_METRIC_KEY_PREFIX")]
        pub metric_key_prefix: Option<String>,

        /// Temp file name.
        ///
        /// Accepted for compatibility with the agent, which passes it to every plugin.
        #[arg(long)]
        pub tempfile: Option<String>,

        /// Verify the TLS certificate of the PDU.
        ///
        /// By default the certificate is not verified, because PDUs use self-signed certificates.
        #[arg(long, default_value_t = false)]
        pub verify_tls: bool,

        /// Path to a TOML config file.
        #[arg(long, env = "RARITAN_CONFIG")]
        pub config: Option<String>,
    }
}
