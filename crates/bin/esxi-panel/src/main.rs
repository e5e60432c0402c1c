//! # esxi-panel — terminal status panel
//!
//! Shows whether the ESXi host is online and lets the operator request a
//! power-on or power-off from a running `esxi-managerd`.
//!
//! Commands are read line by line from stdin:
//! - `on`: press "Turn On Server"
//! - `off`: press "Turn Off Server"
//! - `quit`: unmount and exit
//!
//! The panel is redrawn every time a request settles.

use clap::Parser;
use esxi_manager_adapter_http_client::HttpPanelBackend;
use esxi_manager_app::panel::StatusPanel;
use esxi_manager_domain::liveness::PanelView;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line flags.
#[derive(Debug, Parser)]
#[command(name = "esxi-panel", version, about = "Terminal panel for esxi-managerd")]
struct Cli {
    /// Base URL of the daemon.
    #[arg(env = "ESXI_MANAGER_URL", default_value = "http://localhost:8080")]
    url: String,
}

/// One line of operator input.
enum Input {
    TurnOn,
    TurnOff,
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "on" => Self::TurnOn,
            "off" => Self::TurnOff,
            "q" | "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

fn draw(view: &PanelView) {
    println!("\n{view}");
    println!("(on / off / quit)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut panel = StatusPanel::new(HttpPanelBackend::new(cli.url));
    draw(&panel.mount());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            view = panel.next_view() => {
                draw(&view);
                continue;
            }
            line = lines.next_line() => match line? {
                Some(line) => Input::parse(&line),
                None => Input::Quit,
            },
        };

        match input {
            Input::TurnOn => panel.turn_on(),
            Input::TurnOff => panel.turn_off(),
            Input::Quit => break,
            Input::Unknown(other) if other.is_empty() => draw(&panel.view()),
            Input::Unknown(other) => println!("unknown command: {other}"),
        }
    }

    Ok(())
}
