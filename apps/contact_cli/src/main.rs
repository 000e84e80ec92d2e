use std::{collections::HashMap, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use client_core::{ContactCollector, ContactFormView, HttpContactClient, Notice};
use tracing::debug;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    /// Full endpoint URL; overrides `--server-url`.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    message: Option<String>,
}

struct TerminalForm {
    fields: HashMap<&'static str, String>,
    label: String,
}

impl TerminalForm {
    fn from_args(args: &Args) -> Self {
        let fields = [
            ("firstName", &args.first_name),
            ("lastName", &args.last_name),
            ("email", &args.email),
            ("company", &args.company),
            ("message", &args.message),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|value| (name, value)))
        .collect();

        Self {
            fields,
            label: "Send Message".into(),
        }
    }
}

impl ContactFormView for TerminalForm {
    fn field_value(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    fn submit_label(&self) -> String {
        self.label.clone()
    }

    fn set_submit_label(&mut self, label: &str) {
        self.label = label.to_string();
        debug!(label, "submit label changed");
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        debug!(enabled, "submit control toggled");
    }

    fn reset_fields(&mut self) {
        self.fields.clear();
    }

    fn show_notice(&mut self, notice: &Notice) {
        match notice {
            Notice::Sent(_) => println!("{}", notice.text()),
            _ => eprintln!("{}", notice.text()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let args = Args::parse();

    let client = match &args.endpoint {
        Some(endpoint) => HttpContactClient::new(endpoint)?,
        None => HttpContactClient::for_server(&args.server_url)?,
    };
    debug!(endpoint = %client.endpoint(), "submitting contact form");

    let mut form = TerminalForm::from_args(&args);
    let notice = ContactCollector::new(client).submit(&mut form).await;

    Ok(if notice.is_sent() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
