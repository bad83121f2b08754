use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{
    widgets::{self, WidgetConfig, WidgetHost},
    ClientConfig, ClientEvent, DashboardClient, FormDescriptor, SubmissionDisposition,
    SubmissionResult,
};
use locale::{
    format,
    translate::{self, Lang},
    LocaleConfig,
};
use shared::domain::{FormId, HttpMethod};
use shared::protocol::ActivityEntry;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

mod config;

#[derive(Parser, Debug)]
#[command(name = "desktop", about = "Terminal front end for the DataLink dashboard")]
struct Args {
    /// Overrides the configured server base URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Anti-forgery token issued by the hosting page session.
    #[arg(long)]
    csrf_token: Option<String>,
    /// Display language tag (en, sw).
    #[arg(long)]
    lang: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print the dashboard snapshot.
    Dashboard,
    /// Submit a form in the background and print the outcome.
    Submit {
        #[arg(long, default_value = "cli-form")]
        form: String,
        /// Form action, relative to the server base URL.
        #[arg(long)]
        action: String,
        #[arg(long, default_value = "post")]
        method: String,
        /// Repeatable name=value pairs.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Keep field values after a successful submission.
        #[arg(long)]
        persistent: bool,
    },
    /// Follow notifications and dashboard updates pushed by the server.
    Watch,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

struct LoggingWidgetHost;

impl WidgetHost for LoggingWidgetHost {
    fn mount(&self, config: &WidgetConfig) -> Result<()> {
        info!(widget = config.kind.as_str(), "widget configured");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(token) = args.csrf_token {
        settings.csrf_token = Some(token);
    }
    if let Some(lang) = args.lang {
        settings.language = lang;
    }

    let lang = Lang::from_tag(&settings.language).unwrap_or(Lang::En);
    let locale = LocaleConfig::kenya();

    let mut client_config = ClientConfig::new(settings.server_url.clone());
    if let Some(token) = settings.csrf_token.clone() {
        client_config = client_config.with_csrf_token(token);
    }
    let client = DashboardClient::connect(client_config).await?;

    match args.command {
        Command::Dashboard => run_dashboard(&client, &locale, lang).await,
        Command::Submit {
            form,
            action,
            method,
            fields,
            persistent,
        } => run_submit(&client, &locale, form, action, &method, fields, persistent).await,
        Command::Watch => run_watch(&client).await,
    }
}

async fn run_dashboard(
    client: &Arc<DashboardClient>,
    locale: &LocaleConfig,
    lang: Lang,
) -> Result<()> {
    println!("{}", translate::phrase_or_key(lang, "loading"));
    let snapshot = client.dashboard_snapshot().await?;

    for (name, value) in &snapshot.stats {
        let rendered = if name.contains("revenue") || name.contains("amount") || name.contains("payment")
        {
            format::currency(locale, *value)
        } else {
            format::number(*value)
        };
        println!("{name:<24} {rendered}");
    }
    print_recent("Recent customers", &snapshot.recent_customers, locale);
    print_recent("Recent projects", &snapshot.recent_projects, locale);
    print_recent("Recent payments", &snapshot.recent_payments, locale);

    let mounted = widgets::mount_all(
        &LoggingWidgetHost,
        &widgets::standard_widget_configs(locale),
    );
    info!(mounted, "widget configuration delivered");
    Ok(())
}

fn print_recent(heading: &str, entries: &[ActivityEntry], locale: &LocaleConfig) {
    if entries.is_empty() {
        return;
    }
    println!("\n{heading}:");
    for entry in entries {
        match &entry.detail {
            Some(detail) => println!("  {} ({})", entry.title, format::phone(locale, detail)),
            None => println!("  {}", entry.title),
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_submit(
    client: &Arc<DashboardClient>,
    locale: &LocaleConfig,
    form_id: String,
    action: String,
    method: &str,
    fields: Vec<(String, String)>,
    persistent: bool,
) -> Result<()> {
    let method: HttpMethod = method.parse().map_err(|err: String| anyhow!(err))?;

    let mut form = FormDescriptor::new(form_id.clone(), action, method)
        .background_eligible()
        .with_submit_label("Submit");
    if persistent {
        form = form.persistent();
    }
    for (name, value) in fields {
        if name.contains("phone") && !locale.is_valid_phone(&format::phone(locale, &value)) {
            warn!(field = %name, "value does not look like a valid phone number");
        }
        form = form.with_text_field(name, value);
    }

    let handle = client.register_form(form).await;
    match client.submit(&FormId::new(form_id)).await {
        SubmissionDisposition::Settled(SubmissionResult::Success {
            message,
            redirect_url,
        }) => {
            println!("ok: {message}");
            if let Some(url) = redirect_url {
                println!("server requested a redirect to {url}");
            }
        }
        SubmissionDisposition::Settled(SubmissionResult::ValidationFailure {
            message, ..
        }) => {
            println!("rejected: {message}");
            let guard = handle.lock().await;
            for control in &guard.controls {
                if control.invalid {
                    println!(
                        "  {}: {}",
                        control.name,
                        control.error.as_deref().unwrap_or("invalid")
                    );
                }
            }
        }
        SubmissionDisposition::Settled(SubmissionResult::TransportFailure { cause }) => {
            warn!(cause = %cause, "submission did not reach the server");
            println!("failed: the server could not be reached");
        }
        other => println!("submission not dispatched: {other:?}"),
    }
    Ok(())
}

async fn run_watch(client: &Arc<DashboardClient>) -> Result<()> {
    client.spawn_push_events().await?;
    let mut rx = client.subscribe_events();
    println!("listening for server events; press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Ok(ClientEvent::NotificationPosted { severity, message, .. }) => {
                    println!("[{}] {message}", severity.as_str());
                }
                Ok(ClientEvent::DashboardUpdated { stats }) => {
                    println!("dashboard updated ({} stats)", stats.len());
                }
                Ok(ClientEvent::Error(message)) => {
                    warn!(message = %message, "client error event");
                }
                Ok(_) => {}
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
            },
        }
    }

    client.shutdown().await;
    Ok(())
}
