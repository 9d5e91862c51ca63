//! Life Canvas CLI
//!
//! Command-line client for a running Life Canvas server:
//! - Show the dashboard summary and timeline
//! - Write journal entries and log diet deviations
//! - Adjust dimension scores, theme and lock state
//! - Export, import, reset and back up data

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use reqwest::{Method, Response};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "life-canvas-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal life tracking: dimensions, journals and diet")]
#[command(long_about = "Life Canvas tracks eight life dimensions, a mood journal and a diet baseline.\nThis client talks to a running life-canvas server.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://127.0.0.1:8093", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status
    Status,

    /// Show the dashboard summary
    Summary,

    /// Set a dimension score (0-100)
    Score {
        /// Dimension (fuel, physical, intellectual, output, recovery, asset, connection, environment)
        dimension: String,
        /// New score; rounded and clamped
        score: f64,
    },

    /// Journal entries
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Diet baseline and deviations
    #[command(subcommand)]
    Fuel(FuelCommand),

    /// Personal values
    #[command(subcommand)]
    Value(ValueCommand),

    /// Show the timeline
    Timeline {
        /// all, journal or fuel
        #[arg(long, default_value = "all")]
        filter: String,
        /// Search text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Set the theme (light, dark, auto)
    Theme { theme: String },

    /// Lock the app
    Lock,

    /// Unlock with a 4-digit PIN
    Unlock { pin: String },

    /// Export all data
    Export {
        /// Output file (default: life-canvas-backup-<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },

    /// Import data from an exported file
    Import { path: PathBuf },

    /// Clear all data
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },

    /// Backup archives
    #[command(subcommand)]
    Backup(BackupCommand),

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum JournalCommand {
    /// Write an entry
    Add {
        content: String,
        /// great, good, neutral, bad, terrible
        #[arg(short, long, default_value = "good")]
        mood: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short = 'T', long)]
        tags: Vec<String>,
        /// Linked dimensions
        #[arg(short, long)]
        link: Vec<String>,
    },
    /// List entries
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        mood: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Delete an entry
    Rm { id: String },
    /// Mood distribution
    Moods,
}

#[derive(Subcommand)]
pub enum FuelCommand {
    /// Log a deviation
    Log {
        description: String,
        #[arg(short, long)]
        calories: Option<f64>,
        /// excess, deficit or other
        #[arg(short = 't', long = "type", default_value = "other")]
        kind: String,
    },
    /// Show baseline and deviations
    List,
    /// Delete a deviation
    Rm { id: String },
    /// Replace the baseline text
    Baseline { text: String },
}

#[derive(Subcommand)]
pub enum ValueCommand {
    Add { value: String },
    Rm { value: String },
}

#[derive(Subcommand)]
pub enum BackupCommand {
    /// Archive the current state
    Create,
    /// List archives
    List,
    /// Restore an archive by name
    Restore { name: String },
}

/// Thin JSON client for the server API
struct Api {
    client: reqwest::Client,
    base: String,
}

impl Api {
    fn new(base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    async fn raw(&self, method: Method, path: &str, body: Option<RequestBody>) -> anyhow::Result<Response> {
        let url = format!("{}{}", self.base, path);
        let mut request = self.client.request(method, &url);
        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Text(text)) => request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(text),
            None => request,
        };

        let response = request.send().await.with_context(|| {
            format!(
                "Cannot connect to Life Canvas at {}. Is the server running? (cargo run --bin life-canvas)",
                self.base
            )
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("request failed")
                .to_string();
            bail!("{} ({})", message, status);
        }

        Ok(response)
    }

    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let response = self.raw(method, path, body.map(RequestBody::Json)).await?;
        let value: Value = response.json().await?;
        warn_if_unsaved(&value);
        Ok(value)
    }

    async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.call(Method::GET, path, None).await
    }
}

enum RequestBody {
    Json(Value),
    Text(String),
}

/// Mutations succeed in memory even when the server cannot write to disk
fn warn_if_unsaved(value: &Value) {
    if value["save"]["status"] == "failed" {
        eprintln!(
            "warning: change applied but not saved: {}",
            value["save"]["reason"].as_str().unwrap_or("unknown error")
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = Api::new(&cli.api_url);
    let as_json = cli.format == "json";

    match cli.command {
        Commands::Status => {
            let health = api.get("/health").await?;
            if as_json {
                return print_json(&health);
            }
            println!("Life Canvas v{}", health["version"].as_str().unwrap_or("?"));
            println!();
            println!("Status:  {}", health["status"].as_str().unwrap_or("unknown"));
            println!("Storage: {}", health["storage"].as_str().unwrap_or("unknown"));
            println!(
                "Startup: {}",
                health["load_status"]["status"].as_str().unwrap_or("unknown")
            );
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime:  {}", format_duration(uptime));
            }
        }

        Commands::Summary => {
            let summary = api.get("/api/v1/summary").await?;
            if as_json {
                return print_json(&summary);
            }
            print_summary(&summary);
        }

        Commands::Score { dimension, score } => {
            let result = api
                .call(
                    Method::PUT,
                    &format!("/api/v1/dimensions/{}", dimension.to_lowercase()),
                    Some(json!({ "score": score })),
                )
                .await?;
            let key = dimension.to_uppercase();
            println!(
                "{} is now {}",
                key,
                result["data"]["dimensions"][&key].as_u64().unwrap_or(0)
            );
        }

        Commands::Journal(command) => run_journal(&api, command, as_json).await?,
        Commands::Fuel(command) => run_fuel(&api, command, as_json).await?,

        Commands::Value(ValueCommand::Add { value }) => {
            let result = api
                .call(Method::POST, "/api/v1/profile/values", Some(json!({ "value": value })))
                .await?;
            print_values(&result["data"]);
        }
        Commands::Value(ValueCommand::Rm { value }) => {
            let path = format!("/api/v1/profile/values/{}", encode_segment(&value));
            let result = api.call(Method::DELETE, &path, None).await?;
            print_values(&result["data"]);
        }

        Commands::Timeline { filter, search } => {
            let mut path = format!("/api/v1/timeline?filter={}", filter.to_lowercase());
            if let Some(search) = search {
                path.push_str(&format!("&search={}", encode_segment(&search)));
            }
            let groups = api.get(&path).await?;
            if as_json {
                return print_json(&groups);
            }
            print_timeline(&groups);
        }

        Commands::Theme { theme } => {
            let result = api
                .call(Method::PUT, "/api/v1/theme", Some(json!({ "theme": theme.to_lowercase() })))
                .await?;
            println!("Theme: {}", result["data"]["theme"].as_str().unwrap_or("?"));
        }

        Commands::Lock => {
            api.call(Method::POST, "/api/v1/lock", None).await?;
            println!("Locked");
        }

        Commands::Unlock { pin } => {
            api.call(Method::POST, "/api/v1/unlock", Some(json!({ "pin": pin })))
                .await?;
            println!("Unlocked");
        }

        Commands::Export { output, stdout } => {
            let response = api.raw(Method::GET, "/api/v1/export", None).await?;
            let filename = response
                .headers()
                .get(reqwest::header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .and_then(attachment_filename)
                .unwrap_or_else(|| "life-canvas-backup.json".to_string());
            let data = response.text().await?;

            if stdout {
                print!("{}", data);
            } else {
                let path = output.unwrap_or_else(|| PathBuf::from(filename));
                std::fs::write(&path, &data)?;
                println!("Exported to {:?}", path);
            }
        }

        Commands::Import { path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let response = api
                .raw(Method::POST, "/api/v1/import", Some(RequestBody::Text(text)))
                .await?;
            let result: Value = response.json().await?;
            warn_if_unsaved(&result);
            println!(
                "Imported {:?}: {} journal entries, {} deviations",
                path,
                result["data"]["journals"].as_array().map(Vec::len).unwrap_or(0),
                result["data"]["fuelSystem"]["deviations"]
                    .as_array()
                    .map(Vec::len)
                    .unwrap_or(0)
            );
        }

        Commands::Reset { yes } => {
            if !yes {
                bail!("Reset deletes all data. Re-run with --yes to confirm.");
            }
            api.call(Method::POST, "/api/v1/reset", None).await?;
            println!("All data cleared");
        }

        Commands::Backup(BackupCommand::Create) => {
            let result = api.call(Method::POST, "/api/v1/backups", None).await?;
            println!(
                "Created {}",
                result["backup"]["name"].as_str().unwrap_or("backup")
            );
            if let Some(pruned) = result["pruned"].as_u64().filter(|n| *n > 0) {
                println!("Pruned {} expired backups", pruned);
            }
        }
        Commands::Backup(BackupCommand::List) => {
            let result = api.get("/api/v1/backups").await?;
            if as_json {
                return print_json(&result);
            }
            print_backups(&result);
        }
        Commands::Backup(BackupCommand::Restore { name }) => {
            api.call(
                Method::POST,
                &format!("/api/v1/backups/{}/restore", encode_segment(&name)),
                None,
            )
            .await?;
            println!("Restored {}", name);
        }

        Commands::Config { output } => {
            let config = life_canvas::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn run_journal(api: &Api, command: JournalCommand, as_json: bool) -> anyhow::Result<()> {
    match command {
        JournalCommand::Add {
            content,
            mood,
            title,
            tags,
            link,
        } => {
            let linked: Vec<String> = link.iter().map(|d| d.to_uppercase()).collect();
            let body = json!({
                "content": content,
                "mood": mood.to_lowercase(),
                "title": title,
                "tags": tags,
                "linkedDimensions": linked,
            });
            let result = api.call(Method::POST, "/api/v1/journals", Some(body)).await?;
            println!("Saved entry {}", result["data"]["id"].as_str().unwrap_or("?"));
        }

        JournalCommand::List { search, mood, page } => {
            let mut path = format!("/api/v1/journals?page={}", page);
            if let Some(search) = search {
                path.push_str(&format!("&search={}", encode_segment(&search)));
            }
            if let Some(mood) = mood {
                path.push_str(&format!("&mood={}", mood.to_lowercase()));
            }

            let result = api.get(&path).await?;
            if as_json {
                return print_json(&result);
            }

            let items = result["items"].as_array().cloned().unwrap_or_default();
            if items.is_empty() {
                println!("No journal entries.");
                println!();
                println!("Write your first one with:");
                println!("  life-canvas-cli journal add \"Today was...\" --mood good");
                return Ok(());
            }

            println!("{:<17} {:<9} {}", "Date", "Mood", "Content");
            println!("{}", "-".repeat(70));
            for item in &items {
                println!(
                    "{:<17} {:<9} {}",
                    format_timestamp(item["timestamp"].as_i64().unwrap_or(0)),
                    item["mood"].as_str().unwrap_or("-"),
                    truncate(item["content"].as_str().unwrap_or(""), 44)
                );
            }
            println!();
            println!(
                "Page {} of {} ({} entries)",
                result["page"].as_u64().unwrap_or(1),
                result["total_pages"].as_u64().unwrap_or(1).max(1),
                result["total"].as_u64().unwrap_or(0)
            );
        }

        JournalCommand::Rm { id } => {
            api.call(
                Method::DELETE,
                &format!("/api/v1/journals/{}", encode_segment(&id)),
                None,
            )
            .await?;
            println!("Deleted {}", id);
        }

        JournalCommand::Moods => {
            let result = api.get("/api/v1/journals/moods").await?;
            if as_json {
                return print_json(&result);
            }
            for share in result["moods"].as_array().cloned().unwrap_or_default() {
                println!(
                    "{:<9} {:>4} {:>4}%",
                    share["mood"].as_str().unwrap_or("-"),
                    share["count"].as_u64().unwrap_or(0),
                    share["percentage"].as_u64().unwrap_or(0)
                );
            }
        }
    }

    Ok(())
}

async fn run_fuel(api: &Api, command: FuelCommand, as_json: bool) -> anyhow::Result<()> {
    match command {
        FuelCommand::Log {
            description,
            calories,
            kind,
        } => {
            let body = json!({
                "description": description,
                "calories": calories,
                "type": kind.to_lowercase(),
            });
            let result = api
                .call(Method::POST, "/api/v1/fuel/deviations", Some(body))
                .await?;
            println!("Logged deviation {}", result["data"]["id"].as_str().unwrap_or("?"));
        }

        FuelCommand::List => {
            let fuel = api.get("/api/v1/fuel").await?;
            if as_json {
                return print_json(&fuel);
            }

            let baseline = fuel["baseline"].as_str().unwrap_or("");
            println!(
                "Baseline:    {}",
                if baseline.is_empty() { "(not set)" } else { baseline }
            );
            println!("Consistency: {}%", fuel["consistency"].as_u64().unwrap_or(0));
            println!();
            for deviation in fuel["deviations"].as_array().cloned().unwrap_or_default() {
                let calories = deviation["calories"]
                    .as_f64()
                    .map(|c| format!("{:.0} kcal", c))
                    .unwrap_or_default();
                println!(
                    "{:<17} {:<8} {:<10} {}",
                    format_timestamp(deviation["timestamp"].as_i64().unwrap_or(0)),
                    deviation["type"].as_str().unwrap_or("-"),
                    calories,
                    deviation["description"].as_str().unwrap_or("")
                );
            }
        }

        FuelCommand::Rm { id } => {
            api.call(
                Method::DELETE,
                &format!("/api/v1/fuel/deviations/{}", encode_segment(&id)),
                None,
            )
            .await?;
            println!("Deleted {}", id);
        }

        FuelCommand::Baseline { text } => {
            api.call(Method::PUT, "/api/v1/fuel/baseline", Some(json!({ "baseline": text })))
                .await?;
            println!("Baseline updated");
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(summary: &Value) {
    match summary["life_progress"].as_f64() {
        Some(progress) => println!("Life progress:    {:.1}%", progress),
        None => println!("Life progress:    (set a valid birthday)"),
    }
    println!("Balance score:    {}", summary["balance_score"].as_u64().unwrap_or(0));
    println!("Fuel consistency: {}%", summary["fuel_consistency"].as_u64().unwrap_or(0));
    println!(
        "Journal entries:  {}",
        summary["journal_count"].as_u64().unwrap_or(0)
    );
    println!();

    for dim in summary["dimensions"].as_array().cloned().unwrap_or_default() {
        let score = dim["score"].as_u64().unwrap_or(0) as usize;
        println!(
            "{:<13} {:>3} {}",
            dim["label"].as_str().unwrap_or("-"),
            score,
            "#".repeat(score / 5)
        );
    }
}

fn print_timeline(groups: &Value) {
    let groups = groups.as_array().cloned().unwrap_or_default();
    if groups.is_empty() {
        println!("Nothing on the timeline yet");
        return;
    }

    for group in groups {
        println!("{}", group["label"].as_str().unwrap_or("-"));
        for event in group["items"].as_array().cloned().unwrap_or_default() {
            let time = chrono::DateTime::from_timestamp_millis(event["timestamp"].as_i64().unwrap_or(0))
                .map(|dt| dt.with_timezone(&chrono::Local).format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            println!(
                "  {} [{}] {}",
                time,
                event["type"].as_str().unwrap_or("-"),
                truncate(event["content"].as_str().unwrap_or(""), 60)
            );
        }
        println!();
    }
}

fn print_values(values: &Value) {
    let values: Vec<&str> = values
        .as_array()
        .map(|v| v.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if values.is_empty() {
        println!("No values yet");
    } else {
        println!("Values: {}", values.join(", "));
    }
}

fn print_backups(result: &Value) {
    let backups = result["backups"].as_array().cloned().unwrap_or_default();
    if backups.is_empty() {
        println!("No backups yet. Create one with: life-canvas-cli backup create");
        return;
    }

    println!("{:<32} {:<22} {}", "Name", "Created", "Size");
    println!("{}", "-".repeat(66));
    for backup in backups {
        println!(
            "{:<32} {:<22} {} B",
            backup["name"].as_str().unwrap_or("-"),
            backup["created_at"].as_str().unwrap_or("-"),
            backup["size_bytes"].as_u64().unwrap_or(0)
        );
    }
    println!();
    println!(
        "Archives older than {} days are pruned",
        result["retention_days"].as_u64().unwrap_or(7)
    );
}

fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Percent-encode a path or query component
fn encode_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// File name from a `Content-Disposition: attachment; filename="..."` header
fn attachment_filename(header: &str) -> Option<String> {
    let start = header.find("filename=\"")? + "filename=\"".len();
    let end = header[start..].find('"')? + start;
    Some(header[start..end].to_string())
}
