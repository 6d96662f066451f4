//! CLI binary for the Narou client.
//!
//! Usage: narou search 転生 --genre "ハイファンタジー〔ファンタジー〕" --limit 10

#[cfg(feature = "cli")]
mod cli {
    use clap::{Parser, Subcommand};
    use narou_mcp::error::Result;
    use narou_mcp::ranking::today_jst;
    use narou_mcp::schema::{NovelSearchRequest, RankingRequest};
    use narou_mcp::tools::{self, TOOL_NAMES};
    use narou_mcp::{NarouClient, Record};
    use serde_json::{json, Map, Value};

    #[derive(Parser)]
    #[command(name = "narou", about = "Shosetsuka ni Narou search and ranking client", version)]
    struct Cli {
        /// API base URL (overrides NAROU_API_BASE_URL env var)
        #[arg(long, global = true)]
        base_url: Option<String>,

        /// Output format
        #[arg(long, global = true, default_value = "table")]
        output: OutputFormat,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Clone, Copy, clap::ValueEnum)]
    enum OutputFormat {
        Table,
        Json,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Search novels
        Search {
            /// Search keyword
            word: Option<String>,
            /// Genre label, e.g. "異世界〔恋愛〕"
            #[arg(short, long)]
            genre: Option<String>,
            /// Order label, e.g. "総合ポイントの高い順"
            #[arg(short, long)]
            order: Option<String>,
            /// Maximum results to return
            #[arg(short, long, default_value = "20")]
            limit: u32,
            /// 1-based start position
            #[arg(short, long)]
            start: Option<u32>,
        },
        /// Show a ranking
        Ranking {
            /// Aggregation date (YYYY-MM-DD)
            #[arg(short, long)]
            date: Option<String>,
            /// Period label: 日間, 週間, 月間, 四半期
            #[arg(short = 't', long = "type")]
            ranking_type: Option<String>,
            /// Genre label to filter by
            #[arg(short, long)]
            genre: Option<String>,
            #[arg(short, long, default_value = "10")]
            limit: u32,
            #[arg(long, default_value = "0")]
            offset: u32,
        },
        /// Run one MCP tool and print its content blocks
        Call {
            /// Tool name
            tool: String,
            /// JSON arguments object
            #[arg(default_value = "{}")]
            args: String,
        },
        /// List the MCP tools
        Tools,
        /// Run as MCP server (JSON-RPC over stdio)
        Serve,
    }

    fn make_client(base_url: Option<String>) -> Result<NarouClient> {
        match base_url {
            Some(url) => NarouClient::with_base_url(&url),
            None => NarouClient::from_env(),
        }
    }

    /// Tool-style arguments from optional CLI values.
    fn args(entries: Vec<(&str, Option<Value>)>) -> Value {
        let map: Map<String, Value> = entries
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
            .collect();
        Value::Object(map)
    }

    fn cell(record: &Record, key: &str) -> String {
        match record.get(key) {
            Some(Value::String(s)) => truncate(s, 30),
            Some(Value::Null) | None => "-".to_string(),
            Some(other) => other.to_string(),
        }
    }

    fn truncate(s: &str, max: usize) -> String {
        if s.chars().count() > max {
            format!("{}...", s.chars().take(max - 3).collect::<String>())
        } else {
            s.to_string()
        }
    }

    fn genre_cell(record: &Record) -> String {
        record
            .get("genre")
            .and_then(Value::as_u64)
            .and_then(|c| u32::try_from(c).ok())
            .and_then(|c| narou_mcp::catalog::genres().label_for_code(c))
            .unwrap_or("-")
            .to_string()
    }

    fn print_novels_table(records: &[Record], leading: Option<&str>) {
        use comfy_table::{ContentArrangement, Table};

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        let mut header = vec!["Nコード", "小説名", "作者名", "ジャンル", "評価ポイント"];
        if let Some(leading) = leading {
            header.insert(0, leading);
        }
        table.set_header(header);

        for record in records {
            let mut row = vec![
                cell(record, "ncode"),
                cell(record, "title"),
                cell(record, "writer"),
                genre_cell(record),
                cell(record, "all_point"),
            ];
            if let Some(leading) = leading {
                row.insert(0, cell(record, leading));
            }
            table.add_row(row);
        }

        println!("{table}");
    }

    pub async fn run() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            Commands::Search {
                word,
                genre,
                order,
                limit,
                start,
            } => {
                let client = make_client(cli.base_url)?;
                let req = NovelSearchRequest::from_args(&args(vec![
                    ("word", word.map(Value::from)),
                    ("genre", genre.map(Value::from)),
                    ("order", order.map(Value::from)),
                    ("limit", Some(json!(limit))),
                    ("start", start.map(Value::from)),
                ]))?;
                let results = client.search_novels(&req).await?;

                match cli.output {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&results)?);
                    }
                    OutputFormat::Table => {
                        println!("Found {} novels:", results.allcount);
                        print_novels_table(&results.values, None);
                    }
                }
            }

            Commands::Ranking {
                date,
                ranking_type,
                genre,
                limit,
                offset,
            } => {
                let client = make_client(cli.base_url)?;
                let req = RankingRequest::from_args(&args(vec![
                    ("date", date.map(Value::from)),
                    ("rankingType", ranking_type.map(Value::from)),
                    ("genre", genre.map(Value::from)),
                    ("limit", Some(json!(limit))),
                    ("offset", Some(json!(offset))),
                ]))?;
                let page = tools::ranking_page(&client, &req, today_jst()).await?;

                match cli.output {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&page.rows)?);
                    }
                    OutputFormat::Table => {
                        println!("Ranking {} ({} rows):", page.ranking.rtype(), page.total);
                        print_novels_table(&page.rows, Some("rank"));
                    }
                }
            }

            Commands::Call { tool, args } => {
                let client = make_client(cli.base_url)?;
                let args: Value = serde_json::from_str(&args)?;
                let content = tools::call_tool(&client, &tool, &args).await?;
                match cli.output {
                    OutputFormat::Json => {
                        let blocks: Vec<Value> = content.iter().map(|c| c.to_mcp()).collect();
                        println!("{}", serde_json::to_string_pretty(&blocks)?);
                    }
                    OutputFormat::Table => {
                        for block in &content {
                            println!("{}", block.text());
                        }
                    }
                }
            }

            Commands::Tools => {
                let defs = narou_mcp::mcp::tool_definitions();
                match cli.output {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&defs)?),
                    OutputFormat::Table => {
                        let defs = defs.as_array().into_iter().flatten();
                        for (name, def) in TOOL_NAMES.iter().zip(defs) {
                            println!("{:<22} {}", name, def["title"].as_str().unwrap_or(""));
                        }
                    }
                }
            }

            Commands::Serve => {
                let client = make_client(cli.base_url)?;
                narou_mcp::mcp::run_server(client).await?;
            }
        }

        Ok(())
    }

    pub fn init_tracing() {
        // stdout carries JSON-RPC frames
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("NAROU_LOG")
                    .unwrap_or_else(|_| "narou_mcp=info".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    cli::init_tracing();
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature. Build with: cargo build --features cli");
    std::process::exit(1);
}
