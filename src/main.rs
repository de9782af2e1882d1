use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use folder_curator::infrastructure::{self_test, ClassifierPort};
use folder_curator::models::load_corpus;
use folder_curator::utils::logging::print_final_stats;
use folder_curator::{logger, Config, CurationFlow, OpenAiClassifierPort, SingleItemRequest};

#[derive(Parser)]
#[command(name = "folder-curator", about = "视频文件夹策展与分类")]
struct Cli {
    /// 输出调试日志
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 按自然语言目标策展一个文件夹
    Curate {
        /// 目标，多个词会以空格拼接
        #[arg(required = true, num_args = 1..)]
        objective: Vec<String>,
    },

    /// 为单个视频选择已有分类
    Classify {
        /// 视频标题
        title: String,

        /// 频道名
        #[arg(long)]
        channel: Option<String>,

        /// 时长（秒）
        #[arg(long)]
        duration: Option<u64>,

        /// 缩略图地址
        #[arg(long)]
        thumbnail: Option<String>,
    },

    /// 检查分类能力是否可用
    SelfTest,
}

fn classify_request(
    title: String,
    channel: Option<String>,
    duration: Option<u64>,
    thumbnail: Option<String>,
) -> SingleItemRequest {
    let mut request = SingleItemRequest::new(title);
    request.channel_name = channel;
    request.duration_seconds = duration;
    request.thumbnail = thumbnail;
    request
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logger::init(cli.verbose || config.verbose_logging);

    // 端口只构造一次，注入到流程中
    let port: Arc<dyn ClassifierPort> = Arc::new(OpenAiClassifierPort::new(&config));

    match cli.command {
        Commands::Curate { objective } => {
            let objective = objective.join(" ");
            let corpus = load_corpus(Path::new(&config.corpus_file)).await?;
            let items = corpus.flatten_for_curation();

            let flow = CurationFlow::new(port, &config);
            let result = flow.run(&objective, &items, None).await;

            print_final_stats(&result);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Classify {
            title,
            channel,
            duration,
            thumbnail,
        } => {
            let request = classify_request(title, channel, duration, thumbnail);
            let corpus = load_corpus(Path::new(&config.corpus_file)).await?;

            let flow = CurationFlow::new(port, &config);
            let category = flow.classify(&request, &corpus).await;

            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "title": request.title,
                    "category": category.as_str(),
                }))?
            );
        }
        Commands::SelfTest => {
            let ok = self_test(port.as_ref(), config.classify_timeout_ms).await;
            info!("自检结果: {}", if ok { "✅ 通过" } else { "❌ 失败" });
            println!("{}", serde_json::to_string_pretty(&json!({ "ok": ok }))?);
        }
    }

    Ok(())
}
