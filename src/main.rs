use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use quizmark::utils::logging;
use quizmark::{App, Config, OutputMode};

/// 把题目标记文本转换为 LMS 导入文件和 LaTeX 文档
#[derive(Debug, Parser)]
#[command(name = "quizmark", version)]
struct Cli {
    /// 输出格式
    #[arg(long, value_enum, default_value_t = OutputMode::Both)]
    mode: OutputMode,

    /// 打乱选择题与选词填空的答案顺序
    #[arg(long)]
    randomize: bool,

    /// 随机种子（用于复现打乱结果）
    #[arg(long)]
    seed: Option<u64>,

    /// 无法识别的行直接报错
    #[arg(long)]
    strict: bool,

    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 输出文件（只能在恰好一个输入文件时使用）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,

    /// 输入文件
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl Cli {
    /// 默认值 → 配置文件 → 环境变量 → 命令行参数
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("无法加载配置文件: {}", path.display()))?
                .with_env()?,
            None => Config::from_env()?,
        };

        config.randomize |= self.randomize;
        config.strict_lines |= self.strict;
        config.verbose_logging |= self.verbose;
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let config = cli.load_config()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::initialize(config, cli.mode, cli.inputs, cli.output)?;
    let stats = app.run().await?;

    Ok(stats.all_succeeded())
}
