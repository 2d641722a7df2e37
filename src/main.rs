use anyhow::Context;
use clap::Parser;
use mood_corpus::cli::{Cli, Commands};
use mood_corpus::config::Config;
use mood_corpus::credentials::{Credential, CredentialChain};
use mood_corpus::error::CorpusError;
use mood_corpus::processor::RunReport;
use mood_corpus::remote::{BaiduTranslator, ChatClient};
use mood_corpus::sheet::sibling_path;
use mood_corpus::{classify, convert, filter, generate, translate, ui};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let no_pause = cli.no_pause;

    let code = match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e.downcast_ref::<CorpusError>(), Some(CorpusError::Interrupted)) {
                println!("\n⏸ 已中断，进度已保存，重新运行同一命令即可续跑");
            } else {
                error!(error = %e, "运行失败");
                eprintln!("\n❌ 错误: {:#}", e);
            }
            ExitCode::FAILURE
        }
    };

    if !no_pause {
        ui::pause_for_enter();
    }
    code
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("日志初始化失败");
    }
}

/// Ctrl-C；无法注册时永不完成
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn print_report(report: &RunReport, output: &std::path::Path) {
    if report.halted {
        println!("\n⚠ {}", report);
        println!("  已保存进度: {}", output.display());
    } else {
        println!("\n✔ {}", report);
        println!("✔ 结果已保存: {}", output.display());
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let config = Config::load().context("读取配置失败")?;
    let interactive = std::io::stdin().is_terminal();

    match command {
        Commands::Convert {
            input_dir,
            output_dir,
            recursive,
            overwrite,
        } => {
            println!("📂 mood-corpus - CSV转Excel\n");
            let output_dir = output_dir.unwrap_or_else(|| input_dir.join("EXCEL转换结果"));
            let options = convert::ConvertOptions {
                input_dir,
                output_dir,
                recursive,
                overwrite,
            };

            println!("[1/2] 查找CSV文件...");
            let summary = convert::convert_folder(&options)?;
            if summary.total == 0 {
                println!("未找到CSV文件: {}", options.input_dir.display());
                return Ok(());
            }

            println!("[2/2] 转换完成");
            println!("✔ {}", summary);
            println!("✔ 输出目录: {}", options.output_dir.display());
        }

        Commands::Filter {
            input,
            output,
            columns,
            keywords,
            regex,
        } => {
            println!("🔍 mood-corpus - 关键词筛选\n");
            let options = filter::FilterOptions {
                input,
                output,
                columns,
                keywords,
                regex,
            };
            let (output, total, kept) = filter::run_filter(&options)
                .with_context(|| format!("筛选失败: {}", options.input.display()))?;
            println!("✔ 共{}行，保留 {} 行", total, kept);
            println!("✔ 结果已保存: {}", output.display());
        }

        Commands::Classify {
            input,
            output,
            question_column,
            answer_column,
            process,
        } => {
            println!("🧠 mood-corpus - 青少年抑郁分类\n");
            let api_key = CredentialChain::standard(&config, interactive)
                .require(Credential::DeepseekApiKey)?;
            let client = ChatClient::new(api_key, &config.chat)?;

            let output = output.unwrap_or_else(|| sibling_path(&input, "_classified"));
            let backup = process
                .backup
                .clone()
                .unwrap_or_else(|| sibling_path(&output, "_backup"));
            let options = classify::ClassifyOptions {
                input,
                output: output.clone(),
                backup: Some(backup),
                question_column,
                answer_column,
                processor: process.apply(classify::default_processor_config()),
            };

            println!("开始处理，请勿关闭程序（Ctrl-C 可中断并保存进度）...");
            let report = classify::run_classify(client, options, shutdown_signal()).await?;
            print_report(&report, &output);
            println!("建议人工校验前10条数据的分类结果");
        }

        Commands::Generate {
            count,
            output,
            process,
        } => {
            println!("📝 mood-corpus - 案例生成\n");
            generate::validate_count(count)?;
            let api_key = CredentialChain::standard(&config, interactive)
                .require(Credential::DeepseekApiKey)?;
            let client = ChatClient::new(api_key, &config.chat)?;

            let output = generate::normalize_output_path(
                &output.unwrap_or_else(generate::default_output_path),
            );
            let options = generate::GenerateOptions {
                count,
                output: output.clone(),
                backup: process.backup.clone(),
                processor: process.apply(generate::default_processor_config()),
            };

            println!("生成 {} 条案例...", count);
            let report = generate::run_generate(client, options, shutdown_signal()).await?;
            print_report(&report, &output);
        }

        Commands::Translate {
            input,
            output,
            column,
            output_column,
            from,
            to,
            process,
        } => {
            println!("🌐 mood-corpus - 批量翻译\n");
            let credentials = CredentialChain::standard(&config, interactive);
            let app_id = credentials.require(Credential::BaiduAppId)?;
            let secret_key = credentials.require(Credential::BaiduSecretKey)?;

            let mut settings = config.translate.clone();
            if let Some(from) = from {
                settings.from = from;
            }
            if let Some(to) = to {
                settings.to = to;
            }
            let translator = BaiduTranslator::new(app_id, secret_key, &settings)?;

            let options = translate::TranslateOptions {
                input,
                output,
                backup: process.backup.clone(),
                column,
                output_column,
                processor: process.apply(translate::default_processor_config()),
            };
            let output = options.output_path();
            println!("进度备份: {}", options.backup_path().display());

            let report = translate::run_translate(translator, options, shutdown_signal()).await?;
            print_report(&report, &output);
        }

        Commands::Config {
            set_deepseek_key,
            set_baidu_app_id,
            set_baidu_secret,
            show,
        } => {
            let mut config = config;
            let changed = set_deepseek_key.is_some()
                || set_baidu_app_id.is_some()
                || set_baidu_secret.is_some();

            if let Some(key) = set_deepseek_key {
                config.deepseek_api_key = Some(key);
            }
            if let Some(app_id) = set_baidu_app_id {
                config.baidu_app_id = Some(app_id);
            }
            if let Some(secret) = set_baidu_secret {
                config.baidu_secret_key = Some(secret);
            }
            if changed {
                config.save()?;
                println!("✔ 已保存配置: {}", Config::config_path()?.display());
            }

            if show || !changed {
                let state = |value: &Option<String>| if value.is_some() { "已设置" } else { "未设置" };
                println!("配置:");
                println!("  DeepSeek API密钥: {}", state(&config.deepseek_api_key));
                println!("  百度翻译 APP ID: {}", state(&config.baidu_app_id));
                println!("  百度翻译 SECRET KEY: {}", state(&config.baidu_secret_key));
                println!("  模型: {} ({})", config.chat.model, config.chat.base_url);
                println!("  翻译方向: {} → {}", config.translate.from, config.translate.to);
            }
        }
    }

    Ok(())
}
