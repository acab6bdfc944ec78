use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use size_audit::{cli, config, export, pipeline, reader, report, review, session};
use cli::{Cli, Commands};
use config::Config;
use pipeline::{parse_with_min_delay, AuditPhase, AuditSession};
use report::AuditReport;
use review::ReviewOutcome;
use session::SessionStore;
use size_audit_common::{evaluate_health, ReviewState};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "size_audit=debug,size_audit_common=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 読み込みから解析結果の反映まで
async fn parse_into(session: &mut AuditSession, file: &Path, config: &Config) -> Result<()> {
    let meta = reader::file_meta(file)?;
    let aliases = config.column_aliases()?;
    let generation = session.begin_parse(file.to_path_buf(), meta);

    let pb = spinner("解析中...");
    let result = parse_with_min_delay(
        file.to_path_buf(),
        aliases,
        config.analyzer.clone(),
        config.min_parse_delay(),
    )
    .await;
    pb.finish_and_clear();

    session.finish_parse(generation, result);
    if let AuditPhase::Failed(message) = session.phase() {
        bail!("{}", message);
    }
    Ok(())
}

fn default_output(file: &Path) -> PathBuf {
    file.with_file_name("corrections.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::Analyze { file, json, alias } => {
            println!("🔍 size-audit - 規格解析\n");
            if alias.is_some() {
                config.alias_file = alias;
            }

            let pb = spinner("解析中...");
            let result = parse_with_min_delay(
                file.clone(),
                config.column_aliases()?,
                config.analyzer.clone(),
                Duration::ZERO,
            )
            .await;
            pb.finish_and_clear();
            let groups = result?;

            let meta = reader::file_meta(&file)?;
            let state = ReviewState::new(groups);
            let health = evaluate_health(&state, &config.analyzer);
            let report = AuditReport::build(&meta.name, &state, &health);
            report.print();

            if let Some(path) = json {
                report.write_json(&path)?;
                println!("\n✔ 解析結果を保存: {}", path.display());
            }
        }

        Commands::Review { file, output, xlsx, alias } => {
            println!("📝 size-audit - 規格レビュー\n");
            if alias.is_some() {
                config.alias_file = alias;
            }

            let store = SessionStore::new(config.session_dir());
            let mut session = AuditSession::new(store, config.analyzer.clone());
            parse_into(&mut session, &file, &config).await?;

            let phase = session.phase().clone();
            let handoff = match phase {
                AuditPhase::NoIssues => {
                    println!("✓ 表記の揺れは見つかりませんでした");
                    session.commit()?
                }
                AuditPhase::ResultsReady => {
                    match review::run_review(&mut session, config.auto_advance_delay()).await? {
                        ReviewOutcome::Committed(handoff) => handoff,
                        ReviewOutcome::Suspended => return Ok(()),
                    }
                }
                phase => bail!("解析が完了していません: {:?}", phase),
            };

            let output = output.unwrap_or_else(|| default_output(&file));
            export::write_json(&handoff, &output)
                .with_context(|| format!("修正結果を書き込めません: {}", output.display()))?;
            println!("\n✔ 修正結果を保存: {}", output.display());

            if let Some(path) = xlsx {
                export::write_xlsx(&handoff, &path)?;
                println!("✔ Excelを保存: {}", path.display());
            }

            println!(
                "\n✅ 修正 {}件 / 手作業 {}件",
                handoff.correction_count(),
                handoff.manual_fix.len()
            );
        }

        Commands::Session { info, clear } => {
            let store = SessionStore::new(config.session_dir());
            let path = store.path();

            if info || !clear {
                match store.load() {
                    Some(snapshot) => {
                        println!("セッション情報:");
                        println!("  パス: {}", path.display());
                        println!("  ファイル: {} ({} bytes)", snapshot.file_name, snapshot.file_size);
                        println!("  保存日時: {}", snapshot.saved_at.as_deref().unwrap_or("-"));
                        println!("  承認済み: {}件", snapshot.approved.len());
                        println!("  編集済み: {}件", snapshot.edits.len());
                    }
                    None => println!("保存済みセッションはありません: {}", path.display()),
                }
            }

            if clear {
                match store.clear() {
                    Ok(true) => println!("✔ セッションを削除しました: {}", path.display()),
                    Ok(false) => println!("セッションファイルが存在しません"),
                    Err(e) => println!("セッション削除エラー: {}", e),
                }
            }
        }

        Commands::Config { show, auto_advance_ms, min_parse_delay_ms } => {
            let changed = auto_advance_ms.is_some() || min_parse_delay_ms.is_some();
            if let Some(ms) = auto_advance_ms {
                config.auto_advance_ms = ms;
            }
            if let Some(ms) = min_parse_delay_ms {
                config.min_parse_delay_ms = ms;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  自動送り: {}ms", config.auto_advance_ms);
                println!("  解析最短時間: {}ms", config.min_parse_delay_ms);
                println!("  セッション保存先: {}", config.session_dir().display());
                println!(
                    "  エイリアス: {}",
                    config
                        .alias_file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "組み込みのみ".into())
                );
                println!(
                    "  判定閾値: 支配率 {} / 数値コード率 {} / 最小規格数 {}",
                    config.analyzer.dominance_ratio,
                    config.analyzer.numeric_code_ratio,
                    config.analyzer.min_brand_sizes
                );
            }
        }
    }

    Ok(())
}
