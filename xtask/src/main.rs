use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "Wavedrop 开发任务自动化")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 构建所有组件 (release)
    Build,
    /// 运行文件服务 (开发模式)
    Dev {
        /// 监听端口
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// 运行 TUI 动画查看器 (开发模式)
    Tui {
        /// 日志级别 (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
        /// 日志输出文件 (默认 /tmp/wavedrop.log)
        #[arg(short = 'o', long)]
        log_file: Option<String>,
        /// 动画模式 (wave, network)
        #[arg(short, long)]
        mode: Option<String>,
    },
    /// 收集发布文件到 dist/
    Dist,
    /// 运行测试
    Test,
    /// 清理构建产物
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    // 确保在项目根目录执行
    let project_root = match std::env::var("CARGO_MANIFEST_DIR")
        .ok()
        .map(PathBuf::from)
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    sh.change_dir(&project_root);

    match cli.command {
        Commands::Build => build(&sh)?,
        Commands::Dev { port } => dev(&sh, port)?,
        Commands::Tui {
            log_level,
            log_file,
            mode,
        } => tui(&sh, &log_level, log_file, mode)?,
        Commands::Dist => dist(&sh)?,
        Commands::Test => test(&sh)?,
        Commands::Clean => clean(&sh)?,
    }

    Ok(())
}

fn build(sh: &Shell) -> Result<()> {
    println!("🔨 构建所有组件...");
    cmd!(
        sh,
        "cargo build --release -p wavedrop-server -p wavedrop-cli -p wavedrop-tui"
    )
    .run()?;
    println!("✅ 构建完成");
    Ok(())
}

fn dev(sh: &Shell, port: u16) -> Result<()> {
    println!("🚀 启动开发模式文件服务...");
    println!("   http://localhost:{}", port);
    let port = port.to_string();
    cmd!(sh, "cargo run -p wavedrop-server -- --port {port}")
        .env("RUST_LOG", "debug,wavedrop_core=debug,tower_http=debug")
        .run()?;
    Ok(())
}

fn tui(
    sh: &Shell,
    log_level: &str,
    log_file: Option<String>,
    mode: Option<String>,
) -> Result<()> {
    let log_file = log_file.unwrap_or_else(|| "/tmp/wavedrop.log".to_string());
    println!("🖥️  启动动画查看器，日志写入 {} ({})", log_file, log_level);

    let rust_log = format!("{level},wavedrop_core={level}", level = log_level);
    let mode_arg = mode.map(|m| format!(" -- --mode '{}'", m)).unwrap_or_default();

    // stderr 重定向需要经过 shell
    let command = format!(
        "RUST_LOG='{}' cargo run -p wavedrop-tui{} 2>> '{}'",
        rust_log, mode_arg, log_file
    );
    cmd!(sh, "bash -c {command}").run()?;
    Ok(())
}

/// 服务端二进制、CLI 和静态目录放入 dist/wavedrop-<version>
fn dist(sh: &Shell) -> Result<()> {
    build(sh)?;

    let dest = format!("dist/wavedrop-{}", env!("CARGO_PKG_VERSION"));
    sh.create_dir(&dest)?;
    for bin in ["wavedrop-server", "wavedrop-cli", "wavedrop-tui"] {
        sh.copy_file(format!("target/release/{}", bin), &dest)?;
    }
    cmd!(sh, "cp -r Public {dest}/").run()?;

    println!("✅ 输出目录: {}", dest);
    Ok(())
}

fn test(sh: &Shell) -> Result<()> {
    println!("🧪 运行测试...");
    cmd!(sh, "cargo test --workspace").run()?;
    println!("✅ 测试完成");
    Ok(())
}

fn clean(sh: &Shell) -> Result<()> {
    println!("🧹 清理构建产物...");
    cmd!(sh, "cargo clean").run()?;
    sh.remove_path("dist")?;
    println!("✅ 清理完成");
    Ok(())
}
