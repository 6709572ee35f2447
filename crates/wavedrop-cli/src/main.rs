//! Wavedrop CLI
//!
//! 命令行客户端，通过 HTTP 与上传服务通信

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wavedrop_core::AppSettings;

#[derive(Parser)]
#[command(name = "wavedrop", version, about = "Wavedrop 文件上传/下载工具")]
struct Cli {
    /// 服务器地址
    #[arg(short, long, global = true, env = "WAVEDROP_SERVER", default_value = client::DEFAULT_SERVER)]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 上传文件
    Upload {
        /// 要上传的文件路径
        file: PathBuf,
    },
    /// 下载文件
    Download {
        /// 服务端文件名
        name: String,
        /// 保存路径 (默认: 当前目录下同名文件)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 显示当前服务配置
    Config {
        /// 将当前配置写入配置文件
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = client::UploadClient::new(&cli.server);

    match cli.command {
        Commands::Upload { file } => {
            println!("📤 上传文件: {}", file.display());
            let stored = client.upload(&file).await?;
            println!("✅ 已保存为: {}", stored);
        }
        Commands::Download { name, output } => {
            let output = match output {
                Some(output) => output,
                None => client::default_output(&name)?,
            };
            println!("📥 下载文件: {} -> {}", name, output.display());
            let bytes = client.download(&name, &output).await?;
            println!("✅ 完成 ({} 字节)", bytes);
        }
        Commands::Config { save } => {
            let settings = AppSettings::load();
            println!("# {}", AppSettings::config_path().display());
            print!("{}", toml::to_string_pretty(&settings)?);
            if save {
                settings.save()?;
                println!("✅ 配置已保存");
            }
        }
    }

    Ok(())
}
