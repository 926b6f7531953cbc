//! Command-line argument definitions for the `stocktake` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Stocktake CLI — 컴포넌트 인벤토리 명령줄 도구
#[derive(Parser)]
#[command(name = "stocktake", version, about)]
pub struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "stocktake.toml")]
    pub config: PathBuf,

    /// 로그 레벨
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// 출력 형식
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output rendering format shared by all subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Machine-readable JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// 트리를 스캔하여 스캔 인벤토리 생성
    Scan(ScanArgs),
    /// 인벤토리들을 정규 인벤토리로 병합
    Merge(MergeArgs),
    /// 인벤토리의 파일 커버리지 보고
    Coverage(CoverageArgs),
    /// 인벤토리의 관계 그래프 출력
    Relations(RelationsArgs),
}

#[derive(Debug, clap::Args)]
pub struct ScanArgs {
    /// 스캔 루트 디렉토리
    pub path: PathBuf,

    /// 스캔 인벤토리를 기록할 경로 (JSON)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 스크래치 디렉토리 (설정 파일보다 우선)
    #[arg(long)]
    pub scratch: Option<String>,

    /// 참조 인벤토리 디렉토리 (설정 파일보다 우선)
    #[arg(long)]
    pub reference: Option<String>,

    /// 컴포넌트 패턴 탐지 비활성화
    #[arg(long)]
    pub no_component_patterns: bool,
}

#[derive(Debug, clap::Args)]
pub struct MergeArgs {
    /// 병합할 인벤토리 문서들 (순서 유지)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// 정규 인벤토리를 기록할 경로 (JSON)
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct CoverageArgs {
    /// 대상 인벤토리 문서
    pub inventory: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct RelationsArgs {
    /// 대상 인벤토리 문서
    pub inventory: PathBuf,
}
