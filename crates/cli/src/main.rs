//! # tokenfn CLI
//!
//! デプロイせずに関数を試すためのコマンドラインツール。
//!
//! ## サブコマンド
//! - `invoke [EVENT]` — イベントJSON（ファイルまたは標準入力）で関数を呼び出し、レスポンスを表示
//! - `issue --data JSON` — ローカルでトークンを発行（時間窓を上書き可能）

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokenfn_core::{endpoints::parse_payload, FunctionConfig, TokenFunction};
use tokenfn_crypto::{Clock, SystemClock, TokenPolicy};
use tokenfn_types::FunctionEvent;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tokenfn")]
#[command(about = "Invoke the token function locally and mint tokens for manual testing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イベントJSONで関数を呼び出す
    Invoke(InvokeArgs),
    /// トークンを発行する
    Issue(IssueArgs),
}

/// 共有秘密鍵の指定
#[derive(clap::Args)]
struct SecretArgs {
    /// HS256の共有秘密鍵
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,
}

#[derive(clap::Args)]
struct InvokeArgs {
    #[command(flatten)]
    secret: SecretArgs,

    /// イベントJSONのパス（`-` で標準入力）
    #[arg(default_value = "-")]
    event: PathBuf,

    /// レスポンスを整形せずに1行で出力する
    #[arg(long)]
    compact: bool,
}

#[derive(clap::Args)]
struct IssueArgs {
    #[command(flatten)]
    secret: SecretArgs,

    /// 埋め込むペイロード（JSONのオブジェクト・配列・数値）
    #[arg(short, long)]
    data: String,

    /// 発行時刻から有効開始までの秒数
    #[arg(long, default_value_t = TokenPolicy::DEFAULT_ACTIVATION_DELAY_SECS, allow_negative_numbers = true)]
    nbf_offset: i64,

    /// 発行時刻から有効期限までの秒数
    #[arg(long, default_value_t = TokenPolicy::DEFAULT_LIFETIME_SECS, allow_negative_numbers = true)]
    ttl: i64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let output = match cli.command {
        Commands::Invoke(args) => {
            let function = FunctionConfig::new(args.secret.secret)?.build();
            let input = read_event_source(&args.event)?;
            invoke(&function, &input, args.compact)?
        }
        Commands::Issue(args) => {
            let function = FunctionConfig::new(args.secret.secret)?.build();
            let policy = TokenPolicy {
                activation_delay_secs: args.nbf_offset,
                lifetime_secs: args.ttl,
            };
            issue(&function, &args.data, &policy, SystemClock.now())?
        }
    };

    println!("{output}");
    Ok(())
}

/// イベントJSONをファイルまたは標準入力から読む。
fn read_event_source(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("標準入力からイベントを読み込めません")?;
        Ok(input)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("イベントファイルを読み込めません: {}", path.display()))
    }
}

/// イベントJSONで関数を呼び出し、レスポンスJSONを返す。
fn invoke(function: &TokenFunction, input: &str, compact: bool) -> anyhow::Result<String> {
    let event: FunctionEvent =
        serde_json::from_str(input).context("イベントJSONのパースに失敗しました")?;
    tracing::debug!(method = %event.http_method, path = %event.path, "関数を呼び出します");

    let response = function.handle(&event);
    let rendered = if compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };
    Ok(rendered)
}

/// ペイロードを検証してトークンを発行する。
fn issue(
    function: &TokenFunction,
    data: &str,
    policy: &TokenPolicy,
    now: i64,
) -> anyhow::Result<String> {
    let payload = parse_payload(Some(data)).context("ペイロードが不正です")?;
    let token = function
        .signer()
        .issue(payload, policy, now)
        .context("トークンの発行に失敗しました")?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;
    use tokenfn_types::FunctionResponse;

    fn function() -> TokenFunction {
        FunctionConfig::new("NOTASECRET").unwrap().build()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    /// invokeがPOST /tokenイベントから201を返すことを確認
    #[test]
    fn test_invoke_issue_event() {
        let input = json!({
            "body": "{\"name\": \"bboe\"}",
            "headers": {"Content-Type": "application/json"},
            "httpMethod": "POST",
            "path": "/token"
        })
        .to_string();

        let output = invoke(&function(), &input, true).unwrap();
        let response: FunctionResponse = serde_json::from_str(&output).unwrap();
        assert_eq!(response.status_code, 201);
        assert!(response.body.contains("\"token\""));
        assert!(!output.contains('\n'));
    }

    /// issueで即時有効なトークンを作り、invokeで検証できることを確認
    #[test]
    fn test_issue_then_invoke_validate() {
        let function = function();
        let policy = TokenPolicy {
            activation_delay_secs: 0,
            lifetime_secs: 60,
        };
        let token = issue(&function, r#"{"user_id": 128}"#, &policy, SystemClock.now()).unwrap();

        let input = json!({
            "headers": {"Authorization": format!("Bearer {token}")},
            "httpMethod": "GET",
            "path": "/"
        })
        .to_string();
        let output = invoke(&function, &input, false).unwrap();
        let response: FunctionResponse = serde_json::from_str(&output).unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "{\"user_id\":128}\n");
    }

    #[test]
    fn test_issue_rejects_boolean_payload() {
        assert!(issue(&function(), "true", &TokenPolicy::default(), 0).is_err());
    }

    /// 時間窓の加算が溢れる指定はパニックせずエラーになることを確認
    #[test]
    fn test_issue_rejects_overflowing_window() {
        let policy = TokenPolicy {
            activation_delay_secs: 0,
            lifetime_secs: i64::MAX,
        };
        let err = issue(&function(), "1", &policy, SystemClock.now()).unwrap_err();
        assert!(format!("{err:#}").contains("UNIX秒"));
    }

    #[test]
    fn test_invoke_rejects_malformed_event() {
        assert!(invoke(&function(), "not an event", true).is_err());
    }
}
