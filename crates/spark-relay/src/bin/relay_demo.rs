//! 中继演示：慢速读者经滑动窗口读取数字序列，批量处理器经批量中继接收批次。
//!
//! # 使用方法
//! ```bash
//! cargo run -p spark-relay --features demo --bin relay_demo -- window
//! cargo run -p spark-relay --features demo --bin relay_demo -- batch --config relay.toml
//! RUST_LOG=spark_relay=trace cargo run -p spark-relay --features demo --bin relay_demo
//! ```
//! - 第一个位置参数选择场景：`window`、`batch` 或 `all`（默认）；
//! - `--config`：可选，TOML 配置文件，缺省时窗口容量与批量阈值均为 3。
//!
//! # 场景说明
//! - `window`：生产者每 100ms 产出一个数字（1..=10），读者每 400ms 读取一次，窗口只保留最新条目，
//!   读者看到的是一段有序但有缺口的子序列；
//! - `batch`：发送 1..=5 后触发一次外部冲刷，再发送 6、7 后关闭上游，
//!   处理器依次收到阈值批次、信号批次与收尾批次。

use std::{env, path::PathBuf, time::Duration};

use spark_relay::{RelayConfig, RelayError, flush_signal, handoff};
use tokio::{sync::mpsc, time::sleep};
use tracing_subscriber::EnvFilter;

const PRODUCER_INTERVAL: Duration = Duration::from_millis(100);
const SLOW_READER_INTERVAL: Duration = Duration::from_millis(400);
const SETTLE_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scenario {
    Window,
    Batch,
    All,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,spark_relay=debug")),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("中继演示失败: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let (scenario, config_path) = parse_args()?;
    let config = match config_path {
        Some(path) => RelayConfig::load(&path).map_err(|error| error.to_string())?,
        None => RelayConfig::default(),
    };

    if matches!(scenario, Scenario::Window | Scenario::All) {
        window_demo(&config).await;
    }
    if matches!(scenario, Scenario::Batch | Scenario::All) {
        batch_demo(&config)
            .await
            .map_err(|error| error.to_string())?;
    }
    Ok(())
}

fn parse_args() -> Result<(Scenario, Option<PathBuf>), String> {
    let mut args = env::args().skip(1);
    let mut scenario = Scenario::All;
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "window" => scenario = Scenario::Window,
            "batch" => scenario = Scenario::Batch,
            "all" => scenario = Scenario::All,
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| usage("--config 之后必须提供文件路径"))?;
                config_path = Some(PathBuf::from(value));
            }
            unknown => return Err(usage(&format!("未知参数: {unknown}"))),
        }
    }
    Ok((scenario, config_path))
}

fn usage(reason: &str) -> String {
    format!("{reason}\n用法: relay_demo [window|batch|all] [--config <relay.toml>]")
}

/// 按固定间隔产出 `first..=last`，结束后关闭通道。
fn number_sequence(first: u32, last: u32) -> mpsc::Receiver<u32> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        for value in first..=last {
            if tx.send(value).await.is_err() {
                return;
            }
            sleep(PRODUCER_INTERVAL).await;
        }
    });
    rx
}

async fn window_demo(config: &RelayConfig) {
    println!(
        "== 滑动窗口：容量 {}，慢速读者 ==",
        config.window.capacity
    );
    let values = number_sequence(1, 10);
    let (sink, taker) = handoff();

    let reader = tokio::spawn(async move {
        while let Some(value) = taker.take().await {
            println!("读取到: {value}");
            sleep(SLOW_READER_INTERVAL).await;
        }
    });

    config.sliding_window_relay().run(values, sink).await;
    let _ = reader.await;
}

async fn batch_demo(config: &RelayConfig) -> Result<(), RelayError> {
    println!("== 批量累积：阈值 {} ==", config.batch.threshold);
    let (tx, rx) = mpsc::channel::<u32>(1);
    let (trigger, signal) = flush_signal();
    let (batch_tx, mut batch_rx) = mpsc::channel::<Vec<u32>>(1);

    let processor = tokio::spawn(async move {
        while let Some(batch) = batch_rx.recv().await {
            println!("处理批次: {batch:?}");
        }
    });

    let producer = tokio::spawn(async move {
        for value in 1..=5 {
            send_settled(&tx, value).await;
        }
        // 两个条目不足一个批次，通过外部信号强制冲刷。
        trigger.raise();

        for value in 6..=7 {
            send_settled(&tx, value).await;
        }
        // 关闭上游：剩余条目在收尾时仍会交付。
    });

    let relay = config.batching_relay();
    let outcome = relay.run(rx, signal, batch_tx).await;
    let _ = producer.await;
    let _ = processor.await;
    outcome
}

/// 发送条目后留出一段间隔，让中继先接纳该条目，冲刷信号与条目的先后关系由此可预期。
async fn send_settled(tx: &mpsc::Sender<u32>, value: u32) {
    if tx.send(value).await.is_ok() {
        sleep(SETTLE_INTERVAL).await;
    }
}
