use std::time::Duration;

use axum::{Router, body::Bytes, routing::post};
use tokio::net::TcpListener;
use wirebench_client::{ClientConfig, DispatchStrategy, TransportConfig};
use wirebench_model::{Latency, PayloadSizeClass};

/// Echo stub that answers every payload after ~1ms.
async fn spawn_stub() -> String {
    async fn ack(body: Bytes) -> String {
        tokio::time::sleep(Duration::from_millis(1)).await;
        body.len().to_string()
    }

    let app = Router::new().route("/json", post(ack)).route("/xml", post(ack));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn ten_kb_five_samples_two_in_flight() {
    let base_url = spawn_stub().await;

    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(
        data.path().join("10kb_JSON.json"),
        format!(r#"{{"pad":"{}"}}"#, "x".repeat(10_000)),
    )
    .unwrap();
    std::fs::write(
        data.path().join("10kb_XML.xml"),
        format!("<pad>{}</pad>", "x".repeat(10_000)),
    )
    .unwrap();

    let cfg = ClientConfig {
        transport: TransportConfig {
            base_url,
            request_timeout: Some(Duration::from_secs(10)),
            ..Default::default()
        },
        sizes: vec![PayloadSizeClass::new("10kb").unwrap()],
        samples: 5,
        concurrency: 2,
        strategy: DispatchStrategy::Batched,
        cooldown: Duration::ZERO,
        data_dir: data.path().to_path_buf(),
        output_dir: out.path().to_path_buf(),
    };

    let controller = cfg.build_controller().unwrap();
    let summaries = controller.run(&cfg.sizes).await.unwrap();

    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.len(), 5);
    for sample in &summary.samples {
        for leg in [sample.json, sample.xml] {
            match leg {
                // At least the stub's 1ms, well under a second.
                Latency::Micros(v) => assert!((1_000.0..1_000_000.0).contains(&v), "{v}"),
                Latency::Failed => panic!("unexpected failure"),
            }
        }
    }

    let csv = std::fs::read_to_string(out.path().join("10kb_Results.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 1 + 1 + 5, "header, total-time row, one row per sample");
    assert_eq!(lines[0], "JsonRes,XmlRes,TotalTime");
    assert!(lines[1].starts_with("NaN,NaN,"));
    assert!(lines[2..].iter().all(|l| l.ends_with(",NaN")));
}

#[tokio::test]
async fn unreachable_server_produces_nan_rows() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("10kb_JSON.json"), "{}").unwrap();
    std::fs::write(data.path().join("10kb_XML.xml"), "<a/>").unwrap();

    let cfg = ClientConfig {
        transport: TransportConfig {
            base_url: format!("http://{addr}"),
            ..Default::default()
        },
        sizes: vec![PayloadSizeClass::new("10kb").unwrap()],
        samples: 3,
        concurrency: 2,
        cooldown: Duration::ZERO,
        data_dir: data.path().to_path_buf(),
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };

    let summaries = cfg.build_controller().unwrap().run(&cfg.sizes).await.unwrap();
    assert!(summaries[0].json_average().is_failed());

    let csv = std::fs::read_to_string(out.path().join("10kb_Results.csv")).unwrap();
    let rows: Vec<&str> = csv.lines().skip(2).collect();
    assert_eq!(rows, ["NaN,NaN,NaN"; 3]);
}
