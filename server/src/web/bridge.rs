use crate::web::model::{AnalyzeResponse, ErrorResponse};
use crate::workflow::config::ServerConfig;
use crate::workflow::runner::Runner;
use crate::workflow::staging::StagingArea;
use antcore::{AnalysisError, AnalysisMode, AnalysisReport, AnalysisResult};
use anyhow::Context;
use bytes::Buf;
use futures_util::{pin_mut, TryStreamExt};
use log::{debug, info, warn};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

const INDEX_PAGE: &str = include_str!("../../assets/index.html");

const FIELD_FILES: &str = "files";
const FIELD_MODE: &str = "mode";

/// Failures while reading the multipart body, before any analysis runs.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("malformed upload: {0}")]
    Transport(#[from] warp::Error),
    #[error("could not store upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not prepare staging area: {0:#}")]
    Staging(anyhow::Error),
    #[error("Too many files ({limit} allowed)")]
    TooManyFiles { limit: usize },
    #[error(transparent)]
    InvalidMode(AnalysisError),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::Transport(_) | UploadError::TooManyFiles { .. } | UploadError::InvalidMode(_) => {
                StatusCode::BAD_REQUEST
            }
            UploadError::Io(_) | UploadError::Staging(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn analysis_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    warp::reply::with_status(warp::reply::json(&ErrorResponse::new(message)), status).into_response()
}

async fn write_part(part: Part, file: std::fs::File) -> Result<(), UploadError> {
    let mut file = tokio::fs::File::from_std(file);
    let stream = part.stream();
    pin_mut!(stream);
    while let Some(mut chunk) = stream.try_next().await? {
        while chunk.has_remaining() {
            let bytes = chunk.chunk();
            let len = bytes.len();
            file.write_all(bytes).await?;
            chunk.advance(len);
        }
    }
    file.flush().await?;
    Ok(())
}

async fn read_text(part: Part) -> Result<String, UploadError> {
    let mut text = Vec::new();
    let stream = part.stream();
    pin_mut!(stream);
    while let Some(mut chunk) = stream.try_next().await? {
        while chunk.has_remaining() {
            let bytes = chunk.chunk();
            let len = bytes.len();
            text.extend_from_slice(bytes);
            chunk.advance(len);
        }
    }
    Ok(String::from_utf8_lossy(&text).into_owned())
}

/// Streams every `files` part to disk and picks up the optional `mode` field.
async fn stage_upload(
    form: FormData,
    config: &ServerConfig,
) -> Result<(StagingArea, Option<AnalysisMode>), UploadError> {
    let mut staging =
        StagingArea::new(config.staging_dir.as_deref()).map_err(UploadError::Staging)?;
    let mut mode = None;

    pin_mut!(form);
    while let Some(part) = form.try_next().await? {
        match part.name() {
            FIELD_FILES => {
                if staging.len() >= config.max_files {
                    return Err(UploadError::TooManyFiles {
                        limit: config.max_files,
                    });
                }
                let filename = part.filename().unwrap_or_default().to_string();
                let file = staging.create(&filename)?;
                write_part(part, file).await?;
            }
            FIELD_MODE => {
                let value = read_text(part).await?;
                if !value.trim().is_empty() {
                    mode = Some(value.parse().map_err(UploadError::InvalidMode)?);
                }
            }
            other => debug!("ignoring multipart field {}", other),
        }
    }

    Ok((staging, mode))
}

async fn handle_analyze(form: FormData, runner: Arc<Runner>) -> Result<Response, Infallible> {
    let config = runner.config();
    let (staging, mode) = match stage_upload(form, config).await {
        Ok(upload) => upload,
        Err(err) => {
            warn!("upload rejected: {}", err);
            return Ok(error_reply(err.status(), err.to_string()));
        }
    };
    if staging.is_empty() {
        debug!("upload carried no files");
    }
    let mode = mode.unwrap_or(config.default_mode);

    let worker = runner.clone();
    let job = move || worker.analyze(staging, mode);
    let reply = match run_bounded(job, config.request_timeout()).await {
        Ok(report) => {
            warp::reply::with_status(warp::reply::json(&AnalyzeResponse::from(&report)), StatusCode::OK)
                .into_response()
        }
        Err((status, message)) => error_reply(status, message),
    };
    Ok(reply)
}

/// Runs `job` on the blocking pool and gives up after `limit`.
async fn run_bounded<F>(job: F, limit: Duration) -> Result<AnalysisReport, (StatusCode, String)>
where
    F: FnOnce() -> AnalysisResult<AnalysisReport> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(job);
    let err = match tokio::time::timeout(limit, task).await {
        Ok(Ok(Ok(report))) => return Ok(report),
        Ok(Ok(Err(err))) => {
            info!("analysis refused: {}", err);
            err
        }
        Ok(Err(join_err)) => {
            warn!("analysis task failed: {}", join_err);
            AnalysisError::Internal("Analysis failed".into())
        }
        Err(_) => {
            warn!("analysis exceeded {:?}", limit);
            return Err((
                StatusCode::GATEWAY_TIMEOUT,
                format!("Analysis timed out after {:.1}s", limit.as_secs_f64()),
            ));
        }
    };
    Err((analysis_status(&err), err.to_string()))
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(err) = rejection.find::<warp::reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::MethodNotAllowed>() {
        (StatusCode::METHOD_NOT_ALLOWED, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::InvalidHeader>() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::MissingHeader>() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, err.to_string())
    } else {
        warn!("unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
    };
    Ok(error_reply(status, message))
}

/// HTTP front end: the upload page, `/analyze` and `/metrics`.
pub struct WebBridge {
    runner: Arc<Runner>,
}

impl WebBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self { runner }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let max_upload = self.runner.config().max_upload_bytes;
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());

        let index = warp::path::end()
            .and(warp::get())
            .map(|| warp::reply::html(INDEX_PAGE));

        let analyze = warp::path("analyze")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::multipart::form().max_length(max_upload))
            .and(runner_filter.clone())
            .and_then(handle_analyze);

        let metrics = warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(runner_filter)
            .map(|runner: Arc<Runner>| warp::reply::json(&runner.metrics()));

        index.or(analyze).or(metrics).recover(handle_rejection)
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve<S>(&self, shutdown: S) -> anyhow::Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let bind = self.runner.config().bind;
        let (addr, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(bind, shutdown)
            .with_context(|| format!("binding HTTP listener on {}", bind))?;
        info!("listening on http://{}", addr);
        server.await;
        info!("HTTP listener on {} stopped", addr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_logs, GeneratorConfig};
    use crate::web::model::AnalyzeResponse;

    const BOUNDARY: &str = "antenna-test-boundary";

    enum Field<'a> {
        File(&'a str, &'a str),
        Text(&'a str, &'a str),
    }

    fn multipart(fields: &[Field<'_>]) -> Vec<u8> {
        let mut body = String::new();
        for field in fields {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match field {
                Field::File(name, content) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n{}\r\n",
                        name, content
                    ));
                }
                Field::Text(name, value) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    ));
                }
            }
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body.into_bytes()
    }

    fn bridge(config: ServerConfig) -> WebBridge {
        WebBridge::new(Arc::new(Runner::new(config)))
    }

    async fn post(bridge: &WebBridge, fields: &[Field<'_>]) -> warp::http::Response<bytes::Bytes> {
        warp::test::request()
            .method("POST")
            .path("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart(fields))
            .reply(&bridge.routes())
            .await
    }

    fn error_message(body: &[u8]) -> String {
        serde_json::from_slice::<ErrorResponse>(body).unwrap().error
    }

    #[tokio::test]
    async fn index_page_is_served() {
        let bridge = bridge(ServerConfig::default());
        let resp = warp::test::request()
            .path("/")
            .reply(&bridge.routes())
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(String::from_utf8_lossy(resp.body()).contains("/analyze"));
    }

    #[tokio::test]
    async fn analyze_returns_three_data_uris() {
        let bridge = bridge(ServerConfig::default());
        let logs = build_logs(&GeneratorConfig::default()).unwrap();
        let names: Vec<String> = logs.iter().map(|l| l.file_name()).collect();
        let mut fields: Vec<Field<'_>> = logs
            .iter()
            .zip(&names)
            .map(|(log, name)| Field::File(name, &log.content))
            .collect();
        fields.push(Field::Text("mode", "transmission"));

        let resp = post(&bridge, &fields).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: AnalyzeResponse = serde_json::from_slice(resp.body()).unwrap();
        for uri in [
            body.band_comparison,
            body.overall_ranking,
            body.distance_analysis,
        ] {
            assert!(uri.unwrap().starts_with("data:image/svg+xml;base64,"));
        }

        let metrics = warp::test::request()
            .path("/metrics")
            .reply(&bridge.routes())
            .await;
        let counters: serde_json::Value = serde_json::from_slice(metrics.body()).unwrap();
        assert_eq!(counters["analyses_completed"], 1);
    }

    #[tokio::test]
    async fn single_file_is_a_bad_request() {
        let bridge = bridge(ServerConfig::default());
        let resp = post(&bridge, &[Field::File("only.adi", "<eor>")]).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(resp.body()), "At least 2 files required (got 1)");
    }

    #[tokio::test]
    async fn same_antenna_twice_is_a_bad_request() {
        let bridge = bridge(ServerConfig::default());
        let log = "<FREQ:6>14.074 <CALL:8>N0CALL/1 <OPERATOR:5>K1ABC <APP_PSKREP_SNR:2>-3 <eor>";
        let resp = post(
            &bridge,
            &[Field::File("a.adi", log), Field::File("b.adi", log)],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(resp.body()).starts_with("Need at least 2 valid antenna files"));
    }

    #[tokio::test]
    async fn bad_mode_is_rejected_before_analysis() {
        let bridge = bridge(ServerConfig::default());
        let resp = post(
            &bridge,
            &[
                Field::File("a.adi", "<eor>"),
                Field::File("b.adi", "<eor>"),
                Field::Text("mode", "sideways"),
            ],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bridge.runner.metrics().analyses_rejected, 0);
    }

    #[tokio::test]
    async fn file_limit_is_enforced() {
        let bridge = bridge(ServerConfig {
            max_files: 2,
            ..Default::default()
        });
        let resp = post(
            &bridge,
            &[
                Field::File("a.adi", "<eor>"),
                Field::File("b.adi", "<eor>"),
                Field::File("c.adi", "<eor>"),
            ],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(resp.body()).starts_with("Too many files"));
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let bridge = bridge(ServerConfig {
            max_upload_bytes: 64,
            ..Default::default()
        });
        let big = "x".repeat(512);
        let resp = post(
            &bridge,
            &[Field::File("a.adi", &big), Field::File("b.adi", &big)],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn uploaded_parts_land_on_disk_intact() {
        let log = "<CALL:5>K1ABC <FREQ:6>14.074 <eor>";
        let form = warp::test::request()
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart(&[
                Field::File("a.adi", log),
                Field::Text("mode", "reception"),
            ]))
            .filter(&warp::multipart::form())
            .await
            .unwrap();

        let (staging, mode) = stage_upload(form, &ServerConfig::default()).await.unwrap();
        assert_eq!(mode, Some(AnalysisMode::Reception));
        assert_eq!(staging.len(), 1);
        assert_eq!(std::fs::read_to_string(&staging.logs()[0].path).unwrap(), log);
    }

    #[tokio::test]
    async fn slow_analysis_times_out_with_504() {
        let slow = || -> AnalysisResult<AnalysisReport> {
            std::thread::sleep(Duration::from_millis(300));
            Err(AnalysisError::InsufficientFiles { found: 0 })
        };
        let (status, message) = run_bounded(slow, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(message.starts_with("Analysis timed out"));
    }

    #[tokio::test]
    async fn panicking_analysis_is_a_500() {
        let broken = || -> AnalysisResult<AnalysisReport> { panic!("renderer crashed") };
        let (status, message) = run_bounded(broken, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Analysis failed");
    }

    #[tokio::test]
    async fn refused_analysis_keeps_its_message() {
        let refused = || -> AnalysisResult<AnalysisReport> {
            Err(AnalysisError::InsufficientAntennas { found: 1 })
        };
        let (status, message) = run_bounded(refused, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Need at least 2 valid antenna files (got 1)");
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let bridge = bridge(ServerConfig::default());
        let resp = warp::test::request()
            .path("/nope")
            .reply(&bridge.routes())
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_message(resp.body()), "Not found");
    }
}
