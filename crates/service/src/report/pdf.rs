//! HTML to PDF through the `wkhtmltopdf` binary.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use configs::PdfConfig;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{error, warn};

use crate::errors::ServiceError;

const PERMIT_WAIT: Duration = Duration::from_secs(30);
const MARGIN_MM: u32 = 10;

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ServiceError>;
}

#[derive(Clone)]
pub struct WkhtmltopdfRenderer {
    binary: Arc<PathBuf>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    page_size: String,
    orientation: String,
}

impl WkhtmltopdfRenderer {
    /// Uses `wkhtmltopdf_path` when set, otherwise the binary on `PATH`.
    pub fn from_config(cfg: &PdfConfig) -> Result<Self, ServiceError> {
        let binary = match cfg.wkhtmltopdf_path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => PathBuf::from(p),
            None => which::which("wkhtmltopdf").map_err(|e| ServiceError::Report(format!("wkhtmltopdf not found: {e}")))?,
        };
        Ok(Self::new(binary, cfg))
    }

    pub fn new(binary: PathBuf, cfg: &PdfConfig) -> Self {
        Self {
            binary: Arc::new(binary),
            semaphore: Arc::new(Semaphore::new(cfg.max_concurrent.max(1))),
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
            page_size: cfg.page_size.clone(),
            orientation: cfg.orientation.clone(),
        }
    }

    fn command(&self, input: &std::path::Path, output: &std::path::Path) -> Command {
        let mut cmd = Command::new(&*self.binary);
        cmd.arg("--quiet")
            .arg("--encoding")
            .arg("utf-8")
            .arg("--page-size")
            .arg(&self.page_size)
            .arg("--orientation")
            .arg(&self.orientation);
        for side in ["--margin-top", "--margin-bottom", "--margin-left", "--margin-right"] {
            cmd.arg(side).arg(format!("{MARGIN_MM}mm"));
        }
        cmd.arg("--footer-right")
            .arg("[page]/[topage]")
            .arg("--footer-font-size")
            .arg("8")
            .arg(input)
            .arg(output)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ServiceError> {
        let _permit = timeout(PERMIT_WAIT, self.semaphore.acquire())
            .await
            .map_err(|_| ServiceError::Report("timed out waiting for a pdf slot".into()))?
            .map_err(|_| ServiceError::Report("pdf renderer closed".into()))?;

        // removed with everything inside when dropped
        let dir = tempfile::Builder::new()
            .prefix("activos_pdf_")
            .tempdir()
            .map_err(|e| ServiceError::Report(format!("temp dir: {e}")))?;
        let input = dir.path().join("report.html");
        let output = dir.path().join("report.pdf");
        tokio::fs::write(&input, html)
            .await
            .map_err(|e| ServiceError::Report(format!("write html: {e}")))?;

        let result = match timeout(self.timeout, self.command(&input, &output).output()).await {
            Ok(r) => r.map_err(|e| ServiceError::Report(format!("spawn wkhtmltopdf: {e}")))?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "wkhtmltopdf timed out");
                return Err(ServiceError::Report("pdf generation timed out".into()));
            }
        };
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            error!(status = ?result.status.code(), %stderr, "wkhtmltopdf failed");
            return Err(ServiceError::Report(format!("wkhtmltopdf failed: {}", stderr.trim())));
        }

        tokio::fs::read(&output)
            .await
            .map_err(|e| ServiceError::Report(format!("read pdf: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_skips_lookup() {
        let cfg = PdfConfig { wkhtmltopdf_path: Some("/opt/wk/bin/wkhtmltopdf".into()), ..PdfConfig::default() };
        let r = WkhtmltopdfRenderer::from_config(&cfg).unwrap();
        assert_eq!(r.binary.as_path(), std::path::Path::new("/opt/wk/bin/wkhtmltopdf"));
        assert_eq!(r.semaphore.available_permits(), cfg.max_concurrent);
    }

    #[test]
    fn command_carries_layout_flags() {
        let cfg = PdfConfig { page_size: "A4".into(), orientation: "Portrait".into(), ..PdfConfig::default() };
        let r = WkhtmltopdfRenderer::new(PathBuf::from("wkhtmltopdf"), &cfg);
        let cmd = r.command(std::path::Path::new("in.html"), std::path::Path::new("out.pdf"));
        let args: Vec<String> = cmd.as_std().get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        let pos = args.iter().position(|a| a == "--page-size").unwrap();
        assert_eq!(args[pos + 1], "A4");
        assert!(args.windows(2).any(|w| w[0] == "--orientation" && w[1] == "Portrait"));
        assert!(args.windows(2).any(|w| w[0] == "--margin-left" && w[1] == "10mm"));
        assert_eq!(args[args.len() - 2..], ["in.html".to_string(), "out.pdf".to_string()]);
    }

    #[tokio::test]
    async fn missing_binary_is_report_error() {
        let r = WkhtmltopdfRenderer::new(PathBuf::from("/nonexistent/wkhtmltopdf"), &PdfConfig::default());
        let err = r.render("<html></html>").await.unwrap_err();
        assert!(matches!(err, ServiceError::Report(_)));
    }
}
